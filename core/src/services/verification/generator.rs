//! Random numeric code generation

use rand::{rngs::OsRng, Rng};

/// Produces fixed-length numeric codes
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Code generator drawing each digit uniformly from the OS CSPRNG
#[derive(Debug, Clone, Copy)]
pub struct OsRngCodeGenerator {
    length: usize,
}

impl OsRngCodeGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for OsRngCodeGenerator {
    fn default() -> Self {
        Self::new(crate::domain::entities::CODE_LENGTH)
    }
}

impl CodeGenerator for OsRngCodeGenerator {
    fn generate(&self) -> String {
        let mut rng = OsRng;
        (0..self.length)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }
}

/// Whether `code` has the shape of a generated code
pub fn is_well_formed(code: &str, length: usize) -> bool {
    code.len() == length && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_are_numeric_and_fixed_length() {
        let generator = OsRngCodeGenerator::new(6);
        for _ in 0..100 {
            let code = generator.generate();
            assert!(is_well_formed(&code, 6), "bad code {}", code);
        }
    }

    #[test]
    fn test_custom_length() {
        let generator = OsRngCodeGenerator::new(8);
        assert_eq!(generator.generate().len(), 8);
    }

    #[test]
    fn test_every_digit_appears() {
        let generator = OsRngCodeGenerator::new(12);
        let mut seen = [false; 10];
        for _ in 0..200 {
            for b in generator.generate().bytes() {
                seen[(b - b'0') as usize] = true;
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_is_well_formed() {
        assert!(is_well_formed("012345", 6));
        assert!(!is_well_formed("12345", 6));
        assert!(!is_well_formed("12345a", 6));
        assert!(!is_well_formed("１２３４５６", 6));
    }
}
