//! Identity (email address) utilities

use once_cell::sync::Lazy;
use regex::Regex;

// Pragmatic email shape: local@domain.tld, no whitespace
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)+$")
        .expect("email regex is valid")
});

/// Maximum length of an email address (RFC 5321)
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Normalize an identity by trimming whitespace and lower-casing
pub fn normalize_identity(identity: &str) -> String {
    identity.trim().to_lowercase()
}

/// Check if an email address is valid
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_LENGTH && EMAIL_REGEX.is_match(email)
}

/// Mask an email address for logs (e.g., a***@x.com)
pub fn mask_identity(identity: &str) -> String {
    match identity.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_identity() {
        assert_eq!(normalize_identity("  Alice@Example.COM "), "alice@example.com");
        assert_eq!(normalize_identity("a@x.com"), "a@x.com");
    }

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(is_valid_email("user_1@sub-domain.co.uk"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("a @x.com"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("a@-x.com"));

        let long_local = "a".repeat(MAX_EMAIL_LENGTH);
        assert!(!is_valid_email(&format!("{}@x.com", long_local)));
    }

    #[test]
    fn test_mask_identity() {
        assert_eq!(mask_identity("alice@example.com"), "a***@example.com");
        assert_eq!(mask_identity("not-an-email"), "***");
        assert!(!mask_identity("secret@x.com").contains("secret"));
    }
}
