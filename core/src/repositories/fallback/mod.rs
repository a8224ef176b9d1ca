pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod memory;

pub use memory::InMemoryFallbackStore;
pub use r#trait::FallbackStore;

#[cfg(test)]
mod tests;
