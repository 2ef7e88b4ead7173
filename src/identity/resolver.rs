//! Minting of new visitor identifiers.

use uuid::Uuid;

/// Supplies a visitor identifier when the request carries none.
pub trait IdentityResolver: Send + Sync {
    /// Return a non-empty identifier for a visitor seen for the first time.
    fn find_or_generate(&self) -> String;
}

/// Generates random UUID v4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidResolver;

impl IdentityResolver for UuidResolver {
    fn find_or_generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
