//! Bridge Configuration

use shared::models::StoreType;

/// Bridge configuration
///
/// The embedding runtime owns configuration loading; this struct only
/// carries the values the bridge needs.
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    /// Platform store the bridge talks to
    pub store_type: StoreType,
    /// Salt mixed into the account digest attached to payments
    pub obfuscation_salt: Option<String>,
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store_type(mut self, store_type: StoreType) -> Self {
        self.store_type = store_type;
        self
    }

    pub fn with_obfuscation_salt(mut self, salt: impl Into<String>) -> Self {
        self.obfuscation_salt = Some(salt.into());
        self
    }
}
