//! Product Models
//!
//! Catalog and purchase payloads exchanged with the embedding runtime.
//! Prices serialize as plain JSON numbers; the runtime on the other side
//! has no decimal type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Platform store kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreType {
    /// Apple App Store
    #[default]
    Appstore,
    /// Google Play Store
    Googleplay,
}

impl StoreType {
    /// Get the string name stamped into purchase payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Appstore => "appstore",
            Self::Googleplay => "googleplay",
        }
    }
}

/// Catalog entry as configured in the application backend
///
/// Carries the backend product identifier plus the per-platform store
/// identifiers. An entry with no identifier for the active platform is
/// skipped when listing products.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfiguredProduct {
    /// Backend product identifier
    pub product_id: String,
    /// App Store SKU
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_store_id: Option<String>,
    /// Google Play SKU
    #[serde(skip_serializing_if = "Option::is_none")]
    pub googleplay_id: Option<String>,
}

impl ConfiguredProduct {
    /// Get the store identifier for the given platform, if configured
    pub fn store_id(&self, store_type: StoreType) -> Option<&str> {
        match store_type {
            StoreType::Appstore => self.app_store_id.as_deref(),
            StoreType::Googleplay => self.googleplay_id.as_deref(),
        }
    }
}

/// Enriched product listing entry
///
/// A configured product joined with the pricing the platform store
/// reported for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductInfo {
    /// Backend product identifier
    pub product_id: String,
    /// Price in the user's local currency
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// ISO currency code reported by the store
    pub currency: String,
    /// Store SKU this pricing belongs to
    pub internal_product_id: String,
}

/// Successful purchase payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchasedProduct {
    /// Store the purchase was made on
    pub store_type: StoreType,
    /// Backend product identifier
    pub product_id: String,
    /// Store SKU
    pub internal_product_id: String,
    /// Price shown to the user at purchase time
    #[serde(with = "rust_decimal::serde::float")]
    pub paid_price: Decimal,
    /// Currency of the shown price
    pub paid_currency: String,
    /// Receipt data for server-side validation
    pub receipt: String,
    /// Transaction token, required to terminate the purchase later
    pub token: String,
}
