//! Currency catalog objects.

use serde::Deserialize;

/// Currency type filter for fiat lookups.
pub const FIAT_TYPE: &str = "fiat";

/// A currency as known to the processor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyInfo {
    /// Processor-specific numeric currency id (e.g. 5057 for USD).
    pub id: u32,
    pub symbol: String,
    /// Decimal precision used to scale amounts to minor units.
    pub decimal_places: u32,
}

/// Paged currency listing.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyList {
    #[serde(default)]
    pub items: Vec<CurrencyInfo>,
}
