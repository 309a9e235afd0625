use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A parsed conversion request. Codes are kept exactly as submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversionRequest {
    pub base_currency: String,
    pub target_currency: String,
    pub amount: f64,
}

/// Every rate the provider quotes for one base currency.
#[derive(Debug, Clone)]
pub struct RateTable {
    pub base: String,
    pub rates: HashMap<String, f64>,
}

impl RateTable {
    pub fn rate_for(&self, target: &str) -> Option<f64> {
        self.rates.get(target).copied()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    pub base_currency: String,
    pub target_currency: String,
    pub amount: f64,
    pub rate: f64,
    pub converted_amount: f64,
    pub base_symbol: Option<String>,
    pub target_symbol: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ConversionOutcome {
    Converted(Conversion),
    /// Rates were fetched but the target code is not among them.
    InvalidTarget(String),
    /// The provider could not be reached or refused the request.
    Unavailable,
    /// `amount × rate` does not fit in an f64.
    OutOfRange,
}
