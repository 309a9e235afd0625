use serde::Deserialize;
use std::collections::HashMap;

/// open.er-api.com `latest` body.
#[derive(Deserialize)]
pub struct ErRates { pub rates: HashMap<String, f64> }

/// v6.exchangerate-api.com `latest` body. `result` is "success" or "error".
#[derive(Deserialize)]
pub struct ExrLatest {
    pub result: String,
    #[serde(default)]
    pub conversion_rates: HashMap<String, f64>,
    #[serde(rename = "error-type")]
    pub error_type: Option<String>,
}
