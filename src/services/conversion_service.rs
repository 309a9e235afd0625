use crate::models::conversion::{Conversion, ConversionOutcome, ConversionRequest};
use crate::services::rate_service::RateProvider;
use crate::utils::error::ApiError;
use crate::utils::symbols::CurrencySymbols;

/// Parse the raw form amount. Zero and negative values pass through.
pub fn parse_amount(raw: &str) -> Result<f64, ApiError> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ApiError::Validation(format!("amount must be a number, got `{}`", raw)))?;
    if !amount.is_finite() {
        return Err(ApiError::Validation("amount must be a finite number".into()));
    }
    Ok(amount)
}

/// Build a request from optional form fields; missing or blank fields are input errors.
pub fn conversion_request(
    base_currency: Option<String>,
    target_currency: Option<String>,
    amount: Option<String>,
) -> Result<ConversionRequest, ApiError> {
    let required = |v: Option<String>, name: &str| {
        v.filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ApiError::Validation(format!("{} is required", name)))
    };
    let base_currency = required(base_currency, "base_currency")?;
    let target_currency = required(target_currency, "target_currency")?;
    let amount = parse_amount(&required(amount, "amount")?)?;
    Ok(ConversionRequest { base_currency, target_currency, amount })
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub async fn convert(
    rates: &dyn RateProvider,
    symbols: &CurrencySymbols,
    req: ConversionRequest,
) -> ConversionOutcome {
    let table = match rates.fetch_rates(&req.base_currency).await {
        Ok(t) => t,
        Err(_) => return ConversionOutcome::Unavailable,
    };

    let Some(rate) = table.rate_for(&req.target_currency) else {
        return ConversionOutcome::InvalidTarget(req.target_currency);
    };

    let converted_amount = round2(req.amount * rate);
    if !converted_amount.is_finite() {
        return ConversionOutcome::OutOfRange;
    }

    ConversionOutcome::Converted(Conversion {
        base_symbol: symbols.get(&req.base_currency).map(str::to_string),
        target_symbol: symbols.get(&req.target_currency).map(str::to_string),
        converted_amount,
        rate,
        amount: req.amount,
        base_currency: req.base_currency,
        target_currency: req.target_currency,
    })
}
