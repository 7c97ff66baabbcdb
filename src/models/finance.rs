//! Exchange rate and currency conversion results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of the live exchange rates endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates {
    pub base: String,

    /// Unix timestamp of the last rate update
    #[serde(default)]
    pub last_updated: Option<i64>,

    #[serde(default)]
    pub exchange_rates: BTreeMap<String, f64>,
}

/// Result of a currency conversion.
///
/// The rates come straight from the live or historical endpoint; `amount` echoes
/// the caller's input and `converted_amount` is filled in when the target rate is
/// part of the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyConversion {
    pub base: String,

    #[serde(default)]
    pub target: Option<String>,

    /// Date of historical rates (`YYYY-MM-DD`)
    #[serde(default)]
    pub date: Option<String>,

    #[serde(default)]
    pub last_updated: Option<i64>,

    #[serde(default)]
    pub exchange_rates: BTreeMap<String, f64>,

    #[serde(default)]
    pub converted_amount: Option<f64>,

    #[serde(default)]
    pub amount: Option<f64>,
}

impl CurrencyConversion {
    /// Record the requested amount and compute the converted value from the target rate
    pub fn apply_amount(mut self, target: &str, amount: f64) -> Self {
        self.amount = Some(amount);
        self.converted_amount = self
            .exchange_rates
            .get(target)
            .or_else(|| self.exchange_rates.get(&target.to_uppercase()))
            .map(|rate| amount * rate);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exchange_rates_parse() {
        let result: ExchangeRates = serde_json::from_value(json!({
            "base": "USD",
            "last_updated": 1735689600,
            "exchange_rates": {"EUR": 0.92, "GBP": 0.79}
        }))
        .unwrap();

        assert_eq!(result.base, "USD");
        assert_eq!(result.last_updated, Some(1735689600));
        assert_eq!(result.exchange_rates.get("EUR"), Some(&0.92));
    }

    #[test]
    fn test_apply_amount_with_rate() {
        let conversion: CurrencyConversion = serde_json::from_value(json!({
            "base": "USD",
            "last_updated": 1735689600,
            "exchange_rates": {"EUR": 0.5}
        }))
        .unwrap();

        let conversion = conversion.apply_amount("EUR", 100.0);
        assert_eq!(conversion.amount, Some(100.0));
        assert_eq!(conversion.converted_amount, Some(50.0));
    }

    #[test]
    fn test_apply_amount_lowercase_target() {
        let conversion: CurrencyConversion = serde_json::from_value(json!({
            "base": "USD",
            "exchange_rates": {"EUR": 2.0}
        }))
        .unwrap();

        let conversion = conversion.apply_amount("eur", 3.0);
        assert_eq!(conversion.converted_amount, Some(6.0));
    }

    #[test]
    fn test_apply_amount_without_rate() {
        let conversion: CurrencyConversion = serde_json::from_value(json!({
            "base": "USD",
            "exchange_rates": {"GBP": 0.8}
        }))
        .unwrap();

        let conversion = conversion.apply_amount("JPY", 10.0);
        assert_eq!(conversion.amount, Some(10.0));
        assert!(conversion.converted_amount.is_none());
    }
}
