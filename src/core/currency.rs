//! Currency rate abstractions

use crate::core::error::ConversionError;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::warn;

/// Currency every fetched rate is expressed against.
pub const BASE_CURRENCY: &str = "EUR";

/// Currencies offered to the user, in display order.
pub const SUPPORTED_CURRENCIES: [&str; 10] = [
    "USD", "EUR", "GBP", "JPY", "AUD", "CAD", "CHF", "CNY", "IDR", "SGD",
];

pub fn is_supported(code: &str) -> bool {
    SUPPORTED_CURRENCIES.contains(&code)
}

/// Rates of each currency relative to a single base currency.
///
/// Only finite, positive rates are ever stored. The base currency always
/// resolves to `1.0` through [`RateTable::rate_of`], whether or not the
/// provider listed it.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    base: String,
    rates: HashMap<String, f64>,
    as_of: Option<NaiveDate>,
}

impl RateTable {
    pub fn new(base: &str, rates: HashMap<String, f64>) -> Self {
        let rates = rates
            .into_iter()
            .filter(|(code, rate)| {
                let valid = rate.is_finite() && *rate > 0.0;
                if !valid {
                    warn!(%code, rate, "Dropping invalid rate");
                }
                valid
            })
            .collect();

        RateTable {
            base: base.to_string(),
            rates,
            as_of: None,
        }
    }

    /// An empty table against `base`; what the engine holds before any fetch.
    pub fn empty(base: &str) -> Self {
        Self::new(base, HashMap::new())
    }

    pub fn with_date(mut self, as_of: Option<NaiveDate>) -> Self {
        self.as_of = as_of;
        self
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn as_of(&self) -> Option<NaiveDate> {
        self.as_of
    }

    /// True when the provider returned no rates at all.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Rate of `code` against the base. The base itself is always `1.0`.
    pub fn rate_of(&self, code: &str) -> Option<f64> {
        if code == self.base {
            return Some(1.0);
        }
        self.rates.get(code).copied()
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_rates(&self, base: &str) -> Result<RateTable, ConversionError>;
}
