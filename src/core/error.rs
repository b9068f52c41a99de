//! Error kinds surfaced by the conversion core.

use thiserror::Error;

/// Failures the engine captures into state instead of propagating.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// Transport, parse or API-level failure while retrieving rates.
    #[error("{0}")]
    Fetch(String),

    /// Convert was attempted without usable rates for the selected pair.
    #[error("Currency rates not available")]
    RatesUnavailable,
}

impl From<reqwest::Error> for ConversionError {
    fn from(err: reqwest::Error) -> Self {
        ConversionError::Fetch(format!("Request error: {err}"))
    }
}
