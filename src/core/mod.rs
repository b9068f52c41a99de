//! Core conversion logic and abstractions

pub mod config;
pub mod currency;
pub mod engine;
pub mod error;
pub mod log;

// Re-export main types for cleaner imports
pub use currency::{BASE_CURRENCY, RateProvider, RateTable, SUPPORTED_CURRENCIES};
pub use engine::{ConversionEngine, ConversionRequest, ConversionResult, UiState};
pub use error::ConversionError;
