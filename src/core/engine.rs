//! Conversion state and the commands that drive it.
//!
//! The engine publishes a [`UiState`] snapshot through a `watch` channel.
//! Every command applies its change with a single `send_modify`, so readers
//! never observe a half-applied update. Concurrent `load_rates` calls are not
//! coordinated: whichever fetch completes last wins.

use crate::core::currency::{RateProvider, RateTable, SUPPORTED_CURRENCIES};
use crate::core::error::ConversionError;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub type ConversionResult = Result<f64, ConversionError>;

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: f64,
    pub from_currency: String,
    pub to_currency: String,
}

impl Default for ConversionRequest {
    fn default() -> Self {
        ConversionRequest {
            amount: 0.0,
            from_currency: "USD".to_string(),
            to_currency: "IDR".to_string(),
        }
    }
}

/// Everything a presentation layer needs to render the converter.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub rates: RateTable,
    pub request: ConversionRequest,
    pub result: Option<f64>,
    pub is_loading: bool,
    pub error: Option<String>,
}

pub struct ConversionEngine {
    base: String,
    provider: Arc<dyn RateProvider>,
    state: watch::Sender<UiState>,
}

impl ConversionEngine {
    pub fn new(base: &str, provider: Arc<dyn RateProvider>) -> Self {
        Self::with_request(base, provider, ConversionRequest::default())
    }

    pub fn with_request(
        base: &str,
        provider: Arc<dyn RateProvider>,
        request: ConversionRequest,
    ) -> Self {
        let initial = UiState {
            rates: RateTable::empty(base),
            request,
            result: None,
            is_loading: false,
            error: None,
        };
        let (state, _) = watch::channel(initial);

        ConversionEngine {
            base: base.to_string(),
            provider,
            state,
        }
    }

    pub fn base_currency(&self) -> &str {
        &self.base
    }

    pub fn currencies(&self) -> &'static [&'static str] {
        &SUPPORTED_CURRENCIES
    }

    /// Latest published state.
    pub fn snapshot(&self) -> UiState {
        self.state.borrow().clone()
    }

    /// Receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.state.subscribe()
    }

    /// Parses user input; anything that isn't a finite, non-negative number
    /// becomes zero.
    pub fn set_amount(&self, raw: &str) {
        let amount = raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(0.0);
        debug!(raw, amount, "Amount updated");
        self.state.send_modify(|s| s.request.amount = amount);
    }

    pub fn set_from_currency(&self, code: &str) {
        self.state
            .send_modify(|s| s.request.from_currency = code.to_string());
    }

    pub fn set_to_currency(&self, code: &str) {
        self.state
            .send_modify(|s| s.request.to_currency = code.to_string());
    }

    /// Fetches fresh rates. A failed fetch keeps whatever rates were already
    /// loaded and records the failure message.
    pub async fn load_rates(&self) -> Result<(), ConversionError> {
        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });

        let outcome = self.provider.fetch_rates(&self.base).await;

        match outcome {
            Ok(rates) => {
                info!(base = %self.base, count = rates.len(), "Rates loaded");
                self.state.send_modify(|s| {
                    s.rates = rates;
                    s.is_loading = false;
                    s.error = None;
                });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load rates");
                self.state.send_modify(|s| {
                    s.is_loading = false;
                    s.error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }

    /// Runs [`Self::load_rates`] on a background task.
    pub fn spawn_load(self: &Arc<Self>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            // Failure is already published into state.
            let _ = engine.load_rates().await;
        })
    }

    /// Converts the current amount through the base currency.
    ///
    /// On failure the previous result is kept and only `error` changes.
    pub fn convert(&self) -> ConversionResult {
        let state = self.snapshot();
        let request = &state.request;

        let outcome = compute(
            &state.rates,
            request.amount,
            &request.from_currency,
            &request.to_currency,
        );

        match &outcome {
            Ok(value) => {
                debug!(
                    from = %request.from_currency,
                    to = %request.to_currency,
                    amount = request.amount,
                    value,
                    "Converted"
                );
                let value = *value;
                self.state.send_modify(|s| {
                    s.result = Some(value);
                    s.error = None;
                });
            }
            Err(e) => {
                let message = e.to_string();
                self.state.send_modify(|s| s.error = Some(message));
            }
        }
        outcome
    }
}

fn compute(rates: &RateTable, amount: f64, from: &str, to: &str) -> ConversionResult {
    if rates.is_empty() {
        return Err(ConversionError::RatesUnavailable);
    }
    let from_rate = rates
        .rate_of(from)
        .ok_or(ConversionError::RatesUnavailable)?;
    let to_rate = rates.rate_of(to).ok_or(ConversionError::RatesUnavailable)?;

    if from == rates.base() {
        Ok(amount * to_rate)
    } else {
        Ok((amount / from_rate) * to_rate)
    }
}
