use super::ui;
use crate::core::{ConversionEngine, UiState};
use anyhow::{Result, anyhow};
use std::sync::Arc;
use tracing::info;

/// Loads rates, runs a single conversion and prints the result.
pub async fn run(engine: Arc<ConversionEngine>, amount: &str, from: &str, to: &str) -> Result<()> {
    engine.set_amount(amount);
    engine.set_from_currency(from);
    engine.set_to_currency(to);

    let spinner = ui::new_spinner("Fetching exchange rates...");
    let load = engine.spawn_load();
    load.await?;
    spinner.finish_and_clear();

    if let Some(error) = engine.snapshot().error {
        return Err(anyhow!(error).context("Could not load exchange rates"));
    }

    info!(%from, %to, "Converting");
    let outcome = engine.convert();
    let state = engine.snapshot();
    println!("{}", render(&state));

    outcome.map(|_| ()).map_err(anyhow::Error::from)
}

/// Renders the result line, or the error when the last convert failed.
pub fn render(state: &UiState) -> String {
    if let Some(error) = &state.error {
        return ui::style_text(error, ui::StyleType::Error);
    }
    match state.result {
        Some(value) => format!(
            "{} {} {}",
            ui::style_text("Result:", ui::StyleType::ResultLabel),
            ui::style_text(&ui::format_amount(value), ui::StyleType::ResultValue),
            state.request.to_currency
        ),
        None => ui::style_text("No result", ui::StyleType::Subtle),
    }
}
