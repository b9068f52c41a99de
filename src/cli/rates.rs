use super::ui;
use crate::core::{ConversionEngine, RateTable};
use anyhow::{Context, Result};
use comfy_table::Cell;
use std::sync::Arc;

pub async fn run(engine: Arc<ConversionEngine>) -> Result<()> {
    let spinner = ui::new_spinner("Fetching exchange rates...");
    let outcome = engine.load_rates().await;
    spinner.finish_and_clear();
    outcome.context("Could not load exchange rates")?;

    let state = engine.snapshot();
    println!("{}", display_as_table(&state.rates, engine.currencies()));
    Ok(())
}

/// Rate of each currency against the table's base, one row per code.
pub fn display_as_table(rates: &RateTable, currencies: &[&str]) -> String {
    let base = rates.base();
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Per 1 {base}")),
        ui::header_cell(&format!("In {base}")),
    ]);

    for code in currencies {
        let rate = rates.rate_of(code);
        table.add_row(vec![
            Cell::new(code),
            ui::format_optional_cell(rate, |r| format!("{r:.4}")),
            ui::format_optional_cell(rate, |r| format!("{:.4}", 1.0 / r)),
        ]);
    }

    let as_of = rates
        .as_of()
        .map_or("unknown date".to_string(), |d| d.to_string());

    format!(
        "Exchange rates ({})\n\n{}\n\n{}",
        ui::style_text(base, ui::StyleType::Title),
        table,
        ui::style_text(&format!("As of {as_of}"), ui::StyleType::Subtle)
    )
}
