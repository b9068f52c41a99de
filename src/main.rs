use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxconv::core::currency::{SUPPORTED_CURRENCIES, is_supported};
use fxconv::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount between two currencies
    Convert {
        /// Amount to convert; anything unparseable counts as zero
        amount: String,

        /// Currency to convert from
        #[arg(short, long, value_parser = parse_currency)]
        from: Option<String>,

        /// Currency to convert to
        #[arg(short, long, value_parser = parse_currency)]
        to: Option<String>,
    },
    /// Display the latest rates for all supported currencies
    Rates,
}

fn parse_currency(raw: &str) -> Result<String, String> {
    let code = raw.trim().to_uppercase();
    if is_supported(&code) {
        Ok(code)
    } else {
        Err(format!(
            "unsupported currency '{raw}', expected one of: {}",
            SUPPORTED_CURRENCIES.join(", ")
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config_path = cli.config_path.as_deref();
    let result = match cli.command {
        Some(Commands::Setup) => fxconv::cli::setup::setup(),
        Some(Commands::Convert { amount, from, to }) => {
            fxconv::run_command(fxconv::AppCommand::Convert { amount, from, to }, config_path)
                .await
        }
        Some(Commands::Rates) => fxconv::run_command(fxconv::AppCommand::Rates, config_path).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
