use std::path::PathBuf;

use anyhow::{Context, Result};
use cartbeacon_core::TrackerConfig;
use clap::{Parser, Subcommand};
use console::style;
use tracing::Level;

use crate::journey::Journey;

mod journey;
mod storefront;

#[derive(Parser)]
#[command(name = "cartbeacon")]
#[command(about = "Storefront analytics capture with exactly-once delivery to the client queue")]
struct Cli {
    /// Config file. Defaults to the user config directory.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk one shopper from the shop page to a paid order and print the client queue
    Demo {
        /// Override the configured currency (e.g., "EUR")
        #[arg(long)]
        currency: Option<String>,

        /// Also print the inline script of every full-page response
        #[arg(long)]
        html: bool,
    },
    /// Print the effective configuration
    Config,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(Level::INFO.as_str()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<PathBuf>) -> Result<TrackerConfig> {
    let path = path.unwrap_or_else(TrackerConfig::default_path);
    TrackerConfig::load_or_default(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match load_config(cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {:#}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Command::Demo { currency, html } => {
            if let Some(currency) = currency {
                config.currency = currency.to_ascii_uppercase();
                config.validate()?;
            }

            println!(
                "{} {}",
                style("Storefront journey").bold(),
                style(format!("[{}]", config.currency)).cyan()
            );
            println!();

            let report = Journey::new(config).run().await;

            if html {
                for (label, script) in &report.scripts {
                    if script.is_empty() {
                        continue;
                    }
                    println!();
                    println!("{}", style(format!("── {label} ──")).cyan());
                    print!("{script}");
                }
            }

            println!();
            println!("{}", style("Client queue").bold());
            let queue = serde_json::to_string_pretty(report.client.data_layer().messages())?;
            println!("{queue}");

            println!();
            println!("{}", style("Tracker metrics").bold());
            println!("{}", serde_json::to_string_pretty(&report.metrics)?);

            println!();
            println!(
                "{} {} messages in the queue",
                style("✓").green().bold(),
                report.client.data_layer().len()
            );
        }
    }

    Ok(())
}
