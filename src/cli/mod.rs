use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod provision;
pub mod serve;

use crate::core::{AppConfig, init_tracing};

#[derive(Subcommand)]
enum Command {
    /// Run the landing page and email intake server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "5000")]
        port: String,
    },
    /// Create the email list spreadsheet and print its ID
    Provision {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    init_tracing();
    let config = AppConfig::default();

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port, config).await?;
        }
        Some(Command::Provision {}) => {
            provision::run(config).await?;
        }
        None => {}
    }

    Ok(())
}
