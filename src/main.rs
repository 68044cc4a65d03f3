use anyhow::Result;
use waitlist::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
