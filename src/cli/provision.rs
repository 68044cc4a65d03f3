use anyhow::Result;

use crate::core::AppConfig;
use crate::intake::EmailIntake;

/// Create the spreadsheet ahead of time so the server never has to
/// provision one lazily.
pub async fn run(config: AppConfig) -> Result<()> {
    if let Some(id) = &config.spreadsheet_id {
        tracing::warn!("SPREADSHEET_ID is already set to {}", id);
    }

    let intake = EmailIntake::from_config(&config)?;
    let id = intake.provision().await?;

    println!("Add this to your environment variables:");
    println!("SPREADSHEET_ID={}", id);
    Ok(())
}
