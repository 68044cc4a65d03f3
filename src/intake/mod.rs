//! Email intake: validate, dedupe and append submitted addresses to the
//! mailing list spreadsheet.

mod email;
mod locks;

use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::core::AppConfig;
use crate::google::{GoogleSheets, SheetStore};

pub use email::normalize_email;
pub use locks::{KeyedGuard, KeyedLocks};

pub const EMAILS_SHEET_TITLE: &str = "User Emails";
pub const HEADER_ROW: [&str; 2] = ["Email Address", "Date Submitted"];
pub const EMAIL_COLUMN_RANGE: &str = "User Emails!A:A";
pub const EMAIL_ROW_RANGE: &str = "User Emails!A:B";

// e.g. 10/18/2026, 3:04:05 PM
const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submitted {
    pub message: String,
}

pub struct EmailIntake {
    store: Arc<dyn SheetStore>,
    spreadsheet_title: String,
    spreadsheet_id: OnceCell<String>,
    locks: KeyedLocks,
}

impl EmailIntake {
    /// `spreadsheet_id` of `None` means a spreadsheet is created on the
    /// first submission and reused for the life of this instance.
    pub fn new(
        store: Arc<dyn SheetStore>,
        spreadsheet_id: Option<String>,
        spreadsheet_title: &str,
    ) -> Self {
        Self {
            store,
            spreadsheet_title: spreadsheet_title.to_string(),
            spreadsheet_id: OnceCell::new_with(spreadsheet_id),
            locks: KeyedLocks::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = Arc::new(GoogleSheets::from_config(config)?);
        Ok(Self::new(
            store,
            config.spreadsheet_id.clone(),
            &config.spreadsheet_title,
        ))
    }

    pub async fn submit(&self, raw_email: &str) -> Result<Submitted, IntakeError> {
        let email = normalize_email(raw_email)?;
        let spreadsheet_id = self.spreadsheet_id().await?;

        // Held across the lookup and the append so two submissions of the
        // same address can't both miss the existing row
        let _guard = self.locks.lock(&email).await;

        let rows = self
            .store
            .get_values(&spreadsheet_id, EMAIL_COLUMN_RANGE)
            .await?;
        let exists = rows.iter().any(|row| {
            row.first()
                .is_some_and(|cell| cell.trim().to_lowercase() == email)
        });
        if exists {
            tracing::debug!("Skipping duplicate submission");
            return Err(IntakeError::Conflict(
                "Email already submitted!".to_string(),
            ));
        }

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.store
            .append_values(
                &spreadsheet_id,
                EMAIL_ROW_RANGE,
                vec![vec![email, timestamp]],
            )
            .await?;
        tracing::info!("Recorded new email submission in {}", spreadsheet_id);

        Ok(Submitted {
            message: "Email submitted successfully!".to_string(),
        })
    }

    /// The configured spreadsheet, or one created on first use. Concurrent
    /// callers share a single creation; a failed creation is retried by the
    /// next caller.
    pub async fn spreadsheet_id(&self) -> Result<String, IntakeError> {
        let id = self
            .spreadsheet_id
            .get_or_try_init(|| self.provision())
            .await?;
        Ok(id.clone())
    }

    /// Create a new spreadsheet with the header row. Does not touch the
    /// cached id.
    pub async fn provision(&self) -> Result<String> {
        let id = self
            .store
            .create_spreadsheet(&self.spreadsheet_title, EMAILS_SHEET_TITLE, &HEADER_ROW)
            .await?;
        tracing::info!("Created spreadsheet with ID: {}", id);
        tracing::info!("Set SPREADSHEET_ID={} to keep using it after a restart", id);
        Ok(id)
    }
}
