use std::sync::Arc;

use crate::core::AppConfig;
use crate::intake::EmailIntake;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub intake: Arc<EmailIntake>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(intake: EmailIntake, config: AppConfig) -> Self {
        Self {
            intake: Arc::new(intake),
            config,
        }
    }
}
