use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub connectors_url: String,
    pub repl_identity: Option<String>,
    pub web_repl_renewal: Option<String>,
    pub spreadsheet_id: Option<String>,
    pub spreadsheet_title: String,
    pub sheets_api_url: String,
    pub static_dir: String,
    pub request_timeout: Duration,
}

/// Treat empty env vars the same as unset ones.
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Default for AppConfig {
    fn default() -> Self {
        let connectors_hostname = env::var("REPLIT_CONNECTORS_HOSTNAME")
            .unwrap_or_else(|_| "connectors.replit.com".to_string());
        let connectors_url = format!("https://{}", connectors_hostname);
        let repl_identity = non_empty_var("REPL_IDENTITY");
        let web_repl_renewal = non_empty_var("WEB_REPL_RENEWAL");
        let spreadsheet_id = non_empty_var("SPREADSHEET_ID");
        let spreadsheet_title = env::var("WAITLIST_SPREADSHEET_TITLE")
            .unwrap_or_else(|_| "Email List".to_string());
        let sheets_api_url = env::var("WAITLIST_SHEETS_API_URL")
            .unwrap_or_else(|_| "https://sheets.googleapis.com".to_string());
        let static_dir = env::var("WAITLIST_STATIC_DIR").unwrap_or("public".to_string());
        let request_timeout = env::var("WAITLIST_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));

        Self {
            connectors_url,
            repl_identity,
            web_repl_renewal,
            spreadsheet_id,
            spreadsheet_title,
            sheets_api_url,
            static_dir,
            request_timeout,
        }
    }
}
