//! Access tokens for the Google Sheets connector.
//!
//! The connector service exchanges the identity token of the running
//! repl (or deployment) for a short lived OAuth access token. The whole
//! connection descriptor is cached so its expiry can be checked on the
//! next call without going back to the network.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use http::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::core::AppConfig;

const CONNECTOR_NAME: &str = "google-sheet";
const IDENTITY_HEADER: &str = "X_REPLIT_TOKEN";
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("X_REPLIT_TOKEN not found for repl/depl")]
    MissingIdentity,
    #[error("Google Sheet not connected")]
    NotConnected,
}

/// Supplies the identity token sent to the connector service.
pub trait IdentitySource: Send + Sync {
    fn resolve_identity_token(&self) -> Result<String, AuthError>;
}

/// Identity taken from the environment. An interactive repl identity
/// wins over a deployment renewal token.
#[derive(Clone, Debug, Default)]
pub struct EnvIdentity {
    pub repl_identity: Option<String>,
    pub web_repl_renewal: Option<String>,
}

impl EnvIdentity {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            repl_identity: config.repl_identity.clone(),
            web_repl_renewal: config.web_repl_renewal.clone(),
        }
    }
}

impl IdentitySource for EnvIdentity {
    fn resolve_identity_token(&self) -> Result<String, AuthError> {
        if let Some(identity) = &self.repl_identity {
            return Ok(format!("repl {}", identity));
        }
        if let Some(renewal) = &self.web_repl_renewal {
            return Ok(format!("depl {}", renewal));
        }
        Err(AuthError::MissingIdentity)
    }
}

#[derive(Debug, Deserialize)]
struct ConnectionList {
    #[serde(default)]
    items: Vec<Connection>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Connection {
    #[serde(default)]
    pub settings: ConnectionSettings,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ConnectionSettings {
    pub access_token: Option<String>,
    /// RFC 3339 string or epoch milliseconds.
    pub expires_at: Option<Value>,
    pub oauth: Option<OAuthSettings>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OAuthSettings {
    pub credentials: Option<OAuthCredentials>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OAuthCredentials {
    pub access_token: Option<String>,
}

impl Connection {
    /// The bearer token, either top level or nested under the OAuth
    /// credentials.
    pub fn access_token(&self) -> Option<&str> {
        let settings = &self.settings;
        settings
            .access_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| {
                settings
                    .oauth
                    .as_ref()?
                    .credentials
                    .as_ref()?
                    .access_token
                    .as_deref()
                    .filter(|t| !t.is_empty())
            })
    }

    /// Anything other than an RFC 3339 string or epoch milliseconds
    /// reads as no expiry.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self.settings.expires_at.as_ref()? {
            Value::String(raw) => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            Value::Number(millis) => millis
                .as_i64()
                .or_else(|| millis.as_f64().map(|f| f as i64))
                .and_then(DateTime::from_timestamp_millis),
            _ => None,
        }
    }

    /// A connection without an expiry is never reused.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at(), Some(expires_at) if expires_at > now)
    }
}

pub struct TokenCache {
    http: reqwest::Client,
    connection_url: reqwest::Url,
    identity: Box<dyn IdentitySource>,
    cached: Mutex<Option<Connection>>,
}

impl TokenCache {
    pub fn new(
        connectors_url: &str,
        identity: impl IdentitySource + 'static,
        timeout: Duration,
    ) -> Result<Self> {
        let mut connection_url =
            reqwest::Url::parse(&format!("{}/api/v2/connection", connectors_url))
                .context("Invalid connectors URL")?;
        connection_url
            .query_pairs_mut()
            .append_pair("include_secrets", "true")
            .append_pair("connector_names", CONNECTOR_NAME);
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            connection_url,
            identity: Box::new(identity),
            cached: Mutex::new(None),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            &config.connectors_url,
            EnvIdentity::from_config(config),
            config.request_timeout,
        )
    }

    /// Returns a valid access token, refreshing from the connector when
    /// the cached one is missing or expired. Callers that arrive during a
    /// refresh wait for it rather than issuing their own.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(connection) = cached.as_ref()
            && connection.is_fresh_at(Utc::now())
            && let Some(token) = connection.access_token()
        {
            return Ok(token.to_string());
        }

        let identity = self.identity.resolve_identity_token()?;
        let connection = self.fetch_connection(&identity).await?;
        *cached = connection;

        let token = cached
            .as_ref()
            .and_then(|c| c.access_token())
            .ok_or(AuthError::NotConnected)?;
        tracing::debug!("Refreshed Google Sheets access token");

        Ok(token.to_string())
    }

    async fn fetch_connection(&self, identity: &str) -> Result<Option<Connection>> {
        let result = match self.request_connection(identity).await {
            Err(err) if is_transient(&err) => {
                tracing::warn!("Connector request failed, retrying once: {}", err);
                tokio::time::sleep(RETRY_BACKOFF).await;
                self.request_connection(identity).await
            }
            result => result,
        };

        result.context("Failed to fetch connection settings")
    }

    async fn request_connection(
        &self,
        identity: &str,
    ) -> Result<Option<Connection>, reqwest::Error> {
        let list: ConnectionList = self
            .http
            .get(self.connection_url.clone())
            .header(ACCEPT, "application/json")
            .header(IDENTITY_HEADER, identity)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(list.items.into_iter().next())
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout()
        || err.is_connect()
        || err.status().is_some_and(|status| status.is_server_error())
}
