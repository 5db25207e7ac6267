use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::json;

use crate::config::BrevoConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a relay attempt, reported back to the caller verbatim.
/// `ok` is true only when Brevo acknowledged with a 2xx; `status` carries
/// the upstream HTTP status when a response arrived at all.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RelayOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl RelayOutcome {
    fn skipped() -> Self {
        RelayOutcome {
            ok: false,
            status: None,
        }
    }
}

/// Best-effort relay of newsletter signups to a Brevo contact list.
///
/// A relay failure never fails the signup: the local record is the source
/// of truth and the outcome is reported alongside it. When no API key is
/// configured the relay is inert and every attempt reports `ok: false`.
#[derive(Clone)]
pub struct BrevoRelay {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    list_id: Option<u32>,
}

impl BrevoRelay {
    /// Build a relay from config. The `BREVO_API_KEY` environment variable
    /// takes precedence over the config file so the key can stay out of
    /// files on disk.
    pub fn new(config: &BrevoConfig) -> Self {
        let api_key = std::env::var("BREVO_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .map(SecretString::from)
            .or_else(|| config.api_key.clone().map(SecretString::from));

        if api_key.is_none() {
            tracing::warn!("no Brevo API key configured, newsletter relay disabled");
        }

        BrevoRelay {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            list_id: config.list_id,
        }
    }

    /// Create or update a contact on the configured Brevo list.
    ///
    /// Never returns an error: timeouts, network failures, and non-2xx
    /// responses are logged and collapsed into the outcome.
    pub async fn subscribe_contact(&self, email: &str) -> RelayOutcome {
        let Some(api_key) = &self.api_key else {
            return RelayOutcome::skipped();
        };

        let mut body = json!({
            "email": email,
            "updateEnabled": true,
        });
        if let Some(list_id) = self.list_id {
            body["listIds"] = json!([list_id]);
        }

        let request = self
            .client
            .post(format!("{}/v3/contacts", self.base_url))
            .header("api-key", api_key.expose_secret())
            .json(&body);

        match tokio::time::timeout(REQUEST_TIMEOUT, request.send()).await {
            Ok(Ok(response)) => {
                let status = response.status();
                if !status.is_success() {
                    tracing::warn!(status = status.as_u16(), "Brevo rejected contact");
                }
                RelayOutcome {
                    ok: status.is_success(),
                    status: Some(status.as_u16()),
                }
            }
            Ok(Err(error)) => {
                tracing::warn!(error = %error, "Brevo request failed");
                RelayOutcome::skipped()
            }
            Err(_) => {
                tracing::warn!(timeout_secs = REQUEST_TIMEOUT.as_secs(), "Brevo request timed out");
                RelayOutcome::skipped()
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests(base_url: &str, api_key: &str, list_id: Option<u32>) -> Self {
        BrevoRelay {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: Some(SecretString::from(api_key)),
            list_id,
        }
    }
}

impl std::fmt::Debug for BrevoRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrevoRelay")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("list_id", &self.list_id)
            .finish()
    }
}
