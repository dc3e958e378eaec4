use std::time::{Duration, Instant};

use crate::config::ConfigError;
use crate::error::ApiError;
use crate::metrics::{UPSTREAM_FAILURES, UPSTREAM_LATENCY};
use crate::models::ForwardPayload;

/// Value left in deployments that never configured the Apps Script.
pub const PLACEHOLDER_URL: &str = "SUA_URL_DO_APPS_SCRIPT_AQUI";

// Relays validated guesses to the Apps Script web app
pub struct Forwarder {
    client: reqwest::Client,
    url: Option<String>,
}

impl Forwarder {
    pub fn new(url: Option<String>, timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let url = url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty() && u != PLACEHOLDER_URL);

        if url.is_none() {
            tracing::warn!("APPS_SCRIPT_URL not configured, saves will fail");
        }

        Ok(Self { client, url })
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }

    /// One POST, no retries. Timeouts and non-2xx statuses become `UpstreamError`.
    pub async fn forward(&self, payload: &ForwardPayload<'_>) -> Result<(), ApiError> {
        let Some(url) = self.url.as_deref() else {
            tracing::error!("refusing to forward, Apps Script URL not configured");
            return Err(ApiError::ConfigurationError);
        };

        let start_time = Instant::now();
        let result = self.client.post(url).json(payload).send().await;
        UPSTREAM_LATENCY.observe(start_time.elapsed().as_secs_f64());

        let failure = match result {
            Ok(res) if res.status().is_success() => return Ok(()),
            Ok(res) => {
                let status = res.status();
                let body = res.text().await.unwrap_or_default();
                tracing::error!(%status, body = %body, "Apps Script rejected the guesses");
                format!("Erro ao salvar no Google Sheets (HTTP {})", status.as_u16())
            }
            Err(e) if e.is_timeout() => {
                tracing::error!(error = %e, "Apps Script request timed out");
                "Tempo esgotado ao contatar o Google Sheets".to_string()
            }
            Err(e) => {
                tracing::error!(error = %e, "Apps Script request failed");
                format!("Falha ao contatar o Google Sheets: {e}")
            }
        };

        UPSTREAM_FAILURES.inc();
        Err(ApiError::UpstreamError(failure))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_and_blank_urls_are_unconfigured() {
        let timeout = Duration::from_secs(1);
        for url in [None, Some(""), Some("   "), Some(PLACEHOLDER_URL)] {
            let forwarder = Forwarder::new(url.map(String::from), timeout).unwrap();
            assert!(!forwarder.is_configured(), "{url:?}");
        }
        let forwarder =
            Forwarder::new(Some("https://script.example/exec".into()), timeout).unwrap();
        assert!(forwarder.is_configured());
    }

    #[tokio::test]
    async fn unconfigured_forward_fails_without_network() {
        let forwarder = Forwarder::new(None, Duration::from_secs(1)).unwrap();
        let guesses = std::collections::BTreeMap::new();
        let payload = ForwardPayload {
            participante: "Felipe",
            palpites: &guesses,
        };
        let err = forwarder.forward(&payload).await.unwrap_err();
        assert!(matches!(err, ApiError::ConfigurationError));
    }
}
