//! Client for the daemon's HTTP control API.
//!
//! Requests change state on the daemon only. Their effect reaches the local
//! store when the daemon confirms it with a `config_updated` or
//! `targets_updated` stream frame. Nothing here retries.
//!
//! ## Example
//!
//! ```rust,no_run
//! use netpulse_dash::control::ControlClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ControlClient::builder()
//!         .endpoint("http://localhost:7331")
//!         .build()?;
//!
//!     let config = client.get_config().await?;
//!     for target in &config.targets {
//!         println!("{} -> {}:{}", target.label, target.host, target.port);
//!     }
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use netpulse_types::{Ack, ConfigUpdate, DaemonConfig, DaemonHealth, TargetRequest};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ControlError;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:7331";
pub const DEFAULT_API_PREFIX: &str = "/api";

#[derive(Debug, Clone)]
pub struct ControlClient {
    client: Client,
    base: String,
}

impl ControlClient {
    pub fn builder() -> ControlClientBuilder {
        ControlClientBuilder::default()
    }

    /// Full URL of an API route.
    pub fn url(&self, route: &str) -> String {
        format!("{}{}", self.base, route)
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<DaemonHealth, ControlError> {
        let response = self.client.get(self.url("/health")).send().await?;
        decode(response).await
    }

    /// `GET /config`
    pub async fn get_config(&self) -> Result<DaemonConfig, ControlError> {
        let response = self.client.get(self.url("/config")).send().await?;
        decode(response).await
    }

    /// `POST /config` with only the fields set in `update`.
    pub async fn update_config(&self, update: &ConfigUpdate) -> Result<(), ControlError> {
        debug!(?update, "updating daemon config");
        let response = self
            .client
            .post(self.url("/config"))
            .json(update)
            .send()
            .await?;
        acknowledge(response).await.map(|_| ())
    }

    /// Ask the daemon to probe a new endpoint. Returns the assigned id.
    pub async fn add_target(
        &self,
        host: &str,
        port: u16,
        label: &str,
    ) -> Result<Option<String>, ControlError> {
        let request = TargetRequest::Add {
            host: host.to_string(),
            port,
            label: label.to_string(),
        };
        let ack = self.send_target_request(&request).await?;
        Ok(ack.target_id)
    }

    pub async fn remove_target(&self, target_id: &str) -> Result<(), ControlError> {
        let request = TargetRequest::Remove {
            target_id: target_id.to_string(),
        };
        self.send_target_request(&request).await.map(|_| ())
    }

    async fn send_target_request(&self, request: &TargetRequest) -> Result<Ack, ControlError> {
        debug!(?request, "target request");
        let response = self
            .client
            .post(self.url("/targets"))
            .json(request)
            .send()
            .await?;
        acknowledge(response).await
    }
}

/// Decode a successful body, or turn a failure into an error.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ControlError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(rejection(status, &body));
    }

    serde_json::from_slice(&body).map_err(|e| ControlError::Parse(e.to_string()))
}

/// Like [`decode`] for `{ok, error?}` bodies, also failing on `ok: false`.
async fn acknowledge(response: Response) -> Result<Ack, ControlError> {
    let ack: Ack = decode(response).await?;
    if ack.ok {
        Ok(ack)
    } else {
        Err(ControlError::Rejected(
            ack.error.unwrap_or_else(|| "request rejected".to_string()),
        ))
    }
}

/// The daemon explains refusals in an `{ok:false,error}` body; anything else
/// is reported by status.
fn rejection(status: reqwest::StatusCode, body: &[u8]) -> ControlError {
    match serde_json::from_slice::<Ack>(body) {
        Ok(Ack {
            error: Some(message),
            ..
        }) => ControlError::Rejected(message),
        _ => ControlError::Http(format!("daemon returned status {}", status)),
    }
}

#[derive(Debug, Default)]
pub struct ControlClientBuilder {
    endpoint: Option<String>,
    api_prefix: Option<String>,
    timeout: Option<Duration>,
}

impl ControlClientBuilder {
    /// Daemon origin (default: `http://localhost:7331`).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Path prefix of the API routes (default: `/api`).
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = Some(prefix.into());
        self
    }

    /// Request timeout (default: 5 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<ControlClient, ControlError> {
        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let parsed = reqwest::Url::parse(&endpoint)
            .map_err(|e| ControlError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ControlError::InvalidUrl(format!(
                "{}: expected http or https",
                endpoint
            )));
        }

        let prefix = self
            .api_prefix
            .unwrap_or_else(|| DEFAULT_API_PREFIX.to_string());
        let prefix = prefix.trim_end_matches('/');
        let base = format!("{}{}", endpoint.trim_end_matches('/'), prefix);

        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(Duration::from_secs(5)))
            .build()
            .map_err(|e| ControlError::Http(e.to_string()))?;

        Ok(ControlClient { client, base })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use netpulse_types::ThresholdsUpdate;
    use serde_json::json;

    fn client_for(server: &mockito::ServerGuard) -> ControlClient {
        ControlClient::builder()
            .endpoint(server.url())
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let client = ControlClient::builder().build().unwrap();
        assert_eq!(client.url("/health"), "http://localhost:7331/api/health");
    }

    #[test]
    fn test_builder_normalises_slashes() {
        let client = ControlClient::builder()
            .endpoint("https://pulse.example.com/")
            .api_prefix("/v1/")
            .build()
            .unwrap();
        assert_eq!(client.url("/config"), "https://pulse.example.com/v1/config");
    }

    #[test]
    fn test_builder_rejects_bad_url() {
        let err = ControlClient::builder().endpoint("ws://host").build().unwrap_err();
        assert!(matches!(err, ControlError::InvalidUrl(_)));
        let err = ControlClient::builder().endpoint("::nope").build().unwrap_err();
        assert!(matches!(err, ControlError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_health() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/health")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true,"uptime_s":3600}"#)
            .create_async()
            .await;

        let health = client_for(&server).health().await.unwrap();
        assert!(health.ok);
        assert_eq!(health.uptime_s, 3600);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_config() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/config")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"probe_interval_ms":500,"probe_timeout_ms":1500,
                    "thresholds":{"loss_pct":5.0,"p95_ms":100.0,"jitter_ms":20.0},
                    "targets":[{"id":"cloudflare","host":"1.1.1.1","port":443,"label":"Cloudflare"}]}"#,
            )
            .create_async()
            .await;

        let config = client_for(&server).get_config().await.unwrap();
        assert_eq!(config.config.probe_timeout_ms, 1500);
        assert_eq!(config.targets.len(), 1);
        assert_eq!(config.targets[0].host, "1.1.1.1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_config_sends_partial_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/config")
            .match_body(Matcher::Json(json!({"thresholds": {"p95_ms": 150.0}})))
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let update = ConfigUpdate {
            thresholds: Some(ThresholdsUpdate {
                p95_ms: Some(150.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        client_for(&server).update_config(&update).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_add_target_returns_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/targets")
            .match_body(Matcher::Json(
                json!({"action": "add", "host": "9.9.9.9", "port": 443, "label": "Quad9"}),
            ))
            .with_status(200)
            .with_body(r#"{"ok":true,"target_id":"quad9"}"#)
            .create_async()
            .await;

        let id = client_for(&server)
            .add_target("9.9.9.9", 443, "Quad9")
            .await
            .unwrap();
        assert_eq!(id.as_deref(), Some("quad9"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_remove_unknown_target_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/targets")
            .match_body(Matcher::Json(json!({"action": "remove", "target_id": "nope"})))
            .with_status(404)
            .with_body(r#"{"ok":false,"error":"target not found"}"#)
            .expect(1)
            .create_async()
            .await;

        let err = client_for(&server).remove_target("nope").await.unwrap_err();
        assert!(matches!(err, ControlError::Rejected(ref m) if m == "target not found"));
        // Rejections are not retried.
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ok_false_with_success_status_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/config")
            .with_status(200)
            .with_body(r#"{"ok":false}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .update_config(&ConfigUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ControlError::Rejected(_)));
    }

    #[tokio::test]
    async fn test_plain_error_falls_back_to_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/config")
            .with_status(405)
            .with_body("Method not allowed\n")
            .create_async()
            .await;

        let err = client_for(&server).get_config().await.unwrap_err();
        assert!(matches!(err, ControlError::Http(ref m) if m.contains("405")));
    }

    #[tokio::test]
    async fn test_garbage_body_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/health")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let err = client_for(&server).health().await.unwrap_err();
        assert!(matches!(err, ControlError::Parse(_)));
    }
}
