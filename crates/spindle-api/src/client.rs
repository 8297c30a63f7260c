// Array-service HTTP client
//
// Wraps `reqwest::Client` with appliance-specific URL construction and
// response handling. Endpoint modules (arrays, disks) are implemented as
// inherent methods in separate files to keep this module focused on
// transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{ActionMessage, ServiceErrorBody};
use crate::transport::TransportConfig;

/// Raw HTTP client for the appliance's array-management service.
///
/// Mutating endpoints return a `{ message }` envelope on success and an
/// `{ error, detail? }` body on rejection; both are unwrapped here so
/// callers only ever see typed payloads or [`Error`] values.
pub struct ArrayServiceClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ArrayServiceClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the appliance root, e.g. `https://nas.local:8443`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// Used by tests that point at a mock server.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The appliance base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Url {
        let full = format!(
            "{}/api/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        );
        Url::parse(&full).expect("invalid API URL")
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and deserialize the response body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        Self::parse_body(resp).await
    }

    /// Send a POST request with a JSON body and unwrap the action envelope.
    pub(crate) async fn post_action(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<ActionMessage, Error> {
        debug!("POST {}", url);

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_body(resp).await
    }

    /// Send a PUT request with a JSON body and unwrap the action envelope.
    pub(crate) async fn put_action(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<ActionMessage, Error> {
        debug!("PUT {}", url);

        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_body(resp).await
    }

    /// Send a DELETE request and unwrap the action envelope.
    pub(crate) async fn delete_action(&self, url: Url) -> Result<ActionMessage, Error> {
        debug!("DELETE {}", url);

        let resp = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_body(resp).await
    }

    /// Deserialize a response body, mapping non-2xx statuses to
    /// [`Error::Service`] (or [`Error::Authentication`] for 401).
    async fn parse_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "invalid or expired API token".into(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            // Prefer the structured error body; fall back to the status
            // line when the service sent something unparseable.
            let (message, detail) = match serde_json::from_str::<ServiceErrorBody>(&body) {
                Ok(parsed) => (parsed.error, parsed.detail),
                Err(_) => (
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_owned(),
                    None,
                ),
            };
            return Err(Error::Service {
                message,
                detail,
                status: status.as_u16(),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
