// RouterOS REST HTTP client
//
// Wraps `reqwest::Client` with RouterOS-specific URL construction, basic
// auth, and error-body parsing. All endpoint modules (hotspot, scheduler)
// are implemented as inherent methods via separate files to keep this
// module focused on transport mechanics.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::routeros::models::RestError;
use crate::transport::TransportConfig;

/// Raw HTTP client for the RouterOS v7 REST API.
///
/// Every console path maps to a REST path under `/rest` — e.g.
/// `/ip hotspot user` becomes `GET /rest/ip/hotspot/user`. Responses are
/// plain JSON (arrays for collection reads, objects for single writes);
/// failures carry an `{error, message, detail}` body which is surfaced as
/// [`Error::RouterOs`].
pub struct RouterOsClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
}

impl RouterOsClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` should be the router root (e.g. `https://192.168.88.1`);
    /// the `/rest` prefix is appended per request. RouterOS REST requires
    /// credentials of a router user with `api` + `rest-api` policy.
    pub fn new(
        base_url: Url,
        username: String,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url, username, password })
    }

    /// The router base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a REST path: `{base}/rest/{path}`
    pub(crate) fn rest_url(&self, path: &str) -> Url {
        let full = format!(
            "{}/rest/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&full).expect("invalid REST URL")
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request with query parameters and parse the JSON array.
    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, Error> {
        let url = self.rest_url(path);
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .query(query)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_body(resp).await
    }

    /// Send a PUT request (RouterOS "add") and parse the created object.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        let url = self.rest_url(path);
        debug!("PUT {}", url);

        let resp = self
            .http
            .put(url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_body(resp).await
    }

    /// Send a PATCH request (RouterOS "set") and parse the updated object.
    pub(crate) async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        let url = self.rest_url(path);
        debug!("PATCH {}", url);

        let resp = self
            .http
            .patch(url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .json(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::parse_body(resp).await
    }

    /// Send a DELETE request (RouterOS "remove"); the body is discarded.
    pub(crate) async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.rest_url(path);
        debug!("DELETE {}", url);

        let resp = self
            .http
            .delete(url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        Err(Self::error_from_body(status, resp.text().await.unwrap_or_default()))
    }

    /// Parse a success body as JSON, or a failure body as [`Error::RouterOs`].
    async fn parse_body<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Self::error_from_body(status, body));
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    fn error_from_body(status: reqwest::StatusCode, body: String) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Authentication {
                message: "router rejected the API credentials".into(),
            };
        }

        let parsed: Option<RestError> = serde_json::from_str(&body).ok();
        match parsed {
            Some(e) => Error::RouterOs {
                status: status.as_u16(),
                message: e.message.unwrap_or_else(|| status.to_string()),
                detail: e.detail,
            },
            None => Error::RouterOs {
                status: status.as_u16(),
                message: if body.is_empty() { status.to_string() } else { body },
                detail: None,
            },
        }
    }
}
