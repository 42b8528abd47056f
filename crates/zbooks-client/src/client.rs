//! HTTP client with transparent session refresh.
//!
//! Every outbound request gets the stored access token attached as a bearer
//! header. When the server answers 401 the client refreshes the access
//! token and re-issues the original request exactly once; the retried
//! response, success or failure, is what the caller observes. A second 401
//! is never retried.
//!
//! Concurrent 401s are coalesced: the first caller through the refresh gate
//! performs the network refresh, later callers find the stored access token
//! already changed and reuse it without touching the refresh endpoint.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiErrorBody};
use crate::session::SessionStore;

#[derive(Debug, serde::Deserialize)]
struct AccessGrant {
    access: String,
}

/// Authenticated HTTP client for the ZBooks API.
///
/// Holds the session store and the refresh gate, so one instance should be
/// shared (for example behind an [`Arc`]) by everything that talks to the
/// backend.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
    refresh_gate: Mutex<()>,
}

impl ApiClient {
    /// Create a client from a configuration and an injected session store.
    pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            store,
            refresh_gate: Mutex::new(()),
        })
    }

    /// The session store this client was built with.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Whether a session is currently stored.
    pub async fn is_authenticated(&self) -> bool {
        matches!(self.store.load().await, Ok(Some(_)))
    }

    /// Issue a raw request with an explicit bearer token, bypassing the
    /// refresh interceptor. Used for the refresh call itself.
    async fn raw_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        bearer: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method, &url);
        if let Some(token) = bearer {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Send a request through the interceptor pipeline.
    ///
    /// Attaches the stored access token when present (absence is a valid
    /// state; the server rejects what it must), and performs the single
    /// transparent refresh-and-retry on 401.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let session = self.store.load().await?;
        let access = session.as_ref().map(|s| s.access_token.clone());

        debug!(%path, authenticated = access.is_some(), "sending request");
        let response = self
            .raw_request(method.clone(), path, body.as_ref(), access.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        // Without a stored refresh token the 401 is the final answer.
        let Some(used_access) = access else {
            return Ok(response);
        };

        warn!(%path, "request unauthorized, refreshing session");
        let fresh_access = self.refreshed_access_token(&used_access).await?;

        // One retry with the refreshed token. Whatever comes back, including
        // a second 401, goes to the caller untouched.
        self.raw_request(method, path, body.as_ref(), Some(&fresh_access))
            .await
    }

    /// Obtain a usable access token after a 401, coalescing concurrent
    /// refresh attempts into a single network call.
    ///
    /// `used_access` is the token the failed request carried. If the stored
    /// token already differs once the gate is acquired, another task has
    /// refreshed in the meantime and that token is reused as-is.
    async fn refreshed_access_token(&self, used_access: &str) -> Result<String, ApiError> {
        let _guard = self.refresh_gate.lock().await;

        let Some(session) = self.store.load().await? else {
            // Session vanished while we waited, e.g. a concurrent logout.
            return Err(ApiError::SessionExpired);
        };

        if session.access_token != used_access {
            debug!("reusing access token refreshed by a concurrent request");
            return Ok(session.access_token);
        }

        match self.request_refresh(&session.refresh_token).await {
            Ok(access) => {
                self.store.update_access_token(&access).await?;
                Ok(access)
            }
            Err(e) => {
                error!(error = %e, "token refresh failed, clearing session");
                self.store.clear().await?;
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// POST the refresh token to `/auth/refresh/` and return the new access
    /// token. The refresh token itself is long-lived and not rotated.
    async fn request_refresh(&self, refresh_token: &str) -> Result<String, ApiError> {
        let body = serde_json::json!({ "refresh": refresh_token });
        let response = self
            .raw_request(Method::POST, "/auth/refresh/", Some(&body), None)
            .await?;

        let grant: AccessGrant = Self::decode(response).await?;
        Ok(grant.access)
    }

    /// Refresh the stored access token explicitly.
    ///
    /// The interceptor is the normal caller; this is exposed for embedders
    /// that want to refresh eagerly (e.g. on application start). On failure
    /// the session is cleared and [`ApiError::SessionExpired`] is returned.
    pub async fn refresh(&self) -> Result<String, ApiError> {
        let Some(session) = self.store.load().await? else {
            return Err(ApiError::SessionExpired);
        };
        match self.request_refresh(&session.refresh_token).await {
            Ok(access) => {
                self.store.update_access_token(&access).await?;
                Ok(access)
            }
            Err(e) => {
                error!(error = %e, "token refresh failed, clearing session");
                self.store.clear().await?;
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// Decode a 2xx response as JSON, or map the status and error body
    /// through the error taxonomy.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let raw = response.text().await.unwrap_or_default();
        Err(ApiError::Api {
            status: status.as_u16(),
            body: ApiErrorBody::decode(&raw),
        })
    }

    /// GET `path` and decode the JSON response.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(Method::GET, path, None).await?;
        Self::decode(response).await
    }

    /// POST `body` to `path` and decode the JSON response.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<T, ApiError> {
        let response = self.send(Method::POST, path, Some(body)).await?;
        Self::decode(response).await
    }

    /// POST to `path`, checking the status but discarding the response body.
    pub async fn post_empty(&self, path: &str, body: Option<Value>) -> Result<(), ApiError> {
        let response = self.send(Method::POST, path, body).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let raw = response.text().await.unwrap_or_default();
        Err(ApiError::Api {
            status: status.as_u16(),
            body: ApiErrorBody::decode(&raw),
        })
    }

    /// PUT `body` to `path` and decode the JSON response.
    pub async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<T, ApiError> {
        let response = self.send(Method::PUT, path, Some(body)).await?;
        Self::decode(response).await
    }
}
