//! Authorized request gateway.
//!
//! Every outbound call funnels through one [`Gateway`] with one base address
//! fixed at construction. Before a request leaves, the credential store is
//! consulted: token present, an `Authorization: Bearer` header goes on;
//! token absent, the call proceeds unauthenticated and the service gets to
//! reject it. Responses are not transformed — no retry, no redirect on 401,
//! no token refresh; failures come back to the caller as [`GatewayError`].

use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use web_sys::FormData;

use crate::credentials::CredentialStore;

/// Default target for local development; production builds bake in their
/// address through the `STASHR_API_URL` compile-time override.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

/// Base address for all outbound calls, decided once at startup. No runtime
/// override, no per-request choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        ApiConfig { base_url }
    }

    /// Compile-time configuration: `STASHR_API_URL` when set at build time,
    /// the local development address otherwise.
    pub fn from_build_env() -> Self {
        ApiConfig::new(option_env!("STASHR_API_URL").unwrap_or(DEFAULT_BASE_URL))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig::from_build_env()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The call never produced a response (network down, CORS, bad URL).
    #[error("request failed: {0}")]
    Network(String),
    /// The service answered with a non-2xx status and an error payload.
    #[error("service answered {status}: {message}")]
    Service { status: u16, message: String },
}

impl GatewayError {
    /// Server-provided payload when there is one, else the given fallback.
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            GatewayError::Service { message, .. } if !message.trim().is_empty() => {
                message.clone()
            }
            _ => fallback.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Gateway {
    config: ApiConfig,
    store: CredentialStore,
}

impl Gateway {
    pub fn new(config: ApiConfig) -> Self {
        Gateway {
            config,
            store: CredentialStore::new(),
        }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// The request-interceptor stage: injects the stored credential when one
    /// exists.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.store.get() {
            Some(token) => request.header("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let response = self
            .authorize(Request::get(&self.url(path)))
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        let response = Self::check(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))
    }

    /// POSTs a JSON body and hands back the raw response so callers can read
    /// out-of-band headers (login delivers its token that way).
    pub async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, GatewayError> {
        let response = self
            .authorize(Request::post(&self.url(path)))
            .json(body)
            .map_err(|e| GatewayError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Self::check(response).await
    }

    pub async fn post_multipart(
        &self,
        path: &str,
        form: FormData,
    ) -> Result<Response, GatewayError> {
        let response = self
            .authorize(Request::post(&self.url(path)))
            .body(form)
            .map_err(|e| GatewayError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;
        Self::check(response).await
    }

    /// The response-interceptor stage: propagates failures untouched.
    async fn check(response: Response) -> Result<Response, GatewayError> {
        if response.ok() {
            return Ok(response);
        }
        let status = response.status();
        let message = response.text().await.unwrap_or_default();
        Err(GatewayError::Service { status, message })
    }
}
