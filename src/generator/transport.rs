//! Transport for `POST {base_url}/cooking`.
//!
//! The service reports failures inside the JSON envelope, so the body is
//! decoded whatever the HTTP status. Only connectivity problems and bodies
//! that are not a valid envelope become [`NetworkError`]s.

use crate::types::{CookingRequest, CookingResponse};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Shown when a transport failure carries no usable message.
pub const NETWORK_FAILURE_MESSAGE: &str =
    "A network error occurred. Please check your connection.";

#[derive(Error, Debug)]
pub enum NetworkError {
    /// Connect, send or receive failed.
    #[error("{0}")]
    Transport(String),
    /// The body was not a valid response envelope.
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("{}", NETWORK_FAILURE_MESSAGE)]
    Unknown,
}

impl NetworkError {
    /// Text for the `error` state: the error's own message, or the fixed
    /// network-failure message when it has none.
    pub fn user_message(&self) -> String {
        match self {
            NetworkError::Transport(m) if m.trim().is_empty() => NETWORK_FAILURE_MESSAGE.into(),
            NetworkError::Unknown => NETWORK_FAILURE_MESSAGE.into(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for NetworkError {
    fn from(e: reqwest::Error) -> Self {
        NetworkError::Transport(e.to_string())
    }
}

/// Something that can turn a [`CookingRequest`] into a [`CookingResponse`].
#[async_trait]
pub trait RecipeApi: Send + Sync {
    async fn cook(&self, request: &CookingRequest) -> Result<CookingResponse, NetworkError>;
}

#[async_trait]
impl<T: RecipeApi + ?Sized> RecipeApi for std::sync::Arc<T> {
    async fn cook(&self, request: &CookingRequest) -> Result<CookingResponse, NetworkError> {
        (**self).cook(request).await
    }
}

/// [`RecipeApi`] over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpRecipeApi {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRecipeApi {
    /// `timeout` of `None` lets a request run until the server answers.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, NetworkError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            endpoint: join_url(base_url, "/cooking"),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RecipeApi for HttpRecipeApi {
    async fn cook(&self, request: &CookingRequest) -> Result<CookingResponse, NetworkError> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!(%status, bytes = body.len(), "cooking response received");
        serde_json::from_slice(&body).map_err(|e| NetworkError::Decode(format!("HTTP {status}: {e}")))
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}
