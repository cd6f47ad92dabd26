//! Request transport.
//!
//! Every backend call goes through [`Transport::request`]. The production
//! implementation is [`HttpTransport`]; tests substitute scripted transports.

use std::future::Future;

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::error::{Result, TransportError};

/// HTTP method of a backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read.
    Get,
    /// Create, update or trigger.
    Post,
    /// Remove.
    Delete,
}

impl Method {
    /// Upper-case method name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Delete => Self::DELETE,
        }
    }
}

/// Sends one request to the backend and returns its decoded JSON body.
///
/// Implementations must fail with a [`TransportError`] on any non-success
/// status or connection failure, and must not retry on their own.
pub trait Transport: Send + Sync + 'static {
    /// Performs `method path` with an optional JSON body.
    ///
    /// An empty success body decodes as [`Value::Null`].
    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> impl Future<Output = Result<Value>> + Send;
}

/// Transport backed by a single `reqwest` client bound to one origin.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Builds the transport from the connection settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.clone(),
        })
    }

    /// The origin requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resolve(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

impl Transport for HttpTransport {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        let url = self.resolve(path)?;
        debug!(%method, %url, "sending request");

        let mut request = self.client.request(method.into(), url);
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(%method, path, "request failed: {e}");
            classify(e, method, path)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%method, path, status = status.as_u16(), "backend rejected request");
            return Err(TransportError::Status {
                method,
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify(e, method, path))?;
        debug!(%method, path, status = status.as_u16(), len = bytes.len(), "response received");

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn classify(error: reqwest::Error, method: Method, path: &str) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout {
            method,
            path: path.to_string(),
        }
    } else {
        TransportError::Http(error)
    }
}
