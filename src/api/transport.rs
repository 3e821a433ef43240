//! HTTP transport used by the dispatcher
//!
//! The [`Transport`] trait keeps the dispatcher independent of the HTTP client
//! so it can be driven by a stub in tests. [`HttpTransport`] is the real
//! implementation on top of `reqwest`.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::{Credentials, Method, RequestDescriptor};

/// Raw HTTP response. Non-2xx statuses are not errors at this level: the
/// backend reports failures in the JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid base URL '{0}': {1}")]
    InvalidBaseUrl(String, url::ParseError),

    #[error("Invalid endpoint '{0}': {1}")]
    InvalidEndpoint(String, url::ParseError),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {0} failed: {1}")]
    Request(String, #[source] reqwest::Error),

    #[error("Failed to read response from {0}: {1}")]
    Body(String, #[source] reqwest::Error),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RequestDescriptor) -> Result<TransportResponse, TransportError>;
}

/// `reqwest`-backed transport bound to one backend
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpTransport {
    /// Create a transport for `base_url`. The token, when present, is sent as
    /// `Authorization: token <value>` according to each request's credential mode.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, TransportError> {
        let base_url =
            Url::parse(base_url).map_err(|e| TransportError::InvalidBaseUrl(base_url.to_string(), e))?;
        let client = Client::builder().build().map_err(TransportError::Client)?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for a request, including GET query parameters
    pub fn resolve(&self, request: &RequestDescriptor) -> Result<Url, TransportError> {
        let mut url = self
            .base_url
            .join(request.endpoint())
            .map_err(|e| TransportError::InvalidEndpoint(request.endpoint().to_string(), e))?;

        let pairs = request.query_pairs();
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &pairs {
                query.append_pair(key, value);
            }
        }

        Ok(url)
    }

    fn should_attach_token(&self, credentials: Credentials, url: &Url) -> bool {
        match credentials {
            Credentials::Include => true,
            Credentials::Omit => false,
            Credentials::SameOrigin => url.origin() == self.base_url.origin(),
        }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<TransportResponse, TransportError> {
        let url = self.resolve(request)?;
        let options = request.options();

        let mut builder = self.client.request(to_reqwest_method(request.method()), url.clone());
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(token) = &self.token {
            if self.should_attach_token(options.credentials, &url) {
                builder = builder.header("Authorization", format!("token {}", token));
            }
        }

        if let Some(body) = &options.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(url.to_string(), e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Body(url.to_string(), e))?;

        Ok(TransportResponse { status, body })
    }
}
