//! # HTTP Transport
//!
//! A byte-level JSON-RPC transport over HTTP. Every request payload is `POST`ed to the server
//! URL and the response body is handed back to the proxy untouched.
//!
//! Statuses outside of the 2xx range are reported as transport failures, the body of such a
//! response is not inspected.
use async_trait::async_trait;
use jrpc_core::{
    BoxError,
    proxy::DeliveryContext,
    transport::{DataTransport, ProxyTransport},
};
use reqwest::header::{
    ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, InvalidHeaderName,
    InvalidHeaderValue,
};
use std::{sync::Arc, time::Duration};
use thiserror::Error;

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Error, Debug)]
pub enum HttpTransportError {
    #[error("Invalid header key '{key}': '{source}'")]
    InvalidHeaderName {
        key: String,
        source: InvalidHeaderName,
    },
    #[error("Invalid header value for key '{key}': '{source}'")]
    InvalidHeaderValue {
        key: String,
        source: InvalidHeaderValue,
    },
    #[error("Failed to build the HTTP client: '{0}'")]
    ClientBuild(#[source] reqwest::Error),
}

pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    headers: HeaderMap,
}

impl HttpTransport {
    /// Creates a transport sending every request to `url` with the extra `headers`.
    ///
    /// # Arguments
    /// * `url` - The JSON-RPC endpoint (e.g., `http://localhost:8545`).
    /// * `headers` - Additional `(key, value)` headers sent with every request.
    /// * `timeout` - Optional limit for a whole HTTP exchange.
    pub fn new(
        url: impl Into<String>,
        headers: Vec<(String, String)>,
        timeout: Option<Duration>,
    ) -> Result<Self, HttpTransportError> {
        let mut map = HeaderMap::new();
        map.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        map.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));

        for (key, value) in headers {
            let name = HeaderName::from_bytes(key.as_bytes()).map_err(|source| {
                HttpTransportError::InvalidHeaderName {
                    key: key.clone(),
                    source,
                }
            })?;
            let value = HeaderValue::from_str(&value)
                .map_err(|source| HttpTransportError::InvalidHeaderValue { key, source })?;
            map.insert(name, value);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(HttpTransportError::ClientBuild)?;

        Ok(Self {
            client,
            url: url.into(),
            headers: map,
        })
    }
}

#[async_trait]
impl DataTransport for HttpTransport {
    async fn send_request_data(
        &self,
        payload: Vec<u8>,
        _context: &DeliveryContext,
    ) -> Result<Vec<u8>, BoxError> {
        tracing::debug!(url = %self.url, bytes = payload.len(), "POST JSON-RPC request");

        let response = self
            .client
            .post(&self.url)
            .headers(self.headers.clone())
            .body(payload)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.bytes().await?.to_vec())
    }
}

impl ProxyTransport for HttpTransport {
    fn data_capability(self: Arc<Self>) -> Option<Arc<dyn DataTransport>> {
        Some(self)
    }
}
