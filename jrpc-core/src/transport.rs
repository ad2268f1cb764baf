//! # Transport
//!
//! The proxy does not move bytes itself. It hands every request to an external transport
//! (HTTP, WebSocket, IPC...) which may offer one or both of two capabilities:
//!
//! * **[`ObjectTransport`]:** takes the JSON-RPC request as a `serde_json::Value` and yields the
//!   response as a `serde_json::Value`. The transport owns JSON serialization, which suits
//!   transports that need to peek at request ids themselves (e.g. a WebSocket).
//! * **[`DataTransport`]:** takes the serialized request bytes and yields the raw response bytes.
//!   The proxy owns JSON serialization, which suits request/response transports such as HTTP.
//!
//! Capabilities are negotiated once, when the proxy is built. If both are offered the object
//! capability is used exclusively. If none is offered the proxy cannot be built.
//!
//! Failures reported by a transport are delivered to the call as
//! [`ProxyError::Transport`](crate::error::ProxyError::Transport). Transports are never retried.
pub mod codec;

use crate::{
    BoxError, error::ConstructionError, jsonrpc::envelope::RequestEnvelope,
    proxy::DeliveryContext,
};
use async_trait::async_trait;
use codec::JsonCodec;
use serde_json::Value;
use std::sync::Arc;

/// Exchanges JSON-RPC requests and responses as JSON values.
#[async_trait]
pub trait ObjectTransport: Send + Sync {
    /// Sends `request` and returns the response object.
    ///
    /// `context` is the context completions are delivered on, transports are free to ignore it.
    async fn send_request_object(
        &self,
        request: Value,
        context: &DeliveryContext,
    ) -> Result<Value, BoxError>;
}

/// Exchanges JSON-RPC requests and responses as serialized payloads.
#[async_trait]
pub trait DataTransport: Send + Sync {
    /// Sends the serialized `payload` and returns the raw response payload.
    async fn send_request_data(
        &self,
        payload: Vec<u8>,
        context: &DeliveryContext,
    ) -> Result<Vec<u8>, BoxError>;
}

/// A transport handed to a proxy, advertising the capabilities it implements.
///
/// Both methods default to "not offered". Implementors override the ones they support:
///
/// ```rust
/// # use jrpc_core::{BoxError, proxy::DeliveryContext};
/// # use jrpc_core::transport::{DataTransport, ProxyTransport};
/// # use std::sync::Arc;
/// struct Loopback;
///
/// #[async_trait::async_trait]
/// impl DataTransport for Loopback {
///     async fn send_request_data(
///         &self,
///         payload: Vec<u8>,
///         _context: &DeliveryContext,
///     ) -> Result<Vec<u8>, BoxError> {
///         Ok(payload)
///     }
/// }
///
/// impl ProxyTransport for Loopback {
///     fn data_capability(self: Arc<Self>) -> Option<Arc<dyn DataTransport>> {
///         Some(self)
///     }
/// }
/// ```
pub trait ProxyTransport: Send + Sync + 'static {
    fn object_capability(self: Arc<Self>) -> Option<Arc<dyn ObjectTransport>> {
        None
    }

    fn data_capability(self: Arc<Self>) -> Option<Arc<dyn DataTransport>> {
        None
    }
}

/// The capability a proxy settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Object,
    Data,
}

/// The outcome of capability negotiation, resolved once per proxy.
#[derive(Clone)]
pub(crate) enum NegotiatedTransport {
    Object(Arc<dyn ObjectTransport>),
    Data(Arc<dyn DataTransport>),
}

impl NegotiatedTransport {
    pub fn negotiate(transport: Arc<dyn ProxyTransport>) -> Result<Self, ConstructionError> {
        if let Some(object) = transport.clone().object_capability() {
            return Ok(Self::Object(object));
        }
        transport
            .data_capability()
            .map(Self::Data)
            .ok_or(ConstructionError::NoTransportCapability)
    }

    pub fn capability(&self) -> Capability {
        match self {
            Self::Object(_) => Capability::Object,
            Self::Data(_) => Capability::Data,
        }
    }

    /// Encodes `envelope` in the form expected by the negotiated capability.
    pub fn prepare(&self, envelope: &RequestEnvelope) -> Result<Exchange, serde_json::Error> {
        match self {
            Self::Object(transport) => Ok(Exchange::Object(
                transport.clone(),
                JsonCodec::to_object(envelope)?,
            )),
            Self::Data(transport) => Ok(Exchange::Data(
                transport.clone(),
                JsonCodec::encode(envelope)?,
            )),
        }
    }
}

pub(crate) enum ExchangeError {
    /// The transport reported a failure.
    Transport(BoxError),
    /// The response payload of a data transport is not JSON.
    Decode(serde_json::Error),
}

/// A request ready to be sent through its transport.
pub(crate) enum Exchange {
    Object(Arc<dyn ObjectTransport>, Value),
    Data(Arc<dyn DataTransport>, Vec<u8>),
}

impl Exchange {
    /// Sends the request and returns the raw response object.
    pub async fn run(self, context: &DeliveryContext) -> Result<Value, ExchangeError> {
        match self {
            Exchange::Object(transport, request) => transport
                .send_request_object(request, context)
                .await
                .map_err(ExchangeError::Transport),
            Exchange::Data(transport, payload) => {
                let response = transport
                    .send_request_data(payload, context)
                    .await
                    .map_err(ExchangeError::Transport)?;
                JsonCodec::decode(&response).map_err(ExchangeError::Decode)
            }
        }
    }
}
