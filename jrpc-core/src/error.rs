//! # Errors
//!
//! Failures fall in two groups:
//!
//! * **Synchronous** programming errors: [`ConstructionError`] when a proxy is built from a
//!   malformed interface or an unusable transport, and [`CallError`] when a call does not match
//!   any declared method. These are returned directly.
//! * **Asynchronous** failures of an accepted call: every one of them is a [`ProxyError`]
//!   delivered through the completion of that call, in place of the result.
use crate::BoxError;
use crate::jsonrpc::envelope::{
    INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};
use serde_json::Value;
use std::fmt;

/// Error raised while building a proxy. Always a programming error.
#[derive(Debug, thiserror::Error)]
pub enum ConstructionError {
    #[error("Invalid method signature '{signature}': {reason}")]
    InvalidSignature { signature: String, reason: String },
    #[error("Method '{0}' must not return a value, results are delivered through its completion")]
    NonVoidReturn(String),
    #[error("Method '{0}' must take a trailing (result, error) completion")]
    MissingCompletion(String),
    #[error("Method '{0}' is optional, only required methods can be proxied")]
    OptionalMethod(String),
    #[error("Method '{0}' is not an instance method and cannot be proxied")]
    AssociatedMethod(String),
    #[error("Method '{0}' is declared more than once")]
    DuplicateMethod(String),
    #[error("The transport offers neither the object nor the data capability")]
    NoTransportCapability,
    #[error("No delivery context was configured and no tokio runtime is running: '{0}'")]
    NoRuntime(#[source] tokio::runtime::TryCurrentError),
}

/// Error raised when a call is rejected before any request is built.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("Method '{0}' is not declared by the interface")]
    UnknownMethod(String),
    #[error("Method '{signature}' expects {expected} argument(s) but was called with {actual}")]
    ArgumentCount {
        signature: String,
        expected: usize,
        actual: usize,
    },
}

/// Error delivered to the completion of an accepted call.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Failed to serialize the JSON-RPC request: '{0}'")]
    RequestSerialization(#[source] RequestEncodeError),
    #[error("Failed to deserialize the JSON-RPC response: '{0}'")]
    ResponseSerialization(#[source] ResponseDecodeError),
    #[error("JSON-RPC transport failed: '{0}'")]
    Transport(#[source] BoxError),
    #[error("The server returned an error: {0}")]
    ServerResponse(RpcFault),
}

impl ProxyError {
    pub const REQUEST_SERIALIZATION_CODE: i64 = 1001;
    pub const RESPONSE_SERIALIZATION_CODE: i64 = 1002;
    pub const TRANSPORT_CODE: i64 = 1003;
    pub const SERVER_RESPONSE_CODE: i64 = 1004;

    /// Stable numeric code of the error category.
    pub fn code(&self) -> i64 {
        match self {
            ProxyError::RequestSerialization(_) => Self::REQUEST_SERIALIZATION_CODE,
            ProxyError::ResponseSerialization(_) => Self::RESPONSE_SERIALIZATION_CODE,
            ProxyError::Transport(_) => Self::TRANSPORT_CODE,
            ProxyError::ServerResponse(_) => Self::SERVER_RESPONSE_CODE,
        }
    }

    /// Returns the server fault if this is a `ServerResponse` error.
    pub fn fault(&self) -> Option<&RpcFault> {
        match self {
            ProxyError::ServerResponse(fault) => Some(fault),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RequestEncodeError {
    #[error("Argument {index} of '{method}' has no JSON representation: '{source}'")]
    Argument {
        method: String,
        index: usize,
        #[source]
        source: BoxError,
    },
    #[error("Failed to encode the request envelope: '{0}'")]
    Envelope(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ResponseDecodeError {
    #[error("Response payload is not valid JSON: '{0}'")]
    InvalidJson(#[source] serde_json::Error),
    #[error("Unsupported JSON-RPC version '{0}'")]
    InvalidVersion(String),
    #[error("Response carries neither a result nor an error")]
    MissingOutcome,
    #[error("Response carries both a result and an error")]
    AmbiguousOutcome,
    #[error("Malformed error object: {0}")]
    InvalidErrorObject(&'static str),
    #[error("Failed to convert the result: '{0}'")]
    ResultConversion(#[source] BoxError),
}

/// A JSON-RPC error object reported by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcFault {
    pub code: i64,
    pub message: String,
    pub data: Option<Value>,
}

/// Classification of [`RpcFault`] codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    Parse,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    Internal,
    /// Any code outside the predefined ones, passed through verbatim.
    Application(i64),
}

impl RpcFault {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn kind(&self) -> FaultKind {
        match self.code {
            PARSE_ERROR => FaultKind::Parse,
            INVALID_REQUEST => FaultKind::InvalidRequest,
            METHOD_NOT_FOUND => FaultKind::MethodNotFound,
            INVALID_PARAMS => FaultKind::InvalidParams,
            INTERNAL_ERROR => FaultKind::Internal,
            code => FaultKind::Application(code),
        }
    }
}

impl fmt::Display for RpcFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code={} message={:?}", self.code, self.message)?;
        if let Some(data) = &self.data {
            write!(f, " data={data}")?;
        }
        Ok(())
    }
}
