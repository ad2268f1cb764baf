//! JSON-RPC 2.0 envelopes.
//!
//! See <https://www.jsonrpc.org/specification> sections 4 and 5.
use crate::error::RpcFault;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// The only protocol version spoken by the proxy.
pub const JSONRPC_VERSION: &str = "2.0";

pub const VERSION_KEY: &str = "jsonrpc";
pub const ID_KEY: &str = "id";
pub const METHOD_KEY: &str = "method";
pub const PARAMS_KEY: &str = "params";
pub const RESULT_KEY: &str = "result";
pub const ERROR_KEY: &str = "error";
pub const ERROR_CODE_KEY: &str = "code";
pub const ERROR_MESSAGE_KEY: &str = "message";
pub const ERROR_DATA_KEY: &str = "data";

// ---------------------------------------------------------------------------
// Reserved JSON-RPC 2.0 error codes
// ---------------------------------------------------------------------------

/// An error occurred on the server while parsing the JSON text.
pub const PARSE_ERROR: i64 = -32700;
/// The JSON sent is not a valid Request object.
pub const INVALID_REQUEST: i64 = -32600;
/// The method does not exist.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Invalid method parameter(s).
pub const INVALID_PARAMS: i64 = -32602;
/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i64 = -32603;

/// The `params` member of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Params {
    /// Parameter name to value, in descriptor declaration order.
    ByName(Map<String, Value>),
    ByPosition(Vec<Value>),
}

impl Params {
    pub fn len(&self) -> usize {
        match self {
            Params::ByName(map) => map.len(),
            Params::ByPosition(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A JSON-RPC request object. Always carries an id, notifications are not supported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: Params,
}

impl RequestEnvelope {
    pub fn new(id: u64, method: impl Into<String>, params: Params) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// The outcome carried by a well-formed response: exactly one of result or error.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Result(Value),
    Error(RpcFault),
}

/// A validated JSON-RPC response object.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub id: u64,
    pub outcome: Outcome,
}

impl ResponseEnvelope {
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            id,
            outcome: Outcome::Result(result),
        }
    }

    pub fn failure(id: u64, fault: RpcFault) -> Self {
        Self {
            id,
            outcome: Outcome::Error(fault),
        }
    }

    /// Builds the wire representation of the response.
    pub fn into_value(self) -> Value {
        match self.outcome {
            Outcome::Result(result) => json!({
                VERSION_KEY: JSONRPC_VERSION,
                ID_KEY: self.id,
                RESULT_KEY: result,
            }),
            Outcome::Error(fault) => {
                let mut error = Map::new();
                error.insert(ERROR_CODE_KEY.to_string(), fault.code.into());
                error.insert(ERROR_MESSAGE_KEY.to_string(), fault.message.into());
                if let Some(data) = fault.data {
                    error.insert(ERROR_DATA_KEY.to_string(), data);
                }
                json!({
                    VERSION_KEY: JSONRPC_VERSION,
                    ID_KEY: self.id,
                    ERROR_KEY: error,
                })
            }
        }
    }
}
