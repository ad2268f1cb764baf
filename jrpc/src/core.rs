//! # Core Orchestration Layer
//!
//! Drives a single call from the command line:
//!
//! 1. **Interface**: Derives a one-method interface from the method name and the shape of the
//!    parameters (named or positional).
//! 2. **Proxy**: Builds a `jrpc_core` proxy on top of the [`HttpTransport`].
//! 3. **Dispatch**: Invokes the method and waits for its completion.
//!
//! # Architecture
//!
//! - **`Input`**: Request parameters (URL, method, params, headers).
//! - **`run()`**: The main entry point called by `main.rs`. Setup problems are `anyhow` errors,
//!   the outcome of the call itself is returned as is.
//!
//! A response the proxy cannot match to the call (e.g. a parse error answered with `"id": null`)
//! still ends the call: its error object is reported as a server fault.
mod transport;

use anyhow::{Context, anyhow};
use jrpc_core::{
    descriptor::MethodSignature,
    error::{ProxyError, RpcFault},
    jsonrpc::envelope::{ERROR_CODE_KEY, ERROR_DATA_KEY, ERROR_KEY, ERROR_MESSAGE_KEY},
    proxy::{ParameterStructure, ProxyBuilder},
    transform::RpcParam,
};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tokio::sync::{mpsc, oneshot};
use transport::HttpTransport;

/// Name of the interface built for every call.
const INTERFACE_NAME: &str = "jrpc";

pub struct Input {
    pub url: String,
    pub method: String,
    pub params: CallParams,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

/// The parameters of the call, in the structure they are sent with.
#[derive(Debug, Clone, PartialEq)]
pub enum CallParams {
    ByName(Vec<(String, Value)>),
    ByPosition(Vec<Value>),
}

impl CallParams {
    fn structure(&self) -> ParameterStructure {
        match self {
            CallParams::ByName(_) => ParameterStructure::ByName,
            CallParams::ByPosition(_) => ParameterStructure::ByPosition,
        }
    }

    /// The signature of a method taking these parameters, in call form.
    fn signature(&self, method: &str) -> String {
        let labels: String = match self {
            CallParams::ByName(params) => params.iter().map(|(name, _)| format!("{name}:")).collect(),
            CallParams::ByPosition(values) => "_:".repeat(values.len()),
        };
        format!("{method}({labels}completion:)")
    }

    fn into_values(self) -> Vec<Value> {
        match self {
            CallParams::ByName(params) => params.into_iter().map(|(_, value)| value).collect(),
            CallParams::ByPosition(values) => values,
        }
    }
}

/// Performs the JSON-RPC call described by `input`.
pub async fn run(input: Input) -> anyhow::Result<Result<Value, ProxyError>> {
    let transport = HttpTransport::new(input.url.clone(), input.headers, input.timeout)?;

    let signature = input.params.signature(&input.method);
    let (unmatched_tx, mut unmatched_rx) = mpsc::unbounded_channel();
    let proxy = ProxyBuilder::new(Arc::new(transport))
        .parameter_structure(input.params.structure())
        .on_unmatched_response(move |response| {
            let _ = unmatched_tx.send(response.clone());
        })
        .build(INTERFACE_NAME, vec![MethodSignature::new(signature.clone())])
        .with_context(|| format!("Cannot call method '{}'", input.method))?;

    let arguments = input
        .params
        .into_values()
        .into_iter()
        .map(RpcParam::into_argument)
        .collect();

    let (tx, rx) = oneshot::channel();
    proxy.invoke(&signature, arguments, move |outcome| {
        let _ = tx.send(outcome);
    })?;

    // Only one call is in flight, so any response that matches no request answers it.
    tokio::select! {
        outcome = rx => outcome.context("The call was dropped before it completed"),
        Some(response) = unmatched_rx.recv() => unmatched_outcome(response),
    }
}

fn unmatched_outcome(response: Value) -> anyhow::Result<Result<Value, ProxyError>> {
    let error = response.get(ERROR_KEY);
    let code = error.and_then(|e| e.get(ERROR_CODE_KEY)).and_then(Value::as_i64);
    let message = error
        .and_then(|e| e.get(ERROR_MESSAGE_KEY))
        .and_then(Value::as_str);

    match (code, message) {
        (Some(code), Some(message)) => {
            let mut fault = RpcFault::new(code, message);
            fault.data = error
                .and_then(|e| e.get(ERROR_DATA_KEY))
                .filter(|data| !data.is_null())
                .cloned();
            Ok(Err(ProxyError::ServerResponse(fault)))
        }
        _ => Err(anyhow!(
            "The server answered with a response that matches no request: {response}"
        )),
    }
}
