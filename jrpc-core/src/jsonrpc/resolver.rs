//! Validation of inbound responses and resolution of the matching pending call.
use super::envelope::{
    ERROR_CODE_KEY, ERROR_DATA_KEY, ERROR_KEY, ERROR_MESSAGE_KEY, ID_KEY, JSONRPC_VERSION,
    Outcome, RESULT_KEY, VERSION_KEY,
};
use crate::{
    error::{ProxyError, ResponseDecodeError, RpcFault},
    proxy::{UnmatchedResponseHook, registry::CorrelationRegistry},
    transform::FromWire,
};
use serde_json::{Map, Value};

/// Resolves the pending call matching the id of `response`.
///
/// A response without a usable id, or whose id matches no pending call, is dropped: nobody is
/// waiting for it, so no error can be delivered. `hook` is told about it.
pub(crate) fn resolve(
    registry: &CorrelationRegistry,
    response: Value,
    hook: Option<&UnmatchedResponseHook>,
) {
    let Some(id) = response_id(&response) else {
        tracing::warn!(%response, "Dropping JSON-RPC response without a usable id");
        if let Some(hook) = hook {
            hook.notify(&response);
        }
        return;
    };

    let Some(call) = registry.take(id) else {
        tracing::warn!(id, "Dropping JSON-RPC response for an unknown request id");
        if let Some(hook) = hook {
            hook.notify(&response);
        }
        return;
    };

    tracing::trace!(id, %response, "Resolving JSON-RPC response");

    let outcome = match decode_outcome(response) {
        Ok(Outcome::Result(result)) => Ok(result),
        Ok(Outcome::Error(fault)) => Err(ProxyError::ServerResponse(fault)),
        Err(err) => Err(ProxyError::ResponseSerialization(err)),
    };
    call.complete(outcome);
}

/// Converts a raw result into the type expected by the caller.
pub(crate) fn convert<R: FromWire>(result: Value) -> Result<R, ProxyError> {
    R::from_wire(result)
        .map_err(|err| ProxyError::ResponseSerialization(ResponseDecodeError::ResultConversion(err)))
}

fn response_id(response: &Value) -> Option<u64> {
    response.get(ID_KEY).and_then(Value::as_u64)
}

/// Validates the envelope of a response and extracts exactly one of its result or error.
pub(crate) fn decode_outcome(response: Value) -> Result<Outcome, ResponseDecodeError> {
    let Value::Object(mut response) = response else {
        return Err(ResponseDecodeError::MissingOutcome);
    };

    match response.get(VERSION_KEY) {
        Some(Value::String(version)) if version == JSONRPC_VERSION => {}
        Some(other) => return Err(ResponseDecodeError::InvalidVersion(other.to_string())),
        None => return Err(ResponseDecodeError::InvalidVersion("<missing>".to_string())),
    }

    let result = response.remove(RESULT_KEY);
    let error = response.remove(ERROR_KEY).filter(|error| !error.is_null());

    match (result, error) {
        (Some(_), Some(_)) => Err(ResponseDecodeError::AmbiguousOutcome),
        (None, None) => Err(ResponseDecodeError::MissingOutcome),
        (Some(result), None) => Ok(Outcome::Result(result)),
        (None, Some(Value::Object(error))) => decode_fault(error).map(Outcome::Error),
        (None, Some(_)) => Err(ResponseDecodeError::InvalidErrorObject(
            "the error member is not an object",
        )),
    }
}

fn decode_fault(mut error: Map<String, Value>) -> Result<RpcFault, ResponseDecodeError> {
    let code = error
        .get(ERROR_CODE_KEY)
        .and_then(Value::as_i64)
        .ok_or(ResponseDecodeError::InvalidErrorObject("missing integer code"))?;

    let message = match error.remove(ERROR_MESSAGE_KEY) {
        Some(Value::String(message)) => message,
        _ => {
            return Err(ResponseDecodeError::InvalidErrorObject(
                "missing string message",
            ));
        }
    };

    let data = error.remove(ERROR_DATA_KEY).filter(|data| !data.is_null());

    Ok(RpcFault {
        code,
        message,
        data,
    })
}
