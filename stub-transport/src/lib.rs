//! # Transport Stub
//!
//! **INTERNAL USE ONLY**: This crate exists solely to provide an in-memory JSON-RPC server
//! behind a [`ProxyTransport`] for integration testing `jrpc-core`.
//! It is not intended for production use.
//!
//! Methods are configured by name. A request for a method nobody configured is answered with
//! the standard "Method not found" error.
use async_trait::async_trait;
use jrpc_core::{
    BoxError,
    error::RpcFault,
    jsonrpc::envelope::{METHOD_NOT_FOUND, ResponseEnvelope},
    proxy::DeliveryContext,
    transport::{Capability, DataTransport, ObjectTransport, ProxyTransport},
};
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

type Handler = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// The capabilities advertised by a [`TransportStub`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubMode {
    Object,
    Data,
    Both,
    Neither,
}

/// A request as received by the stub.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub capability: Capability,
    pub request: Value,
}

#[derive(Clone)]
enum Behavior {
    /// Answers with the `result` computed from the request params.
    Result(Handler),
    /// Answers with an `error` object.
    Error {
        code: i64,
        message: String,
        data: Option<Value>,
    },
    /// Fails at the transport level.
    Failure(String),
    /// Answers with the given envelope, computed from the whole request.
    RawResponse(Handler),
    /// Answers with the given bytes. Only meaningful for the data capability.
    RawBytes(Vec<u8>),
    /// Never answers.
    Silent,
}

/// A transport failure produced by the stub.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct StubFailure(pub String);

pub struct TransportStub {
    mode: StubMode,
    behaviors: Mutex<HashMap<String, Behavior>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl TransportStub {
    pub fn new(mode: StubMode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            behaviors: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Answers `method` with the result of `handler` applied to the request params.
    ///
    /// `handler` receives `Value::Null` when the request has no params.
    pub fn configure_method(
        &self,
        method: &str,
        handler: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) {
        self.configure(method, Behavior::Result(Arc::new(handler)));
    }

    /// Answers every method of `methods` with the same handler.
    pub fn configure_methods(
        &self,
        methods: &[&str],
        handler: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) {
        let handler: Handler = Arc::new(handler);
        for method in methods {
            self.configure(method, Behavior::Result(handler.clone()));
        }
    }

    pub fn configure_error(&self, method: &str, code: i64, message: &str, data: Option<Value>) {
        self.configure(
            method,
            Behavior::Error {
                code,
                message: message.to_string(),
                data,
            },
        );
    }

    /// Makes the transport itself fail for `method`.
    pub fn configure_failure(&self, method: &str, message: &str) {
        self.configure(method, Behavior::Failure(message.to_string()));
    }

    /// Answers `method` with the envelope built by `responder` from the whole request.
    pub fn configure_raw_response(
        &self,
        method: &str,
        responder: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) {
        self.configure(method, Behavior::RawResponse(Arc::new(responder)));
    }

    /// Answers `method` with `payload` as is. Object requests get a transport failure instead.
    pub fn configure_raw_bytes(&self, method: &str, payload: impl Into<Vec<u8>>) {
        self.configure(method, Behavior::RawBytes(payload.into()));
    }

    /// Leaves requests for `method` unanswered forever.
    pub fn configure_silence(&self, method: &str) {
        self.configure(method, Behavior::Silent);
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// The last request received, if any.
    pub fn last_request(&self) -> Option<RecordedRequest> {
        lock(&self.requests).last().cloned()
    }

    fn configure(&self, method: &str, behavior: Behavior) {
        lock(&self.behaviors).insert(method.to_string(), behavior);
    }

    fn behavior_for(&self, request: &Value) -> Option<Behavior> {
        let method = request.get("method").and_then(Value::as_str)?;
        lock(&self.behaviors).get(method).cloned()
    }

    /// Runs the configured behavior and returns the raw answer.
    async fn answer(&self, capability: Capability, request: Value) -> Result<Answer, BoxError> {
        lock(&self.requests).push(RecordedRequest {
            capability,
            request: request.clone(),
        });

        // Requests built by a proxy always carry an unsigned id.
        let id = request.get("id").and_then(Value::as_u64).unwrap_or_default();

        match self.behavior_for(&request) {
            None => Ok(Answer::Object(
                ResponseEnvelope::failure(id, RpcFault::new(METHOD_NOT_FOUND, "Method not found"))
                    .into_value(),
            )),
            Some(Behavior::Result(handler)) => {
                let params = request.get("params").unwrap_or(&Value::Null);
                Ok(Answer::Object(
                    ResponseEnvelope::success(id, handler(params)).into_value(),
                ))
            }
            Some(Behavior::Error {
                code,
                message,
                data,
            }) => {
                let mut fault = RpcFault::new(code, message);
                fault.data = data;
                Ok(Answer::Object(ResponseEnvelope::failure(id, fault).into_value()))
            }
            Some(Behavior::Failure(message)) => Err(StubFailure(message).into()),
            Some(Behavior::RawResponse(responder)) => Ok(Answer::Object(responder(&request))),
            Some(Behavior::RawBytes(payload)) => Ok(Answer::Bytes(payload)),
            Some(Behavior::Silent) => std::future::pending().await,
        }
    }
}

enum Answer {
    Object(Value),
    Bytes(Vec<u8>),
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl ObjectTransport for TransportStub {
    async fn send_request_object(
        &self,
        request: Value,
        _context: &DeliveryContext,
    ) -> Result<Value, BoxError> {
        match self.answer(Capability::Object, request).await? {
            Answer::Object(response) => Ok(response),
            Answer::Bytes(_) => Err(StubFailure(
                "raw bytes cannot be sent through the object capability".to_string(),
            )
            .into()),
        }
    }
}

#[async_trait]
impl DataTransport for TransportStub {
    async fn send_request_data(
        &self,
        payload: Vec<u8>,
        _context: &DeliveryContext,
    ) -> Result<Vec<u8>, BoxError> {
        let request: Value = serde_json::from_slice(&payload)?;
        match self.answer(Capability::Data, request).await? {
            Answer::Object(response) => Ok(serde_json::to_vec(&response)?),
            Answer::Bytes(bytes) => Ok(bytes),
        }
    }
}

impl ProxyTransport for TransportStub {
    fn object_capability(self: Arc<Self>) -> Option<Arc<dyn ObjectTransport>> {
        match self.mode {
            StubMode::Object | StubMode::Both => Some(self),
            StubMode::Data | StubMode::Neither => None,
        }
    }

    fn data_capability(self: Arc<Self>) -> Option<Arc<dyn DataTransport>> {
        match self.mode {
            StubMode::Data | StubMode::Both => Some(self),
            StubMode::Object | StubMode::Neither => None,
        }
    }
}
