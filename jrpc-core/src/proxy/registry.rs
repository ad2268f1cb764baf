//! Correlation of asynchronous responses with the calls that issued them.
use super::DeliveryContext;
use crate::{error::ProxyError, jsonrpc::envelope::Params};
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

/// Receives the outcome of a call.
pub(crate) type Completion = Box<dyn FnOnce(Result<Value, ProxyError>) + Send + 'static>;

/// A call that has been accepted and not resolved yet.
pub(crate) struct PendingCall {
    id: u64,
    method: String,
    params: Params,
    completion: Completion,
    delivery: DeliveryContext,
}

impl PendingCall {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Delivers the outcome on the delivery context of the call. Consumes the call, so it
    /// resolves at most once.
    pub fn complete(self, outcome: Result<Value, ProxyError>) {
        match &outcome {
            Ok(_) => tracing::debug!(id = self.id, method = %self.method, "JSON-RPC call succeeded"),
            Err(err) => tracing::debug!(id = self.id, method = %self.method, error = %err, "JSON-RPC call failed"),
        }
        let completion = self.completion;
        self.delivery.deliver(move || completion(outcome));
    }
}

/// The id to pending call mapping shared by every request of a proxy.
///
/// Ids come from a monotonic counter. Entries are inserted before the request is sent and
/// removed exactly once, when the call resolves.
pub(crate) struct CorrelationRegistry {
    next_id: AtomicU64,
    pending: Mutex<HashMap<u64, PendingCall>>,
}

impl CorrelationRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Stores a new pending call and returns its request id.
    pub fn register(
        &self,
        method: &str,
        params: Params,
        completion: Completion,
        delivery: DeliveryContext,
    ) -> u64 {
        let mut pending = self.lock();

        let mut id = self.next_id.fetch_add(1, Ordering::Relaxed);
        while pending.contains_key(&id) {
            id = self.next_id.fetch_add(1, Ordering::Relaxed);
        }

        pending.insert(
            id,
            PendingCall {
                id,
                method: method.to_string(),
                params,
                completion,
                delivery,
            },
        );
        id
    }

    /// Removes the pending call with `id`, if any.
    pub fn take(&self, id: u64) -> Option<PendingCall> {
        self.lock().remove(&id)
    }

    /// Resolves the pending call with `id` with an error. Unknown ids are ignored.
    pub fn fail(&self, id: u64, error: ProxyError) {
        if let Some(call) = self.take(id) {
            call.complete(Err(error));
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    // The map is only touched through single insert/remove calls, a panic cannot leave it
    // half-updated.
    fn lock(&self) -> MutexGuard<'_, HashMap<u64, PendingCall>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
