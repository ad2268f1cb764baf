use serde_json::Value;
use std::{fmt, future::Future, sync::Arc};
use tokio::runtime::{Handle, TryCurrentError};

/// The parameter structure of the JSON-RPC service being proxied.
///
/// See <https://www.jsonrpc.org/specification> section 4.2 "Parameter Structures".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParameterStructure {
    /// Parameters are sent as an object keyed by parameter name.
    #[default]
    ByName,
    /// Parameters are sent as an array in declaration order.
    ByPosition,
}

/// Where completions run, and where the proxy drives its requests.
///
/// Completions are always spawned as tasks on this context, never called inline by the code
/// that issued or resolved the request.
#[derive(Debug, Clone)]
pub struct DeliveryContext {
    handle: Handle,
}

impl DeliveryContext {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// The context of the tokio runtime the caller is running on.
    pub fn current() -> Result<Self, TryCurrentError> {
        Handle::try_current().map(Self::new)
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub(crate) fn deliver<F>(&self, completion: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.handle.spawn(async move { completion() });
    }

    pub(crate) fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(future);
    }
}

impl From<Handle> for DeliveryContext {
    fn from(handle: Handle) -> Self {
        Self::new(handle)
    }
}

/// Observer of responses that cannot be matched to a pending call.
#[derive(Clone)]
pub struct UnmatchedResponseHook(Arc<dyn Fn(&Value) + Send + Sync>);

impl UnmatchedResponseHook {
    pub fn new(hook: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        Self(Arc::new(hook))
    }

    pub(crate) fn notify(&self, response: &Value) {
        (self.0)(response)
    }
}

impl fmt::Debug for UnmatchedResponseHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UnmatchedResponseHook(..)")
    }
}
