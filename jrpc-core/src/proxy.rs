//! # Proxy
//!
//! The [`Proxy`] is the stand-in object of an interface. Calls are captured generically through
//! [`Proxy::invoke`] (or the typed methods generated by [`rpc_interface!`](crate::rpc_interface))
//! and follow the same path whatever the method:
//!
//! 1. The stub of the method checks the number of arguments.
//! 2. The arguments are transformed and arranged into `params` following the descriptor.
//! 3. The call is stored in the correlation registry under a fresh request id.
//! 4. The request is handed to the negotiated transport on the delivery context.
//! 5. The response is matched back to the pending call by id, validated and converted.
//! 6. The completion receives either the result or a [`ProxyError`], exactly once.
//!
//! Nothing blocks the calling thread. There is no cancellation and no timeout: a call whose
//! response never arrives stays pending.
//!
//! ## Example
//!
//! ```rust,no_run
//! use jrpc_core::descriptor::MethodSignature;
//! use jrpc_core::proxy::{ParameterStructure, ProxyBuilder};
//! use jrpc_core::transform::RpcParam;
//! # use jrpc_core::transport::ProxyTransport;
//! # use std::sync::Arc;
//!
//! # fn run(transport: Arc<dyn ProxyTransport>) -> Result<(), Box<dyn std::error::Error>> {
//! let proxy = ProxyBuilder::new(transport)
//!     .parameter_structure(ParameterStructure::ByPosition)
//!     .build("Calculator", vec![MethodSignature::new("subtract:::")])?;
//!
//! proxy.invoke(
//!     "subtract:::",
//!     vec![42_i64.into_argument(), 23_i64.into_argument()],
//!     |result| println!("{result:?}"),
//! )?;
//! # Ok(())
//! # }
//! ```
mod interceptor;
pub(crate) mod registry;
mod types;

pub use types::*;

use crate::{
    descriptor::{InterfaceDescriptor, MethodDescriptor, MethodSignature},
    error::{CallError, ConstructionError, ProxyError, RequestEncodeError, ResponseDecodeError},
    jsonrpc::{envelope::RequestEnvelope, params, resolver},
    transform::{Argument, FromWire},
    transport::{Capability, ExchangeError, NegotiatedTransport, ProxyTransport},
};
use interceptor::Interceptor;
use registry::{Completion, CorrelationRegistry};
use serde_json::Value;
use std::{fmt, sync::Arc};

/// Configuration of a [`Proxy`].
pub struct ProxyBuilder {
    transport: Arc<dyn ProxyTransport>,
    structure: ParameterStructure,
    delivery: Option<DeliveryContext>,
    unmatched_hook: Option<UnmatchedResponseHook>,
}

impl ProxyBuilder {
    /// Starts a configuration using `transport`, by-name parameters, the ambient tokio runtime
    /// as delivery context, and no unmatched response hook.
    pub fn new(transport: Arc<dyn ProxyTransport>) -> Self {
        Self {
            transport,
            structure: ParameterStructure::default(),
            delivery: None,
            unmatched_hook: None,
        }
    }

    pub fn parameter_structure(mut self, structure: ParameterStructure) -> Self {
        self.structure = structure;
        self
    }

    /// The context completions are delivered on.
    pub fn delivery_context(mut self, delivery: impl Into<DeliveryContext>) -> Self {
        self.delivery = Some(delivery.into());
        self
    }

    /// Observes responses that match no pending call. They are dropped either way.
    pub fn on_unmatched_response(
        mut self,
        hook: impl Fn(&Value) + Send + Sync + 'static,
    ) -> Self {
        self.unmatched_hook = Some(UnmatchedResponseHook::new(hook));
        self
    }

    /// Builds a proxy for the interface `name` declaring `signatures`.
    ///
    /// # Returns
    ///
    /// * `Ok(Proxy)` - The proxy, ready to accept calls.
    /// * `Err(ConstructionError)` - If a signature breaks the method contract, the transport
    ///   offers no capability, or no delivery context is available.
    pub fn build(
        self,
        name: &str,
        signatures: Vec<MethodSignature>,
    ) -> Result<Proxy, ConstructionError> {
        let descriptor = InterfaceDescriptor::new(name, self.structure, &signatures)?;
        let transport = NegotiatedTransport::negotiate(self.transport)?;
        let delivery = match self.delivery {
            Some(delivery) => delivery,
            None => DeliveryContext::current().map_err(ConstructionError::NoRuntime)?,
        };

        tracing::debug!(
            interface = name,
            methods = signatures.len(),
            capability = ?transport.capability(),
            "Built JSON-RPC proxy"
        );

        let interceptor = Interceptor::generate(&descriptor);

        Ok(Proxy {
            descriptor: Arc::new(descriptor),
            interceptor: Arc::new(interceptor),
            engine: Arc::new(Engine {
                registry: Arc::new(CorrelationRegistry::new()),
                transport,
                delivery,
                unmatched_hook: self.unmatched_hook,
            }),
        })
    }
}

/// The stand-in object of an interface.
///
/// Cloning is cheap, clones share the same pending calls.
#[derive(Clone)]
pub struct Proxy {
    descriptor: Arc<InterfaceDescriptor>,
    interceptor: Arc<Interceptor>,
    engine: Arc<Engine>,
}

impl Proxy {
    /// Calls the method identified by `signature`.
    ///
    /// `completion` is called exactly once, on the delivery context, with the raw JSON result or
    /// the error of the call.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The call was accepted, its outcome goes to `completion`.
    /// * `Err(CallError)` - The method is not declared or the number of arguments does not
    ///   match. `completion` is dropped without being called.
    pub fn invoke<F>(
        &self,
        signature: &str,
        arguments: Vec<Argument>,
        completion: F,
    ) -> Result<(), CallError>
    where
        F: FnOnce(Result<Value, ProxyError>) + Send + 'static,
    {
        self.interceptor
            .intercept(&self.engine, signature, arguments, Box::new(completion))
    }

    /// Like [`Proxy::invoke`], but rebuilds the result as `R` before delivering it.
    pub fn invoke_as<R, F>(
        &self,
        signature: &str,
        arguments: Vec<Argument>,
        completion: F,
    ) -> Result<(), CallError>
    where
        R: FromWire + 'static,
        F: FnOnce(Result<R, ProxyError>) + Send + 'static,
    {
        self.invoke(signature, arguments, move |outcome| {
            completion(outcome.and_then(resolver::convert::<R>))
        })
    }

    pub fn descriptor(&self) -> &InterfaceDescriptor {
        &self.descriptor
    }

    pub fn parameter_structure(&self) -> ParameterStructure {
        self.descriptor.parameter_structure()
    }

    /// The transport capability settled on when the proxy was built.
    pub fn transport_capability(&self) -> Capability {
        self.engine.transport.capability()
    }

    pub fn delivery_context(&self) -> &DeliveryContext {
        &self.engine.delivery
    }

    /// Number of calls waiting for their response.
    pub fn pending_calls(&self) -> usize {
        self.engine.registry.len()
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("interface", &self.descriptor.name())
            .field("parameter_structure", &self.parameter_structure())
            .field("capability", &self.transport_capability())
            .field("pending_calls", &self.pending_calls())
            .finish()
    }
}

/// The state shared by every call of a proxy.
pub(crate) struct Engine {
    registry: Arc<CorrelationRegistry>,
    transport: NegotiatedTransport,
    delivery: DeliveryContext,
    unmatched_hook: Option<UnmatchedResponseHook>,
}

impl Engine {
    /// Turns a captured call into a request and sends it.
    ///
    /// Every failure from here on is delivered through `completion`.
    fn dispatch(&self, method: &MethodDescriptor, arguments: Vec<Argument>, completion: Completion) {
        let params = match params::build(method, arguments) {
            Ok(params) => params,
            Err(err) => {
                tracing::debug!(method = method.name(), error = %err, "Failed to build JSON-RPC params");
                self.delivery
                    .deliver(move || completion(Err(ProxyError::RequestSerialization(err))));
                return;
            }
        };

        // The call is stored before the request leaves, a response can never beat it.
        let id = self.registry.register(
            method.name(),
            params.clone(),
            completion,
            self.delivery.clone(),
        );

        let envelope = RequestEnvelope::new(id, method.name(), params);
        let exchange = match self.transport.prepare(&envelope) {
            Ok(exchange) => exchange,
            Err(err) => {
                self.registry.fail(
                    id,
                    ProxyError::RequestSerialization(RequestEncodeError::Envelope(err)),
                );
                return;
            }
        };

        tracing::debug!(id, method = method.name(), "Sending JSON-RPC request");

        let registry = self.registry.clone();
        let unmatched_hook = self.unmatched_hook.clone();
        let delivery = self.delivery.clone();

        self.delivery.spawn(async move {
            match exchange.run(&delivery).await {
                Ok(response) => resolver::resolve(&registry, response, unmatched_hook.as_ref()),
                Err(ExchangeError::Transport(source)) => {
                    if let Some(call) = registry.take(id) {
                        tracing::warn!(
                            id,
                            method = call.method(),
                            params = ?call.params(),
                            error = %source,
                            "JSON-RPC transport failed"
                        );
                        call.complete(Err(ProxyError::Transport(source)));
                    }
                }
                // The payload cannot be read, but the exchange itself tells whose it is.
                Err(ExchangeError::Decode(source)) => registry.fail(
                    id,
                    ProxyError::ResponseSerialization(ResponseDecodeError::InvalidJson(source)),
                ),
            }
        });
    }
}
