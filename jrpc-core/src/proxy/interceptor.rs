//! The dispatch table of a proxy.
//!
//! Every declared method gets a stub generated from its descriptor. All stubs share the same
//! body: check the arity, then forward the captured arguments and completion to the engine.
use super::{Engine, registry::Completion};
use crate::{descriptor::InterfaceDescriptor, error::CallError, transform::Argument};
use std::collections::HashMap;

type MethodStub =
    Box<dyn Fn(&Engine, Vec<Argument>, Completion) -> Result<(), CallError> + Send + Sync>;

pub(crate) struct Interceptor {
    stubs: HashMap<String, MethodStub>,
}

impl Interceptor {
    pub fn generate(descriptor: &InterfaceDescriptor) -> Self {
        let stubs = descriptor
            .methods()
            .map(|method| {
                let method = method.clone();
                let signature = method.signature().to_string();
                let stub: MethodStub = Box::new(
                    move |engine: &Engine, arguments: Vec<Argument>, completion: Completion| {
                        if arguments.len() != method.arity() {
                            return Err(CallError::ArgumentCount {
                                signature: method.signature().to_string(),
                                expected: method.arity(),
                                actual: arguments.len(),
                            });
                        }
                        engine.dispatch(&method, arguments, completion);
                        Ok(())
                    },
                );
                (signature, stub)
            })
            .collect();

        Self { stubs }
    }

    /// Routes a call to the stub of `signature`.
    pub fn intercept(
        &self,
        engine: &Engine,
        signature: &str,
        arguments: Vec<Argument>,
        completion: Completion,
    ) -> Result<(), CallError> {
        let stub = self
            .stubs
            .get(signature)
            .ok_or_else(|| CallError::UnknownMethod(signature.to_string()))?;
        stub(engine, arguments, completion)
    }
}
