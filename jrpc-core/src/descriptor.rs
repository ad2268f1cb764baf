//! # Interface Descriptor
//!
//! A static description of the methods a proxy exposes. Each [`MethodSignature`] declared by an
//! interface is checked and turned into an immutable [`MethodDescriptor`] when the proxy is built:
//!
//! * The method name and parameter names are read from the signature text following the
//!   naming convention of the [`ParameterStructure`] (see the [`crate`] documentation).
//! * The method must not return a value and must take a trailing `(result, error)` completion.
//! * Only required instance methods are supported.
//!
//! A signature that breaks one of these rules fails the construction of the proxy with a
//! [`ConstructionError`]. It never surfaces at call time.
mod selector;

use crate::{error::ConstructionError, proxy::ParameterStructure};
use std::collections::HashSet;

/// The kind of an argument declared by a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    /// A value sent as a request parameter.
    Value,
    /// A `(result, error)` closure receiving the outcome of the call.
    Completion,
    /// Any other closure. Closures cannot be sent, so this is never valid.
    Callback,
}

/// What a method gives back directly to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnKind {
    #[default]
    Void,
    Value,
}

/// Whether an implementation of the method is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Requirement {
    #[default]
    Required,
    Optional,
    /// Declared on the interface type itself rather than on instances.
    Associated,
}

/// A method as declared by an interface, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    signature: String,
    arguments: Option<Vec<ArgumentKind>>,
    returns: ReturnKind,
    requirement: Requirement,
}

impl MethodSignature {
    /// A required method with no return value whose arguments are values followed by a
    /// completion.
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            arguments: None,
            returns: ReturnKind::Void,
            requirement: Requirement::Required,
        }
    }

    /// Declares the kind of every argument, completion included.
    pub fn with_arguments(mut self, arguments: Vec<ArgumentKind>) -> Self {
        self.arguments = Some(arguments);
        self
    }

    pub fn returning(mut self, returns: ReturnKind) -> Self {
        self.returns = returns;
        self
    }

    pub fn optional(mut self) -> Self {
        self.requirement = Requirement::Optional;
        self
    }

    pub fn associated(mut self) -> Self {
        self.requirement = Requirement::Associated;
        self
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }
}

/// A validated method of an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    signature: String,
    name: String,
    param_names: Vec<String>,
    arity: usize,
    structure: ParameterStructure,
}

impl MethodDescriptor {
    /// Validates `signature` and derives its descriptor.
    pub fn derive(
        signature: &MethodSignature,
        structure: ParameterStructure,
    ) -> Result<Self, ConstructionError> {
        let text = signature.signature();
        let invalid = |reason: String| ConstructionError::InvalidSignature {
            signature: text.to_string(),
            reason,
        };

        match signature.requirement {
            Requirement::Required => {}
            Requirement::Optional => return Err(ConstructionError::OptionalMethod(text.into())),
            Requirement::Associated => {
                return Err(ConstructionError::AssociatedMethod(text.into()));
            }
        }

        if signature.returns != ReturnKind::Void {
            return Err(ConstructionError::NonVoidReturn(text.into()));
        }

        let parsed = selector::parse(text, structure).map_err(invalid)?;

        let kinds = match &signature.arguments {
            Some(kinds) if kinds.len() != parsed.labels.len() => {
                return Err(invalid(format!(
                    "{} argument kind(s) declared for {} label(s)",
                    kinds.len(),
                    parsed.labels.len()
                )));
            }
            Some(kinds) => kinds.clone(),
            None => default_kinds(parsed.labels.len()),
        };

        let Some((ArgumentKind::Completion, values)) = kinds.split_last() else {
            return Err(ConstructionError::MissingCompletion(text.into()));
        };

        if let Some(index) = values.iter().position(|kind| *kind != ArgumentKind::Value) {
            return Err(invalid(format!(
                "argument {index} is a closure and cannot be sent as a parameter"
            )));
        }

        let param_names = match structure {
            ParameterStructure::ByName => {
                let mut seen = HashSet::new();
                let mut names = Vec::with_capacity(values.len());
                for (index, label) in parsed.labels[..values.len()].iter().enumerate() {
                    let name = label
                        .clone()
                        .filter(|name| !name.is_empty())
                        .ok_or_else(|| invalid(format!("parameter {index} has no name")))?;
                    if !seen.insert(name.clone()) {
                        return Err(invalid(format!("parameter '{name}' is repeated")));
                    }
                    names.push(name);
                }
                names
            }
            ParameterStructure::ByPosition => vec![],
        };

        Ok(Self {
            signature: text.to_string(),
            name: parsed.name,
            param_names,
            arity: values.len(),
            structure,
        })
    }

    /// The signature text, which identifies the method on the proxy.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// The JSON-RPC method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter names in declaration order. Empty for by-position methods.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Number of arguments sent as parameters, the completion excluded.
    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn parameter_structure(&self) -> ParameterStructure {
        self.structure
    }
}

fn default_kinds(count: usize) -> Vec<ArgumentKind> {
    let mut kinds = vec![ArgumentKind::Value; count];
    if let Some(last) = kinds.last_mut() {
        *last = ArgumentKind::Completion;
    }
    kinds
}

/// The validated description of an interface.
#[derive(Debug, Clone)]
pub struct InterfaceDescriptor {
    name: String,
    structure: ParameterStructure,
    methods: Vec<MethodDescriptor>,
}

impl InterfaceDescriptor {
    pub fn new(
        name: impl Into<String>,
        structure: ParameterStructure,
        signatures: &[MethodSignature],
    ) -> Result<Self, ConstructionError> {
        let mut seen = HashSet::new();
        let mut methods = Vec::with_capacity(signatures.len());

        for signature in signatures {
            if !seen.insert(signature.signature()) {
                return Err(ConstructionError::DuplicateMethod(
                    signature.signature().to_string(),
                ));
            }
            methods.push(MethodDescriptor::derive(signature, structure)?);
        }

        Ok(Self {
            name: name.into(),
            structure,
            methods,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter_structure(&self) -> ParameterStructure {
        self.structure
    }

    /// Methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.methods.iter()
    }

    /// Looks up a method by its signature text.
    pub fn method(&self, signature: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.signature() == signature)
    }
}
