//! # Value Transformation
//!
//! Arguments and results cross the wire as `serde_json::Value`. Values that are already JSON
//! compatible pass through unchanged. Domain types can opt into a custom representation:
//!
//! * [`ToWire`] produces the JSON representation of a value sent as a request parameter.
//! * [`FromWire`] rebuilds a value from the raw `result` of a response.
//!
//! [`Json`] bridges any `serde` type to both directions.
use crate::BoxError;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::fmt;

/// Custom JSON representation of a value used as a request parameter.
pub trait ToWire {
    fn to_wire(&self) -> Result<Value, BoxError>;
}

/// Construction of a value from the raw result of a JSON-RPC response.
pub trait FromWire: Sized {
    fn from_wire(result: Value) -> Result<Self, BoxError>;
}

/// An argument captured by a method stub.
pub enum Argument {
    /// Already JSON compatible, sent as is.
    PassThrough(Value),
    /// Has a custom representation, produced when the request is built.
    Transform(Box<dyn ToWire>),
}

impl Argument {
    pub fn pass_through(value: impl Into<Value>) -> Self {
        Argument::PassThrough(value.into())
    }

    pub fn transform(value: impl ToWire + 'static) -> Self {
        Argument::Transform(Box::new(value))
    }

    pub(crate) fn into_wire(self) -> Result<Value, BoxError> {
        match self {
            Argument::PassThrough(value) => Ok(value),
            Argument::Transform(value) => value.to_wire(),
        }
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::PassThrough(value) => f.debug_tuple("PassThrough").field(value).finish(),
            Argument::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

/// Conversion of a typed argument into an [`Argument`].
///
/// Implemented as pass-through for the standard JSON compatible types. Domain types usually
/// implement it by delegating to [`Argument::transform`].
pub trait RpcParam {
    fn into_argument(self) -> Argument;
}

macro_rules! pass_through {
    ($($ty:ty),* $(,)?) => {
        $(
            impl RpcParam for $ty {
                fn into_argument(self) -> Argument {
                    Argument::PassThrough(Value::from(self))
                }
            }
        )*
    };
}

pass_through!(
    bool,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    String,
    &str,
    Value,
    Map<String, Value>,
);

impl<T: Into<Value>> RpcParam for Vec<T> {
    fn into_argument(self) -> Argument {
        Argument::PassThrough(Value::from(self))
    }
}

impl<T: Into<Value>> RpcParam for Option<T> {
    fn into_argument(self) -> Argument {
        Argument::PassThrough(self.map_or(Value::Null, Into::into))
    }
}

impl RpcParam for Argument {
    fn into_argument(self) -> Argument {
        self
    }
}

impl FromWire for Value {
    fn from_wire(result: Value) -> Result<Self, BoxError> {
        Ok(result)
    }
}

/// Ignores the result, for methods that are only called for their side effects.
impl FromWire for () {
    fn from_wire(_result: Value) -> Result<Self, BoxError> {
        Ok(())
    }
}

impl<T: FromWire> FromWire for Option<T> {
    fn from_wire(result: Value) -> Result<Self, BoxError> {
        match result {
            Value::Null => Ok(None),
            result => T::from_wire(result).map(Some),
        }
    }
}

macro_rules! deserialize_from_wire {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromWire for $ty {
                fn from_wire(result: Value) -> Result<Self, BoxError> {
                    Ok(serde_json::from_value(result)?)
                }
            }
        )*
    };
}

deserialize_from_wire!(bool, i32, i64, u32, u64, f64, String, Map<String, Value>);

impl<T: DeserializeOwned> FromWire for Vec<T> {
    fn from_wire(result: Value) -> Result<Self, BoxError> {
        Ok(serde_json::from_value(result)?)
    }
}

/// Wraps a `serde` type so it can be used as an argument or a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize> ToWire for Json<T> {
    fn to_wire(&self) -> Result<Value, BoxError> {
        Ok(serde_json::to_value(&self.0)?)
    }
}

impl<T: Serialize + 'static> RpcParam for Json<T> {
    fn into_argument(self) -> Argument {
        Argument::transform(self)
    }
}

impl<T: DeserializeOwned> FromWire for Json<T> {
    fn from_wire(result: Value) -> Result<Self, BoxError> {
        Ok(Json(serde_json::from_value(result)?))
    }
}
