//! # JRPC Core
//!
//! `jrpc-core` turns calls on a statically declared interface into asynchronous
//! JSON-RPC 2.0 requests. The result (or error) of every call comes back through a
//! completion closure, never through a return value.
//!
//! ## Key Components
//!
//! * **[`proxy::Proxy`]:** The main entry point. It owns the dispatch table generated from an
//!   [`descriptor::InterfaceDescriptor`], the correlation registry of pending calls and the
//!   negotiated transport.
//! * **[`rpc_interface!`]:** Declares a typed interface whose methods are all routed through a
//!   single generic [`proxy::Proxy`].
//! * **[`transport`]:** The capabilities an external transport can offer. Object-level transports
//!   exchange JSON values, byte-level transports exchange serialized payloads. The proxy works the
//!   same against either one and prefers the object-level capability when both are offered.
//! * **[`transform`]:** The opt-in hooks that let domain types choose their own JSON
//!   representation in requests ([`transform::ToWire`]) and be rebuilt from results
//!   ([`transform::FromWire`]).
//!
//! ## Parameter Structures
//!
//! JSON-RPC sends parameters either BY-NAME (an object) or BY-POSITION (an array). The structure
//! is fixed per proxy and drives how method signatures are read:
//!
//! * **By-name:** `subtractWithMinuend:subtrahend:completion:` or
//!   `subtract(minuend:subtrahend:completion:)` calls the `subtract` method with
//!   `{"minuend": .., "subtrahend": ..}`.
//! * **By-position:** `subtract:::` or `subtract(_:_:_:)` calls `subtract` with `[.., ..]`.
//!
//! The trailing argument is always the completion and is never sent.
//!
//! ## Example
//!
//! ```rust,no_run
//! use jrpc_core::proxy::{ParameterStructure, ProxyBuilder};
//! use jrpc_core::rpc_interface;
//! use jrpc_core::transport::ProxyTransport;
//! use std::sync::Arc;
//!
//! rpc_interface! {
//!     /// The basic API of random.org
//!     pub struct RandomDotOrg {
//!         fn generate_integers(api_key: String, n: i64, min: i64, max: i64, replacement: bool)
//!             -> serde_json::Value = "generateIntegers(apiKey:n:min:max:replacement:completion:)";
//!     }
//! }
//!
//! # fn run(transport: Arc<dyn ProxyTransport>) -> Result<(), Box<dyn std::error::Error>> {
//! let service = RandomDotOrg::build(
//!     ProxyBuilder::new(transport).parameter_structure(ParameterStructure::ByName),
//! )?;
//!
//! service.generate_integers("key".into(), 6, 1, 59, false, |result| match result {
//!     Ok(numbers) => println!("{numbers}"),
//!     Err(err) => eprintln!("{err}"),
//! })?;
//! # Ok(())
//! # }
//! ```
pub mod descriptor;
pub mod error;
pub mod jsonrpc;
mod macros;
pub mod proxy;
pub mod transform;
pub mod transport;

/// Type alias for the boxed error carried by transports and value transformers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
