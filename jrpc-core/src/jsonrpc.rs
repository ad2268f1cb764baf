//! # JSON-RPC 2.0
//!
//! The protocol side of the proxy: the request/response envelopes, the conversion of captured
//! arguments into `params`, and the validation of inbound responses.
//!
//! Only the subset needed by a client is implemented. Notifications and batches are never sent.
pub mod envelope;
pub(crate) mod params;
pub(crate) mod resolver;
