//! # JSON Codec
//!
//! Converts request envelopes into what the negotiated capability consumes, and raw response
//! payloads back into JSON values:
//!
//! * **Object capability:** the envelope becomes a `serde_json::Value`.
//! * **Data capability:** the envelope becomes UTF-8 JSON bytes, and response bytes are parsed
//!   back into a `serde_json::Value`.
//!
//! Both paths produce the same value for the same request, so the response resolver never
//! knows which capability carried it.
use crate::jsonrpc::envelope::RequestEnvelope;
use serde_json::Value;

pub struct JsonCodec;

impl JsonCodec {
    pub fn to_object(envelope: &RequestEnvelope) -> Result<Value, serde_json::Error> {
        serde_json::to_value(envelope)
    }

    pub fn encode(envelope: &RequestEnvelope) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(envelope)
    }

    pub fn decode(payload: &[u8]) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}
