// src/xmlrpc/mod.rs

//! Minimal XML-RPC client
//!
//! Only what the package index needs: encoding calls with positional
//! parameters, decoding responses and faults, and an HTTP transport.

mod codec;
mod transport;
mod value;

pub use codec::{decode_response, encode_call};
pub use transport::{HTTP_TIMEOUT, HttpTransport, MAX_RETRIES, RpcTransport};
pub use value::{DATETIME_FORMAT, Fields, Value, fields, parse_datetime};

use crate::error::Result;
use tracing::debug;

/// Perform one remote procedure call over `transport`
pub fn call<T: RpcTransport + ?Sized>(transport: &T, method: &str, params: &[Value]) -> Result<Value> {
    debug!("XML-RPC {} -> {}", method, transport.endpoint());
    let body = encode_call(method, params);
    let response = transport.post(&body)?;
    decode_response(&response)
}
