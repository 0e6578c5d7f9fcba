//! HTTP request body handling utilities.
use bytes::Bytes;

/// A trait for viewing a request body as bytes so its SHA-256 hash can be computed.
///
/// The body must already be held in memory; streaming payloads are not supported.
pub trait SignableBody {
    /// Return the bytes of the body.
    fn body_bytes(&self) -> &[u8];
}

/// The unit type `()` is an empty body.
impl SignableBody for () {
    fn body_bytes(&self) -> &[u8] {
        &[]
    }
}

impl SignableBody for Vec<u8> {
    fn body_bytes(&self) -> &[u8] {
        self.as_slice()
    }
}

impl SignableBody for &[u8] {
    fn body_bytes(&self) -> &[u8] {
        self
    }
}

impl SignableBody for String {
    fn body_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl SignableBody for &str {
    fn body_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl SignableBody for Bytes {
    fn body_bytes(&self) -> &[u8] {
        self.as_ref()
    }
}
