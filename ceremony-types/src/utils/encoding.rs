//! Base64 helpers for the values WebAuthn transports as strings.

use data_encoding::{Specification, BASE64URL_NOPAD, BASE64_NOPAD};

/// Encode data as an unpadded base64url string, the encoding WebAuthn
/// mandates for binary values in JSON.
pub fn base64url(data: &[u8]) -> String {
    BASE64URL_NOPAD.encode(data)
}

/// Encode data as an unpadded standard base64 string.
pub fn base64(data: &[u8]) -> String {
    BASE64_NOPAD.encode(data)
}

/// Decode a base64url string, tolerating optional padding and non-canonical
/// trailing bits.
pub fn try_from_base64url(input: &str) -> Option<Vec<u8>> {
    decode_lenient(input, BASE64URL_NOPAD.specification())
}

/// Decode a standard base64 string with the same leniency as
/// [`try_from_base64url`].
pub(crate) fn try_from_base64(input: &str) -> Option<Vec<u8>> {
    decode_lenient(input, BASE64_NOPAD.specification())
}

fn decode_lenient(input: &str, mut specs: Specification) -> Option<Vec<u8>> {
    specs.check_trailing_bits = false;
    let encoding = specs.encoding().ok()?;
    encoding
        .decode(input.trim_end_matches('=').as_bytes())
        .ok()
}
