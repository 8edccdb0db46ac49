//! Content decoding and the quoted-base64 envelope.
//!
//! The cloud-function transport requires request and response payloads
//! that parse as JSON. Raw protobuf bytes generally do not, so binary
//! payloads travel as a JSON string literal holding their base64
//! encoding:
//!
//! ```text
//! [0x22][ascii base64 of payload][0x22]
//! ```
//!
//! Base64 output is ASCII-safe, so the envelope is exactly one quote byte
//! on each side with no further JSON escaping. Unwrapping is lenient:
//! bytes outside the base64 alphabet are skipped and decoding stops at
//! the first padding byte, so a quoted string that merely looks like the
//! envelope degrades to whatever its alphabet bytes decode to instead of
//! failing the whole response.

use base64::Engine;
use base64::engine::DecodePaddingMode;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use bytes::Bytes;

use crate::error::ContentError;

/// The ASCII double-quote byte delimiting the envelope.
pub const QUOTE: u8 = 0x22;

/// Engine for unwrapping: tolerates missing padding and nonzero trailing
/// bits.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode bytes as a quoted-base64 JSON string literal.
pub fn wrap_base64_json_string(payload: &[u8]) -> Bytes {
    let encoded = STANDARD.encode(payload);
    let mut out = Vec::with_capacity(encoded.len() + 2);
    out.push(QUOTE);
    out.extend_from_slice(encoded.as_bytes());
    out.push(QUOTE);
    Bytes::from(out)
}

/// True when the buffer looks like a quoted JSON string: length at least
/// two with a quote byte at each end.
pub fn is_quoted(buf: &[u8]) -> bool {
    buf.len() >= 2 && buf[0] == QUOTE && buf[buf.len() - 1] == QUOTE
}

/// Decode a quoted-base64 JSON string literal back to raw bytes.
///
/// Strips one quote byte from each end and base64-decodes the rest.
/// Non-alphabet bytes are skipped, url-safe variants map onto the
/// standard alphabet, decoding stops at the first padding byte, and a
/// trailing lone sextet is dropped. Buffers shorter than the two quote
/// bytes decode to empty.
///
/// # Errors
///
/// Returns [`ContentError::Base64`] when the filtered input still cannot
/// be decoded.
pub fn unwrap_base64_json_string(buf: &[u8]) -> Result<Vec<u8>, ContentError> {
    if buf.len() < 2 {
        return Ok(Vec::new());
    }
    let inner = String::from_utf8_lossy(&buf[1..buf.len() - 1]);

    let mut filtered: Vec<u8> = Vec::with_capacity(inner.len());
    for &b in inner.as_bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'+' | b'/' => filtered.push(b),
            b'-' => filtered.push(b'+'),
            b'_' => filtered.push(b'/'),
            b'=' => break,
            _ => {}
        }
    }
    // A lone trailing sextet carries no full byte.
    if filtered.len() % 4 == 1 {
        filtered.pop();
    }

    LENIENT
        .decode(&filtered)
        .map_err(|e| ContentError::Base64(e.to_string()))
}

/// Decode bytes as UTF-8 text.
///
/// # Errors
///
/// Returns [`ContentError::Utf8`] when the bytes are not valid UTF-8.
pub fn text_from_utf8(buf: &[u8]) -> Result<String, ContentError> {
    std::str::from_utf8(buf)
        .map(str::to_owned)
        .map_err(|e| ContentError::Utf8(e.to_string()))
}

/// Decode bytes as JSON text and re-serialize with two-space indentation.
///
/// # Errors
///
/// Returns [`ContentError::Utf8`] when the bytes are not valid UTF-8 and
/// [`ContentError::Json`], carrying the offending text, when they do not
/// parse as JSON.
pub fn pretty_json(buf: &[u8]) -> Result<String, ContentError> {
    let text = text_from_utf8(buf)?;
    let value: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| ContentError::Json {
            error: e.to_string(),
            text: text.clone(),
        })?;
    serde_json::to_string_pretty(&value).map_err(|e| ContentError::Json {
        error: e.to_string(),
        text,
    })
}
