//! Response model: the classified body and the response descriptor.
//!
//! Whatever comes back from a dispatch, the pipeline reduces it to a
//! [`ResponseDescriptor`]: status, ordered headers, a body classified
//! into exactly one [`BodyKind`], an optional schema warning, and the
//! measured round-trip time.

use http::StatusCode;
use protoprobe_core::MessageValue;
use serde::{Deserialize, Serialize};

mod classify;

pub use classify::classify;

/// Classification tag for a response body. Exactly one per response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyKind {
    /// Nothing matched; the raw bytes are kept only as a size.
    Unknown,
    /// Zero-length body, including a payload that unwrapped to nothing.
    Empty,
    /// JSON text, held pretty-printed.
    Json,
    /// HTML text.
    Html,
    /// A protobuf message decoded against the expected type.
    Protobuf,
    /// A quoted-base64 payload that no later rule gave a better name.
    Base64ProtobufInJsonString,
}

impl BodyKind {
    /// Stable string form of the tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyKind::Unknown => "unknown",
            BodyKind::Empty => "empty",
            BodyKind::Json => "json",
            BodyKind::Html => "html",
            BodyKind::Protobuf => "protobuf",
            BodyKind::Base64ProtobufInJsonString => "base64-protobuf-in-json-string",
        }
    }
}

impl std::fmt::Display for BodyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded body value, paired with its [`BodyKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BodyValue {
    /// No displayable value. Used by `unknown`, `empty`, and enveloped
    /// payloads that could not be named further.
    None,
    /// Pretty-printed JSON text.
    Json(String),
    /// UTF-8 text.
    Html(String),
    /// Decoded message tree.
    Protobuf(MessageValue),
}

/// Classified response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody {
    /// Classification tag.
    pub kind: BodyKind,
    /// Decoded value for `kind`.
    pub value: BodyValue,
    /// Length in bytes of the buffer that was classified. When the
    /// quoted-base64 unwrap fired this is the unwrapped length, not the
    /// wire length.
    pub size: usize,
}

/// Outcome of one dispatched request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseDescriptor {
    /// HTTP status. The invoke route synthesizes 200.
    #[serde(with = "status_serde")]
    pub status: StatusCode,
    /// Ordered response header pairs.
    pub headers: Vec<(String, String)>,
    /// Classified body.
    pub body: ResponseBody,
    /// Non-fatal schema warning raised during classification.
    pub warning: Option<String>,
    /// Wall-clock milliseconds around the transport call.
    pub time_ms: u64,
}

/// Serde adapter carrying `http::StatusCode` as its numeric form.
mod status_serde {
    use http::StatusCode;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        status: &StatusCode,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(status.as_u16())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<StatusCode, D::Error> {
        let code = u16::deserialize(deserializer)?;
        StatusCode::from_u16(code).map_err(D::Error::custom)
    }
}
