//! Request model: the editable builder and the resolved descriptor.
//!
//! [`RequestBuilder`] is what the editor owns and persists: templated
//! URL and header values, a body-type tag, an optional protobuf message
//! tree, and the expected response type. [`resolve`] turns it plus an
//! environment into an immutable [`RequestDescriptor`] ready for
//! dispatch.

use bytes::Bytes;
use http::Method;
use protoprobe_core::MessageValue;
use serde::{Deserialize, Serialize};

mod encoder;

pub use encoder::resolve;

/// Which body a request carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    /// No body.
    #[default]
    None,
    /// A protobuf message tree, enveloped for the invoke transport.
    Protobuf,
}

/// Editable, user-facing request model.
///
/// The URL and header values are templates: `{{name}}` placeholders get
/// substituted at resolve time. The pipeline never mutates this.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBuilder {
    /// HTTP method for the generic route. The invoke route ignores it.
    #[serde(with = "method_serde")]
    pub method: Method,
    /// Target URL template.
    pub url: String,
    /// Ordered header pairs; values are templates, names are literal.
    pub headers: Vec<(String, String)>,
    /// Which body to send.
    pub body_type: BodyType,
    /// Message tree sent when [`BodyType::Protobuf`] applies.
    pub protobuf_body: Option<MessageValue>,
    /// Message type the response is expected to decode as.
    pub expected_message: Option<String>,
}

/// Fully resolved, transport-ready request.
///
/// Produced fresh for each dispatch by [`resolve`] and immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// Final URL, variables substituted.
    pub url: String,
    /// HTTP method for the generic route.
    #[serde(with = "method_serde")]
    pub method: Method,
    /// Ordered header pairs, values substituted. Duplicates allowed.
    pub headers: Vec<(String, String)>,
    /// Wire body, already enveloped for the invoke transport.
    #[serde(with = "body_serde", default)]
    pub body: Option<Bytes>,
    /// Message type the response is expected to decode as.
    pub expected_message: Option<String>,
}

/// Serde adapter carrying `http::Method` as its string form.
mod method_serde {
    use http::Method;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(method.as_str())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Method, D::Error> {
        let s = String::deserialize(deserializer)?;
        Method::from_bytes(s.as_bytes()).map_err(D::Error::custom)
    }
}

/// Serde adapter carrying the wire body as base64 text.
mod body_serde {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use bytes::Bytes;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        body: &Option<Bytes>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match body {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Bytes>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| STANDARD.decode(s).map(Bytes::from).map_err(D::Error::custom))
            .transpose()
    }
}
