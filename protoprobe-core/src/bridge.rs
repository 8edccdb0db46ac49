//! Schema context and dynamic protobuf encode/decode.
//!
//! [`ProtoCtx`] resolves fully-qualified message type names against a set
//! of compiled schemas and moves [`MessageValue`] trees across the wire
//! boundary in both directions. It is cheap to clone and nothing mutates
//! it after construction, so one context can serve any number of
//! concurrent pipelines.

use prost::Message;
use prost_reflect::{DescriptorPool, DynamicMessage, MessageDescriptor};

use crate::content::pretty_json;
use crate::error::BridgeError;
use crate::value::MessageValue;

/// Shared, read-only schema-resolution context.
#[derive(Debug, Clone)]
pub struct ProtoCtx {
    pool: DescriptorPool,
}

impl ProtoCtx {
    /// Build a context from an encoded `FileDescriptorSet`.
    ///
    /// This is the form produced by `protoc --descriptor_set_out` and by
    /// `prost_build`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Descriptor`] when the bytes are not a valid
    /// descriptor set.
    pub fn from_file_descriptor_set_bytes(buf: &[u8]) -> Result<Self, BridgeError> {
        DescriptorPool::decode(buf)
            .map(|pool| Self { pool })
            .map_err(|e| BridgeError::Descriptor(e.to_string()))
    }

    /// Build a context from a decoded `FileDescriptorSet`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Descriptor`] when the set does not resolve,
    /// for example on dangling type references.
    pub fn from_file_descriptor_set(
        set: prost_types::FileDescriptorSet,
    ) -> Result<Self, BridgeError> {
        DescriptorPool::from_file_descriptor_set(set)
            .map(|pool| Self { pool })
            .map_err(|e| BridgeError::Descriptor(e.to_string()))
    }

    /// Names of every message type the context can resolve.
    pub fn message_types(&self) -> impl Iterator<Item = String> + '_ {
        self.pool.all_messages().map(|m| m.full_name().to_string())
    }

    fn message_descriptor(&self, type_name: &str) -> Result<MessageDescriptor, BridgeError> {
        self.pool
            .get_message_by_name(type_name)
            .ok_or_else(|| BridgeError::UnknownType(type_name.to_string()))
    }
}

/// Result of decoding response bytes against an expected message type.
///
/// A failed schema decode is not a hard error: it downgrades the
/// response classification and surfaces the error text as a warning.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// The buffer decoded cleanly as the expected type.
    Valid {
        /// The decoded message tree.
        value: MessageValue,
    },
    /// The buffer did not decode as the expected type.
    Invalid {
        /// Best-effort rendering of the buffer, when one exists.
        value: Option<String>,
        /// Human-readable description of what went wrong.
        error: String,
    },
}

/// Encode a message-value tree to protobuf wire bytes.
///
/// The field tree is validated against the schema while transcoding, so
/// unknown fields and mistyped values are rejected rather than silently
/// dropped.
///
/// # Errors
///
/// Returns [`BridgeError::UnknownType`] when the context cannot resolve
/// the type name and [`BridgeError::Transcode`] when the tree does not
/// fit the schema.
pub fn serialize_message(value: &MessageValue, ctx: &ProtoCtx) -> Result<Vec<u8>, BridgeError> {
    let descriptor = ctx.message_descriptor(&value.type_name)?;
    let message = DynamicMessage::deserialize(descriptor, value.fields.clone()).map_err(|e| {
        BridgeError::Transcode {
            type_name: value.type_name.clone(),
            error: e.to_string(),
        }
    })?;
    Ok(message.encode_to_vec())
}

/// Decode protobuf wire bytes against an expected message type.
///
/// Never fails hard: schema problems come back as
/// [`DecodeOutcome::Invalid`] carrying a human-readable error and, when
/// the buffer happens to be JSON text, a pretty-printed best-effort
/// value.
pub fn deserialize_message(buf: &[u8], type_name: &str, ctx: &ProtoCtx) -> DecodeOutcome {
    let descriptor = match ctx.message_descriptor(type_name) {
        Ok(descriptor) => descriptor,
        Err(e) => return invalid(buf, e.to_string()),
    };

    let message = match DynamicMessage::decode(descriptor, buf) {
        Ok(message) => message,
        Err(e) => return invalid(buf, format!("failed to decode {}: {}", type_name, e)),
    };

    match serde_json::to_value(&message) {
        Ok(fields) => DecodeOutcome::Valid {
            value: MessageValue::new(type_name, fields),
        },
        Err(e) => invalid(buf, format!("failed to render {}: {}", type_name, e)),
    }
}

fn invalid(buf: &[u8], error: String) -> DecodeOutcome {
    DecodeOutcome::Invalid {
        value: pretty_json(buf).ok(),
        error,
    }
}
