//! Error types for the codec and bridge modules.

/// Errors from decoding response content.
///
/// These are fatal for the response being classified: the classifier
/// aborts and the error propagates to the caller instead of producing a
/// degraded body.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ContentError {
    /// Bytes were not valid UTF-8 where text was required.
    #[error("error occurred while decoding body to string: {0}")]
    Utf8(String),

    /// Content declared as JSON failed to parse. Carries the offending
    /// text so the failure can be shown next to what was received.
    #[error("error occurred while parsing json: {error}\ngiven json:\n{text}")]
    Json { error: String, text: String },

    /// A quoted-base64 payload could not be decoded.
    #[error("error occurred while decoding base64 payload: {0}")]
    Base64(String),
}

/// Errors from the schema bridge.
///
/// These only surface on the request path, where a body that cannot be
/// serialized must stop the dispatch. Decode-side schema failures are not
/// errors: they come back as [`DecodeOutcome::Invalid`] and downgrade the
/// response classification instead of aborting it.
///
/// [`DecodeOutcome::Invalid`]: crate::DecodeOutcome::Invalid
#[derive(Debug, Clone, thiserror::Error)]
pub enum BridgeError {
    /// A descriptor set could not be loaded into a schema context.
    #[error("invalid descriptor set: {0}")]
    Descriptor(String),

    /// The schema context has no message type with this name.
    #[error("unknown message type: {0}")]
    UnknownType(String),

    /// A message-value tree did not fit the schema of its message type.
    #[error("message does not match schema for {type_name}: {error}")]
    Transcode { type_name: String, error: String },
}
