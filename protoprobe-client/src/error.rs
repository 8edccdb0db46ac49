//! Error types for the request pipeline.

use protoprobe_core::{BridgeError, ContentError};

use crate::invoke::InvokeError;

/// Errors for everything from resolving a request through classifying
/// its response.
///
/// Schema-decode failures on the response path are deliberately absent:
/// those downgrade the classification and come back as the descriptor's
/// `warning` instead of failing the call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProbeError {
    /// Transport-level failure: building the request, connecting, or
    /// reading the response body.
    #[error("transport error: {0}")]
    Transport(String),

    /// Cloud-function invoke failure, re-raised from the invoker.
    #[error("invoke error: {0}")]
    Invoke(#[from] InvokeError),

    /// Request-side failure while resolving the builder into a
    /// descriptor.
    #[error("encode error: {0}")]
    Encode(String),

    /// Request-side schema failure while serializing the protobuf body.
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// Fatal content-decode failure while classifying the response.
    #[error(transparent)]
    Decode(#[from] ContentError),
}
