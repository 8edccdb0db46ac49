//! Shared codec primitives for protoprobe.
//!
//! This crate holds the pure, transport-free pieces used by the request
//! and response pipelines in `protoprobe-client`: header-pair conversion,
//! content decoding, the quoted-base64 envelope, message-value trees, and
//! the dynamic protobuf bridge.
//!
//! ## Modules
//!
//! - [`bridge`]: Schema context and dynamic protobuf encode/decode
//! - [`content`]: Text/JSON decoding and the quoted-base64 envelope
//! - [`error`]: Content and schema-bridge error types
//! - [`headers`]: Ordered header pairs and `HeaderMap` conversion
//! - [`value`]: Message-value trees and string-leaf rewriting

mod bridge;
mod content;
mod error;
mod headers;
mod value;

pub use bridge::*;
pub use content::*;
pub use error::*;
pub use headers::*;
pub use value::*;
