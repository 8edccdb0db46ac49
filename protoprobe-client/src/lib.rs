//! Request pipeline for protoprobe.
//!
//! This crate turns a user-authored [`RequestBuilder`] into wire bytes,
//! dispatches it over plain HTTP or a cloud-function invoke, and
//! classifies the raw response into a typed, displayable
//! [`ResponseDescriptor`].
//!
//! ## Pipeline
//!
//! ```text
//! RequestBuilder --resolve--> RequestDescriptor --dispatch--> raw bytes --classify--> ResponseDescriptor
//! ```
//!
//! URLs of the form `https://lambda/<name>[/<region>]` bypass the HTTP
//! transport and go to the configured [`FunctionInvoker`]; everything
//! else goes out through the hyper-based [`HttpTransport`].
//!
//! ## Example
//!
//! ```ignore
//! use protoprobe_client::{BodyType, Environment, ProbeClient, RequestBuilder};
//! use protoprobe_core::ProtoCtx;
//!
//! let client = ProbeClient::builder().build()?;
//! let ctx = ProtoCtx::from_file_descriptor_set_bytes(&descriptor_bytes)?;
//! let env = Environment::new("staging").var("stage", "v2");
//!
//! let request = RequestBuilder {
//!     method: http::Method::GET,
//!     url: "https://api.example.com/{{stage}}/items".to_string(),
//!     headers: vec![("accept".to_string(), "application/json".to_string())],
//!     body_type: BodyType::None,
//!     protobuf_body: None,
//!     expected_message: None,
//! };
//!
//! let response = client.send(&request, &env, &ctx).await?;
//! println!("{} in {}ms", response.status, response.time_ms);
//! ```

mod builder;
mod client;
mod env;
mod error;
mod invoke;
pub mod request;
pub mod response;
pub mod transport;

// Re-export from builder module
pub use builder::ProbeClientBuilder;

// Re-export from client module
pub use client::{ProbeClient, RawBody, RawResponse};

// Re-export from env module
pub use env::{Environment, UnresolvedPolicy, UnresolvedVar, apply_vars};

// Re-export from error module
pub use error::ProbeError;

// Re-export from invoke module
pub use invoke::{
    DEFAULT_REGION, FunctionInvoker, FunctionTarget, InvokeError, LAMBDA_URL_PREFIX,
};

// Re-export from request module
pub use request::{BodyType, RequestBuilder, RequestDescriptor, resolve};

// Re-export from response module
pub use response::{BodyKind, BodyValue, ResponseBody, ResponseDescriptor, classify};

// Re-export from transport module
pub use transport::{HttpTransport, HttpTransportBuilder, TlsClientConfig};

// Re-export core types used throughout the public API
pub use protoprobe_core::{
    BridgeError, ContentError, DecodeOutcome, MessageValue, ProtoCtx,
};

// Re-export commonly used external types
pub use bytes::Bytes;
