//! HTTP transport for the generic route.
//!
//! [`HttpTransport`] wraps hyper_util's legacy client with a rustls
//! HTTPS connector. Request bodies are always fully buffered; the
//! pipeline never streams uploads.
//!
//! # Feature Flags
//!
//! TLS needs a crypto provider and a root-certificate store:
//!
//! - `tls` (default): `tls-ring` + `tls-native-roots`
//! - `tls-ring` / `tls-aws-lc`: crypto providers
//! - `tls-native-roots` / `tls-webpki-roots`: root certificates
//!
//! # Example
//!
//! ```ignore
//! use protoprobe_client::transport::HttpTransport;
//!
//! let transport = HttpTransport::builder()
//!     .pool_max_idle_per_host(8)
//!     .build()?;
//! ```

mod connector;
mod hyper;

pub use connector::{build_https_connector, has_tls_support};

#[cfg(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))]
pub use connector::default_tls_config;

pub use hyper::{HttpTransport, HttpTransportBuilder};

/// Re-export for custom TLS configuration.
pub use rustls::ClientConfig as TlsClientConfig;
