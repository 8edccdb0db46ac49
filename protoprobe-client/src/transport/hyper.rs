//! Hyper-based HTTP transport.
//!
//! Wraps hyper_util's legacy pooled client behind a small request API.
//! HTTP/1.1 and HTTP/2 are negotiated via ALPN; TLS comes from rustls
//! through [`build_https_connector`].

use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use rustls::ClientConfig;

use super::connector::build_https_connector;
use crate::error::ProbeError;

/// Hyper client specialized to fully-buffered request bodies.
type LegacyClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// HTTP transport for the generic route.
///
/// Connections are pooled and reused across requests. Cloning is cheap
/// and shares the pool.
#[derive(Clone)]
pub struct HttpTransport {
    client: LegacyClient,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Create a transport builder.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::new()
    }

    /// Create a transport with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Transport`] when the client cannot be
    /// constructed.
    pub fn new() -> Result<Self, ProbeError> {
        Self::builder().build()
    }

    /// Send a request and return the response with its body unread.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Transport`] on connection or protocol
    /// failures.
    pub async fn request(
        &self,
        request: http::Request<Full<Bytes>>,
    ) -> Result<http::Response<Incoming>, ProbeError> {
        self.client
            .request(request)
            .await
            .map_err(|e| ProbeError::Transport(format!("request failed: {}", e)))
    }
}

/// Builder for [`HttpTransport`].
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use protoprobe_client::transport::HttpTransport;
///
/// let transport = HttpTransport::builder()
///     .pool_idle_timeout(Duration::from_secs(30))
///     .pool_max_idle_per_host(8)
///     .build()?;
/// ```
pub struct HttpTransportBuilder {
    tls_config: Option<ClientConfig>,
    http2_only: bool,
    pool_idle_timeout: Option<Duration>,
    pool_max_idle_per_host: usize,
}

impl std::fmt::Debug for HttpTransportBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransportBuilder")
            .field("custom_tls", &self.tls_config.is_some())
            .field("http2_only", &self.http2_only)
            .field("pool_idle_timeout", &self.pool_idle_timeout)
            .field("pool_max_idle_per_host", &self.pool_max_idle_per_host)
            .finish()
    }
}

impl HttpTransportBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            tls_config: None,
            http2_only: false,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
        }
    }

    /// Use a custom TLS configuration (custom roots, client certs).
    pub fn tls_config(mut self, config: ClientConfig) -> Self {
        self.tls_config = Some(config);
        self
    }

    /// Speak HTTP/2 only, skipping the upgrade negotiation.
    pub fn http2_only(mut self, enabled: bool) -> Self {
        self.http2_only = enabled;
        self
    }

    /// Close pooled connections idle for longer than this.
    ///
    /// Default: 90 seconds.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Keep idle pooled connections forever.
    pub fn pool_idle_timeout_none(mut self) -> Self {
        self.pool_idle_timeout = None;
        self
    }

    /// Cap idle connections kept per host.
    ///
    /// Default: 32.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Build the transport.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Transport`] when the client cannot be
    /// constructed.
    pub fn build(self) -> Result<HttpTransport, ProbeError> {
        let https_connector = build_https_connector(self.tls_config);

        let mut builder = Client::builder(TokioExecutor::new());
        // The pool needs a timer to expire idle connections.
        builder.pool_timer(TokioTimer::new());
        if let Some(timeout) = self.pool_idle_timeout {
            builder.pool_idle_timeout(timeout);
        }
        builder.pool_max_idle_per_host(self.pool_max_idle_per_host);
        if self.http2_only {
            builder.http2_only(true);
        }

        Ok(HttpTransport {
            client: builder.build(https_connector),
        })
    }
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}
