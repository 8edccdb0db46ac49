//! Client builder.
//!
//! Fluent configuration for [`ProbeClient`]: the HTTP transport, the
//! optional cloud-function invoker, and the unresolved-placeholder
//! policy.

use std::sync::Arc;

use crate::client::ProbeClient;
use crate::env::UnresolvedPolicy;
use crate::error::ProbeError;
use crate::invoke::FunctionInvoker;
use crate::transport::{HttpTransport, HttpTransportBuilder};

/// Builder for [`ProbeClient`].
///
/// # Example
///
/// ```ignore
/// use protoprobe_client::{ProbeClient, UnresolvedPolicy};
///
/// let client = ProbeClient::builder()
///     .invoker(my_lambda_invoker)
///     .unresolved_policy(UnresolvedPolicy::Error)
///     .build()?;
/// ```
pub struct ProbeClientBuilder {
    transport: Option<HttpTransport>,
    invoker: Option<Arc<dyn FunctionInvoker>>,
    unresolved_policy: UnresolvedPolicy,
}

impl std::fmt::Debug for ProbeClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeClientBuilder")
            .field("custom_transport", &self.transport.is_some())
            .field("has_invoker", &self.invoker.is_some())
            .field("unresolved_policy", &self.unresolved_policy)
            .finish()
    }
}

impl ProbeClientBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            transport: None,
            invoker: None,
            unresolved_policy: UnresolvedPolicy::default(),
        }
    }

    /// Use a pre-built transport (custom TLS or pool settings).
    pub fn transport(mut self, transport: HttpTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Configure the cloud-function invoker for `https://lambda/` URLs.
    ///
    /// Without one, dispatching a lambda-routed request fails with a
    /// transport error.
    pub fn invoker<I: FunctionInvoker + 'static>(self, invoker: I) -> Self {
        self.shared_invoker(Arc::new(invoker))
    }

    /// Configure an already-shared invoker.
    pub fn shared_invoker(mut self, invoker: Arc<dyn FunctionInvoker>) -> Self {
        self.invoker = Some(invoker);
        self
    }

    /// What substitution does with unmapped `{{name}}` placeholders.
    ///
    /// Default: keep them in the text untouched.
    pub fn unresolved_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.unresolved_policy = policy;
        self
    }

    /// Build the client, constructing a default transport when none was
    /// provided.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Transport`] when the default transport
    /// cannot be constructed.
    pub fn build(self) -> Result<ProbeClient, ProbeError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => HttpTransportBuilder::new().build()?,
        };

        Ok(ProbeClient::from_parts(
            transport,
            self.invoker,
            self.unresolved_policy,
        ))
    }
}

impl Default for ProbeClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
