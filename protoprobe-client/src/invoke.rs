//! Cloud-function routing and the invoker seam.
//!
//! URLs of the form `https://lambda/<name>[/<region>]` never reach the
//! HTTP transport: the request collapses to a function name, a region,
//! and an optional payload against whatever [`FunctionInvoker`] the
//! client was built with. The concrete invoker, an AWS SDK client or a
//! local emulator, lives with the caller; this module only owns the
//! route match and the contract.

use std::sync::LazyLock;

use async_trait::async_trait;
use bytes::Bytes;
use regex::Regex;

/// URL prefix that selects the invoke route and gates request bodies.
pub const LAMBDA_URL_PREFIX: &str = "https://lambda/";

/// Region used when the URL does not name one.
pub const DEFAULT_REGION: &str = "us-east-2";

/// `https://lambda/<name>[/<region>]`, matched anywhere in the URL.
static LAMBDA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://lambda/([A-Za-z0-9-]+)(?:/([a-z0-9-]+))?")
        .expect("lambda route pattern is valid")
});

/// A parsed invoke route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionTarget {
    /// Function name from the URL.
    pub name: String,
    /// Region from the URL, or [`DEFAULT_REGION`].
    pub region: String,
}

impl FunctionTarget {
    /// Extract an invoke route from a URL.
    ///
    /// Returns `None` for ordinary HTTP(S) endpoints; those stay on the
    /// generic transport. The pattern may match anywhere in the URL, and
    /// a region segment that does not fit `[a-z0-9-]+` falls back to the
    /// default region rather than failing the match.
    pub fn from_url(url: &str) -> Option<Self> {
        let caps = LAMBDA_URL.captures(url)?;
        let name = caps.get(1)?.as_str().to_string();
        let region = caps
            .get(2)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        Some(Self { name, region })
    }
}

/// Failure reported by a [`FunctionInvoker`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("invoking {name} in {region} failed: {message}")]
pub struct InvokeError {
    /// Function that was invoked.
    pub name: String,
    /// Region it was invoked in.
    pub region: String,
    /// What the invoker reported.
    pub message: String,
}

impl InvokeError {
    /// Create an invoke error.
    pub fn new(
        name: impl Into<String>,
        region: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            message: message.into(),
        }
    }
}

/// The cloud-function invocation collaborator.
///
/// Implementations get the function name, the region, and the raw
/// payload when the request carries one. No method, headers, or query
/// string exist on this route. The returned bytes are the invocation's
/// raw result payload.
#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    /// Invoke `name` in `region` with `payload` as the request payload.
    async fn invoke(
        &self,
        name: &str,
        region: &str,
        payload: Option<Bytes>,
    ) -> Result<Bytes, InvokeError>;
}
