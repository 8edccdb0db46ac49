//! The request pipeline: resolve, dispatch, classify.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderValue};
use http::{HeaderMap, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use protoprobe_core::{ProtoCtx, header_map_to_pairs, pairs_to_header_map};
use tracing::{Instrument, info_span};

use crate::env::{Environment, UnresolvedPolicy};
use crate::error::ProbeError;
use crate::invoke::{FunctionInvoker, FunctionTarget};
use crate::request::{RequestBuilder, RequestDescriptor, resolve};
use crate::response::{ResponseDescriptor, classify};
use crate::transport::HttpTransport;

/// Client for the resolve, dispatch, classify pipeline.
///
/// Holds the HTTP transport and the optional cloud-function invoker.
/// Cloning is cheap; clones share both.
#[derive(Clone)]
pub struct ProbeClient {
    transport: HttpTransport,
    invoker: Option<Arc<dyn FunctionInvoker>>,
    unresolved_policy: UnresolvedPolicy,
}

impl std::fmt::Debug for ProbeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProbeClient")
            .field("has_invoker", &self.invoker.is_some())
            .field("unresolved_policy", &self.unresolved_policy)
            .finish_non_exhaustive()
    }
}

/// Raw transport response, body not yet read.
///
/// The elapsed time is already final here: reading the body is not part
/// of the measured round trip.
#[derive(Debug)]
pub struct RawResponse {
    /// HTTP status. The invoke route synthesizes 200.
    pub status: StatusCode,
    /// Response headers in transport form.
    pub headers: HeaderMap,
    /// Unread body.
    pub body: RawBody,
    /// Wall-clock milliseconds around the transport call.
    pub time_ms: u64,
}

/// Response body as a route produced it.
pub enum RawBody {
    /// Already fully in memory (the invoke route).
    Full(Bytes),
    /// Streaming from the HTTP transport.
    Incoming(Incoming),
}

impl RawBody {
    /// Buffer the whole body into memory.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Transport`] when the stream fails mid-read.
    pub async fn collect(self) -> Result<Bytes, ProbeError> {
        match self {
            RawBody::Full(bytes) => Ok(bytes),
            RawBody::Incoming(body) => Ok(body
                .collect()
                .await
                .map_err(|e| ProbeError::Transport(format!("failed to read response body: {}", e)))?
                .to_bytes()),
        }
    }
}

impl std::fmt::Debug for RawBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawBody::Full(bytes) => f.debug_tuple("Full").field(&bytes.len()).finish(),
            RawBody::Incoming(_) => f.debug_tuple("Incoming").finish(),
        }
    }
}

impl ProbeClient {
    /// Create a client builder.
    pub fn builder() -> crate::builder::ProbeClientBuilder {
        crate::builder::ProbeClientBuilder::new()
    }

    pub(crate) fn from_parts(
        transport: HttpTransport,
        invoker: Option<Arc<dyn FunctionInvoker>>,
        unresolved_policy: UnresolvedPolicy,
    ) -> Self {
        Self {
            transport,
            invoker,
            unresolved_policy,
        }
    }

    /// Resolve, dispatch, and classify one request.
    ///
    /// # Errors
    ///
    /// Returns resolution failures, transport and invoke failures, and
    /// fatal content-decode failures. Schema mismatches on the response
    /// do not fail the call; they land in the descriptor's `warning`.
    pub async fn send(
        &self,
        request: &RequestBuilder,
        env: &Environment,
        ctx: &ProtoCtx,
    ) -> Result<ResponseDescriptor, ProbeError> {
        let span = info_span!("probe_send", method = %request.method, url = %request.url);
        async {
            // 1. Resolve the builder against the environment
            let request = resolve(request, env, ctx, self.unresolved_policy)?;

            // 2. Dispatch over the selected route, timing the call
            let RawResponse {
                status,
                headers,
                body,
                time_ms,
            } = self.dispatch(&request).await?;

            // 3. Buffer the full body; classification never streams
            let raw = body.collect().await?;

            // 4. Classify into a typed body
            let header_pairs = header_map_to_pairs(&headers);
            let (body, warning) =
                classify(&raw, &header_pairs, request.expected_message.as_deref(), ctx)?;

            Ok(ResponseDescriptor {
                status,
                headers: header_pairs,
                body,
                warning,
                time_ms,
            })
        }
        .instrument(span)
        .await
    }

    /// Execute one resolved request over the invoke or HTTP route.
    ///
    /// The elapsed time covers route selection and the transport call
    /// only; the response body is still unread when the clock stops.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Transport`] for HTTP failures and for a
    /// lambda-routed URL without a configured invoker, and
    /// [`ProbeError::Invoke`] when the invoker fails.
    pub async fn dispatch(&self, request: &RequestDescriptor) -> Result<RawResponse, ProbeError> {
        let started = Instant::now();

        let (status, headers, body) = match FunctionTarget::from_url(&request.url) {
            Some(target) => self.invoke_function(&target, request.body.clone()).await?,
            None => self.http_request(request).await?,
        };

        let time_ms = started.elapsed().as_millis() as u64;

        Ok(RawResponse {
            status,
            headers,
            body,
            time_ms,
        })
    }

    async fn invoke_function(
        &self,
        target: &FunctionTarget,
        payload: Option<Bytes>,
    ) -> Result<(StatusCode, HeaderMap, RawBody), ProbeError> {
        tracing::debug!(name = %target.name, region = %target.region, "dispatching as function invoke");

        let Some(invoker) = &self.invoker else {
            return Err(ProbeError::Transport(format!(
                "no function invoker configured for {}",
                target.name
            )));
        };

        let result = invoker
            .invoke(&target.name, &target.region, payload)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "function invoke failed"))?;

        // Synthesized response: implicit success, declared as JSON.
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok((StatusCode::OK, headers, RawBody::Full(result)))
    }

    async fn http_request(
        &self,
        request: &RequestDescriptor,
    ) -> Result<(StatusCode, HeaderMap, RawBody), ProbeError> {
        tracing::debug!(method = %request.method, url = %request.url, "dispatching as http");

        let headers = pairs_to_header_map(&request.headers)
            .map_err(|e| ProbeError::Transport(format!("failed to build request: {}", e)))?;
        let body = request.body.clone().unwrap_or_default();

        let mut req = Request::builder()
            .method(request.method.clone())
            .uri(request.url.as_str())
            .body(Full::new(body))
            .map_err(|e| ProbeError::Transport(format!("failed to build request: {}", e)))?;
        *req.headers_mut() = headers;

        let response = self.transport.request(req).await?;
        let (parts, body) = response.into_parts();

        Ok((parts.status, parts.headers, RawBody::Incoming(body)))
    }
}
