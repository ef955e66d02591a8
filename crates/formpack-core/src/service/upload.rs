//! Upload service: aggregate, encode and post.

use crate::aggregate::{AggregationRequest, aggregate};
use crate::error::Result;
use crate::item::ItemSource;
use crate::policy::UploadPolicy;
use bytes::Bytes;
use formpack_multipart::{encode, encode_checked};
use std::future::Future;
use tracing::info;

/// Header name carrying the multipart content type.
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// Errors reported by a transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The remote service answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The request could not be sent.
    #[error("Request failed: {0}")]
    Request(String),

    /// The response could not be parsed.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// An encoded request ready for an HTTP POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// Multipart body.
    pub body: Bytes,
    /// Request headers.
    pub headers: Vec<(String, String)>,
}

impl PreparedRequest {
    /// Returns a header value, matching the name case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE_HEADER)
    }
}

/// Sends a prepared request and returns the parsed JSON response.
pub trait Transport {
    /// Posts the request.
    fn post(
        &self,
        request: PreparedRequest,
    ) -> impl Future<Output = std::result::Result<serde_json::Value, TransportError>> + Send;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post(
        &self,
        request: PreparedRequest,
    ) -> impl Future<Output = std::result::Result<serde_json::Value, TransportError>> + Send {
        (**self).post(request)
    }
}

/// Aggregates files and encodes them into a request.
///
/// With [`UploadPolicy::scan_boundary`] set, the boundary is regenerated
/// until it does not occur in any payload.
///
/// # Errors
///
/// Returns any aggregation error, or a multipart error if no collision-free
/// boundary was found.
pub fn prepare_request<S: ItemSource + ?Sized>(
    source: &S,
    request: &AggregationRequest,
    policy: &UploadPolicy,
) -> Result<PreparedRequest> {
    let aggregated = aggregate(source, request, policy)?;
    let fields = aggregated.fields();

    let encoded = if policy.scan_boundary {
        encode_checked(&fields, &aggregated.files)?
    } else {
        encode(&fields, &aggregated.files)
    };

    info!(
        files = aggregated.files.len(),
        fields = fields.len(),
        body_size = encoded.bytes().len(),
        mode = %aggregated.parameters.mode,
        "Prepared multipart request"
    );

    let (body, content_type) = encoded.into_parts();
    Ok(PreparedRequest {
        body,
        headers: vec![(CONTENT_TYPE_HEADER.to_string(), content_type)],
    })
}

/// Prepares a request and posts it through `transport`.
///
/// # Errors
///
/// Returns any preparation error, or [`Error::Transport`](crate::Error::Transport)
/// if the transport fails.
pub async fn submit<T, S>(
    transport: &T,
    source: &S,
    request: &AggregationRequest,
    policy: &UploadPolicy,
) -> Result<serde_json::Value>
where
    T: Transport + ?Sized,
    S: ItemSource + ?Sized,
{
    let prepared = prepare_request(source, request, policy)?;
    let response = transport.post(prepared).await?;
    info!("Upload accepted");
    Ok(response)
}
