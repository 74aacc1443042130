//! # Checkout Delegate
//!
//! Seam between the gateway and the checkout subsystem that actually
//! creates PayPal orders.
//!
//! ```text
//! ┌───────────────┐  ForwardedRequest   ┌──────────────────────────┐
//! │  pay-api      │ ──────────────────▶ │ CheckoutDelegate (trait) │
//! │  create_order │ ◀────────────────── │  └── create_order()      │
//! └───────────────┘  DelegateResponse   └────────────▲─────────────┘
//!                                                    │
//!                                       ┌────────────┴────────────┐
//!                                       │  SpbCheckoutForwarder   │
//!                                       │  (pay-paypal, HTTP)     │
//!                                       └─────────────────────────┘
//! ```
//!
//! The gateway neither validates nor rewrites the payload. Error responses
//! from the checkout subsystem are ordinary [`DelegateResponse`]s.

use crate::error::PaymentResult;
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use std::sync::Arc;

/// Headers that describe a single connection rather than the payload.
/// They are never copied across the gateway.
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

/// Remove hop-by-hop headers in place, including any named by `Connection`
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<String> = headers
        .get_all(http::header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(*name);
    }
}

/// An inbound create-order request, captured for forwarding
#[derive(Debug, Clone)]
pub struct ForwardedRequest {
    /// API version segment from the inbound route (e.g. `v1`)
    pub api_version: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ForwardedRequest {
    /// Capture a request, dropping hop-by-hop headers
    pub fn new(api_version: impl Into<String>, method: Method, mut headers: HeaderMap, body: Bytes) -> Self {
        strip_hop_by_hop(&mut headers);
        Self {
            api_version: api_version.into(),
            method,
            headers,
            body,
        }
    }
}

/// Whatever the checkout subsystem answered, success or failure
#[derive(Debug, Clone)]
pub struct DelegateResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl DelegateResponse {
    /// Capture a response, dropping hop-by-hop headers
    pub fn new(status: StatusCode, mut headers: HeaderMap, body: Bytes) -> Self {
        strip_hop_by_hop(&mut headers);
        Self {
            status,
            headers,
            body,
        }
    }
}

/// The create-order operation of the checkout subsystem.
#[async_trait]
pub trait CheckoutDelegate: Send + Sync {
    /// Forward a create-order request.
    ///
    /// Returns `Ok` for every response the checkout subsystem produced,
    /// including 4xx/5xx ones. `Err` means no response was obtained.
    async fn create_order(&self, request: ForwardedRequest) -> PaymentResult<DelegateResponse>;

    /// Get the delegate name (for logging).
    fn delegate_name(&self) -> &'static str;
}

/// Type alias for a shared checkout delegate (dynamic dispatch)
pub type BoxedCheckoutDelegate = Arc<dyn CheckoutDelegate>;

#[cfg(test)]
mod tests {
    use super::*;
    use http::{header, HeaderValue};

    #[test]
    fn test_hop_by_hop_headers_are_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("sw-context-token", HeaderValue::from_static("token-1"));
        headers.insert(header::HOST, HeaderValue::from_static("gateway.local"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("14"));

        let request = ForwardedRequest::new(
            "v1",
            Method::POST,
            headers,
            Bytes::from_static(br#"{"orderId":"X"}"#),
        );

        assert_eq!(request.headers.len(), 2);
        assert_eq!(request.headers["sw-context-token"], "token-1");
        assert!(request.headers.get(header::HOST).is_none());
        assert!(request.headers.get("keep-alive").is_none());
        assert_eq!(&request.body[..], br#"{"orderId":"X"}"#);
    }

    #[test]
    fn test_delegate_response_keeps_status_and_body() {
        let mut headers = HeaderMap::new();
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = DelegateResponse::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            headers,
            Bytes::from_static(b"{\"errors\":[]}"),
        );

        assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.headers.get(header::TRANSFER_ENCODING).is_none());
        assert_eq!(&response.body[..], b"{\"errors\":[]}");
    }

    #[test]
    fn test_headers_named_by_connection_are_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("X-Trace-Hop, keep-alive"));
        headers.append(header::CONNECTION, HeaderValue::from_static("x-session-hint"));
        headers.insert("x-trace-hop", HeaderValue::from_static("edge-1"));
        headers.insert("x-session-hint", HeaderValue::from_static("sticky"));
        headers.insert("sw-access-key", HeaderValue::from_static("SWSCSTOREFRONT"));

        strip_hop_by_hop(&mut headers);

        assert!(headers.get("x-trace-hop").is_none());
        assert!(headers.get("x-session-hint").is_none());
        assert!(headers.get(header::CONNECTION).is_none());
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(headers["sw-access-key"], "SWSCSTOREFRONT");
        assert_eq!(headers.len(), 2);
    }
}
