//! # SPB Checkout Forwarder
//!
//! Forwards create-order requests to the checkout subsystem's Smart
//! Payment Button create-payment route over HTTP and hands back its
//! answer untouched.

use crate::config::CheckoutConfig;
use async_trait::async_trait;
use pay_core::{CheckoutDelegate, DelegateResponse, ForwardedRequest, PaymentError, PaymentResult};
use reqwest::Client;
use tracing::{debug, error, info, instrument, warn};

/// HTTP implementation of [`CheckoutDelegate`]
pub struct SpbCheckoutForwarder {
    config: CheckoutConfig,
    client: Client,
}

impl SpbCheckoutForwarder {
    /// Create a new forwarder
    pub fn new(config: CheckoutConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        let config = CheckoutConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }
}

#[async_trait]
impl CheckoutDelegate for SpbCheckoutForwarder {
    #[instrument(skip(self, request), fields(api_version = %request.api_version, body_len = request.body.len()))]
    async fn create_order(&self, request: ForwardedRequest) -> PaymentResult<DelegateResponse> {
        let url = self.config.create_order_url(&request.api_version);

        debug!("Forwarding create-order to {}", url);

        let response = self
            .client
            .request(request.method, &url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await
            .map_err(|e| {
                error!("Checkout upstream unreachable: {}", e);
                PaymentError::NetworkError(e.to_string())
            })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| PaymentError::NetworkError(e.to_string()))?;

        if status.is_success() {
            info!("Checkout upstream answered {}", status);
        } else {
            // Passed through as-is, the storefront handles it
            warn!("Checkout upstream answered {}", status);
        }

        Ok(DelegateResponse::new(status, headers, body))
    }

    fn delegate_name(&self) -> &'static str {
        "spb-checkout"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{HeaderMap, HeaderValue, Method, StatusCode};
    use wiremock::matchers::{body_bytes, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CREATE_PAYMENT_V1: &str = "/sales-channel-api/v1/_action/paypal/spb/create-payment";

    fn forwarded(body: &'static [u8]) -> ForwardedRequest {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers.insert("sw-access-key", HeaderValue::from_static("SWSCSTOREFRONT"));
        headers.insert("sw-context-token", HeaderValue::from_static("token-1"));
        ForwardedRequest::new("v1", Method::POST, headers, Bytes::from_static(body))
    }

    #[tokio::test]
    async fn test_forwards_body_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CREATE_PAYMENT_V1))
            .and(header("sw-context-token", "token-1"))
            .and(header("sw-access-key", "SWSCSTOREFRONT"))
            .and(body_bytes(br#"{"orderId":"X"}"#.to_vec()))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_bytes(br#"{"token":"EC-123"}"#.to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;

        let forwarder = SpbCheckoutForwarder::new(CheckoutConfig::new(server.uri())).unwrap();
        let response = forwarder.create_order(forwarded(br#"{"orderId":"X"}"#)).await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.headers["content-type"], "application/json");
        assert_eq!(&response.body[..], br#"{"token":"EC-123"}"#);
    }

    #[tokio::test]
    async fn test_upstream_errors_pass_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(CREATE_PAYMENT_V1))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_bytes(br#"{"errors":[{"code":"SWAG_PAYPAL__CART_EMPTY"}]}"#.to_vec()),
            )
            .mount(&server)
            .await;

        let forwarder = SpbCheckoutForwarder::new(CheckoutConfig::new(server.uri())).unwrap();
        let response = forwarder.create_order(forwarded(b"{}")).await.unwrap();

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            &response.body[..],
            br#"{"errors":[{"code":"SWAG_PAYPAL__CART_EMPTY"}]}"#
        );
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_network_error() {
        let forwarder = SpbCheckoutForwarder::new(CheckoutConfig::new("http://127.0.0.1:1")).unwrap();
        let result = forwarder.create_order(forwarded(b"{}")).await;

        assert!(matches!(result, Err(PaymentError::NetworkError(_))));
    }
}
