//! # Checkout Upstream Configuration
//!
//! Where the checkout subsystem's SPB create-payment operation lives.
//! Values are loaded from environment variables.

use pay_core::PaymentError;
use std::env;
use std::time::Duration;

/// Native route of the SPB create-payment operation. `{version}` is
/// replaced with the API version of the inbound request.
pub const DEFAULT_CREATE_ORDER_PATH: &str =
    "/sales-channel-api/{version}/_action/paypal/spb/create-payment";

/// Default upstream request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Checkout upstream configuration
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Base URL of the checkout subsystem (scheme, host, optional port)
    pub upstream_url: String,

    /// Create-order path template
    pub create_order_path: String,

    /// Request timeout
    pub timeout: Duration,
}

impl CheckoutConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `CHECKOUT_UPSTREAM_URL`
    ///
    /// Optional:
    /// - `CHECKOUT_CREATE_ORDER_PATH` (default [`DEFAULT_CREATE_ORDER_PATH`])
    /// - `CHECKOUT_TIMEOUT_SECS` (default 30)
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let upstream_url = env::var("CHECKOUT_UPSTREAM_URL").map_err(|_| {
            PaymentError::Configuration("CHECKOUT_UPSTREAM_URL not set".to_string())
        })?;

        let create_order_path = env::var("CHECKOUT_CREATE_ORDER_PATH")
            .unwrap_or_else(|_| DEFAULT_CREATE_ORDER_PATH.to_string());

        let timeout_secs = match env::var("CHECKOUT_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                PaymentError::Configuration(format!(
                    "CHECKOUT_TIMEOUT_SECS must be a whole number of seconds, got {:?}",
                    raw
                ))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let config = Self {
            upstream_url,
            create_order_path,
            timeout: Duration::from_secs(timeout_secs),
        };
        config.validate()?;
        Ok(config)
    }

    /// Create config with explicit upstream URL and default path/timeout
    pub fn new(upstream_url: impl Into<String>) -> Self {
        Self {
            upstream_url: upstream_url.into(),
            create_order_path: DEFAULT_CREATE_ORDER_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Builder: set path template
    pub fn with_create_order_path(mut self, path: impl Into<String>) -> Self {
        self.create_order_path = path.into();
        self
    }

    /// Builder: set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn validate(&self) -> Result<(), PaymentError> {
        if !self.upstream_url.starts_with("http://") && !self.upstream_url.starts_with("https://") {
            return Err(PaymentError::Configuration(
                "CHECKOUT_UPSTREAM_URL must start with http:// or https://".to_string(),
            ));
        }

        if !self.create_order_path.starts_with('/') {
            return Err(PaymentError::Configuration(
                "CHECKOUT_CREATE_ORDER_PATH must start with /".to_string(),
            ));
        }

        Ok(())
    }

    /// Full upstream URL of the create-order operation for an API version
    pub fn create_order_url(&self, api_version: &str) -> String {
        format!(
            "{}{}",
            self.upstream_url.trim_end_matches('/'),
            self.create_order_path.replace("{version}", api_version)
        )
    }
}
