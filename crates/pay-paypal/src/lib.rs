//! # pay-paypal
//!
//! PayPal Smart Payment Button support for the PWA gateway.
//!
//! The gateway does not talk to PayPal itself. Order creation is owned by
//! the checkout subsystem, and this crate provides the [`CheckoutDelegate`]
//! that forwards to it:
//!
//! - **SpbCheckoutForwarder**: POSTs the storefront's create-order request
//!   to the checkout subsystem's SPB create-payment route and returns the
//!   response verbatim.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_paypal::SpbCheckoutForwarder;
//! use pay_core::{CheckoutDelegate, ForwardedRequest};
//!
//! // Reads CHECKOUT_UPSTREAM_URL and friends
//! let forwarder = SpbCheckoutForwarder::from_env()?;
//!
//! let response = forwarder
//!     .create_order(ForwardedRequest::new("v1", method, headers, body))
//!     .await?;
//! ```
//!
//! [`CheckoutDelegate`]: pay_core::CheckoutDelegate

pub mod config;
pub mod forwarder;

// Re-exports
pub use config::{CheckoutConfig, DEFAULT_CREATE_ORDER_PATH};
pub use forwarder::SpbCheckoutForwarder;
