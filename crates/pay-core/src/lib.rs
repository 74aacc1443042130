//! # pay-core
//!
//! Core types and traits for the PayPal PWA gateway.
//!
//! This crate provides:
//! - `ChannelSettings`, `SettingsService` and `SettingsRegistry` for per-channel PayPal settings
//! - `SalesChannelContext` and `ContextResolver` for request scoping
//! - `CheckoutDelegate` for forwarding order creation to the checkout subsystem
//! - `ApprovalStore` for approval state shared across checkout steps
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{SettingsRegistry, SettingsOverride, SettingsService};
//!
//! let settings = SettingsRegistry::new().with_channel(
//!     "storefront",
//!     SettingsOverride::new().with_sandbox(true).with_client_id_sandbox("CID-SBX"),
//! );
//!
//! let client_id = settings.get_settings("storefront").await?.active_client_id().to_string();
//! ```

pub mod approval;
pub mod checkout;
pub mod context;
pub mod error;
pub mod settings;

// Re-exports for convenience
pub use approval::{
    ApprovalKey, ApprovalStore, BoxedApprovalStore, InMemoryApprovalStore, PendingApproval,
    DEFAULT_APPROVAL_TTL_SECS,
};
pub use checkout::{
    strip_hop_by_hop, BoxedCheckoutDelegate, CheckoutDelegate, DelegateResponse,
    ForwardedRequest, HOP_BY_HOP_HEADERS,
};
pub use context::{
    BoxedContextResolver, ContextResolver, SalesChannel, SalesChannelContext,
    SalesChannelRegistry,
};
pub use error::{PaymentError, PaymentResult};
pub use settings::{
    BoxedSettingsService, ChannelSettings, SettingsOverride, SettingsRegistry, SettingsService,
};
