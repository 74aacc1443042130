//! # pay-api
//!
//! HTTP API layer for the PayPal PWA gateway.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Sales-channel-scoped PayPal endpoints for headless storefronts
//! - Create-order forwarding to the checkout subsystem
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/sales-channel-api/{version}/pwa/plugin/paypal/client-id` | PayPal client id |
//! | POST | `/sales-channel-api/{version}/pwa/plugin/paypal/create-order` | Create order (alias) |
//! | POST | `/sales-channel-api/{version}/_action/paypal/spb/create-payment` | Create order |
//! | POST | `/sales-channel-api/{version}/pwa/plugin/paypal/approve` | Store approval |
//! | GET | `/sales-channel-api/{version}/pwa/plugin/paypal/approval` | Read approval |
//! | DELETE | `/sales-channel-api/{version}/pwa/plugin/paypal/approval` | Finalize approval |

pub mod context;
pub mod handlers;
pub mod routes;
pub mod state;

pub use context::ChannelContext;
pub use routes::create_router;
pub use state::{AppConfig, AppState, ChannelsConfig};
