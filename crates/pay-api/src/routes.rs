//! # Routes
//!
//! Axum router configuration for the PayPal PWA gateway.
//!
//! Each operation is registered once under its canonical path. Paths a
//! client library expects elsewhere are declared in a [`RouteTable`] alias
//! list and mounted onto the same handler.

use crate::handlers::{self, payment_error_to_response, ApiError};
use crate::state::AppState;
use axum::{
    extract::{Path, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, MethodRouter},
    Router,
};
use pay_core::PaymentError;
use std::collections::HashMap;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Prefix of the PWA plugin endpoints
pub const PWA_PREFIX: &str = "/sales-channel-api/{version}/pwa/plugin/paypal";

/// Canonical route of the SPB create-order operation
pub const CREATE_ORDER_CANONICAL: &str = "/sales-channel-api/{version}/_action/paypal/spb/create-payment";

/// Route the PWA PayPal client library calls for create-order
pub const CREATE_ORDER_ALIAS: &str = "/sales-channel-api/{version}/pwa/plugin/paypal/create-order";

fn pwa_path(suffix: &str) -> String {
    format!("{}{}", PWA_PREFIX, suffix)
}

/// A path served by the handler registered under another path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteAlias {
    pub alias: String,
    pub canonical: String,
}

/// Routes registered once, plus aliases resolved against them
pub struct RouteTable<S> {
    routes: Vec<(String, MethodRouter<S>)>,
    aliases: Vec<RouteAlias>,
}

impl<S> RouteTable<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            aliases: Vec::new(),
        }
    }

    /// Register an operation under its canonical path
    pub fn route(mut self, path: impl Into<String>, method_router: MethodRouter<S>) -> Self {
        self.routes.push((path.into(), method_router));
        self
    }

    /// Serve `alias` with whatever is registered at `canonical`
    pub fn alias(mut self, alias: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.aliases.push(RouteAlias {
            alias: alias.into(),
            canonical: canonical.into(),
        });
        self
    }

    pub fn aliases(&self) -> &[RouteAlias] {
        &self.aliases
    }

    /// Build the router.
    ///
    /// # Panics
    ///
    /// Panics if an alias points at a path that was never registered, or if
    /// two entries claim the same path (as `Router::route` does).
    pub fn into_router(self) -> Router<S> {
        let by_path: HashMap<&str, &MethodRouter<S>> = self
            .routes
            .iter()
            .map(|(path, mr)| (path.as_str(), mr))
            .collect();

        let mut router = Router::new();
        for alias in &self.aliases {
            let target = by_path.get(alias.canonical.as_str()).unwrap_or_else(|| {
                panic!(
                    "route alias {} points at unregistered path {}",
                    alias.alias, alias.canonical
                )
            });
            router = router.route(&alias.alias, (*target).clone());
        }
        for (path, method_router) in self.routes {
            router = router.route(&path, method_router);
        }
        router
    }
}

impl<S> Default for RouteTable<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// `true` for version segments of the form `v<digits>`
pub fn is_supported_version(version: &str) -> bool {
    version
        .strip_prefix('v')
        .map(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

/// Reject requests whose `{version}` segment is not `v<digits>`
async fn require_api_version(
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(version) = params.get("version") {
        if !is_supported_version(version) {
            return Err(payment_error_to_response(PaymentError::UnsupportedApiVersion {
                version: version.clone(),
            }));
        }
    }
    Ok(next.run(request).await)
}

/// Sales-channel API routes with their aliases
pub fn sales_channel_routes() -> RouteTable<AppState> {
    RouteTable::new()
        .route(pwa_path("/client-id"), post(handlers::get_client_id))
        .route(CREATE_ORDER_CANONICAL, post(handlers::create_order))
        .route(pwa_path("/approve"), post(handlers::on_approve))
        .route(
            pwa_path("/approval"),
            get(handlers::get_approval).delete(handlers::finalize_approval),
        )
        .alias(CREATE_ORDER_ALIAS, CREATE_ORDER_CANONICAL)
}

/// Create the main application router
///
/// Routes (prefix `/sales-channel-api/{version}`):
/// - POST   /pwa/plugin/paypal/client-id     - Client id for the PayPal JS SDK
/// - POST   /_action/paypal/spb/create-payment - Create order (forwarded)
/// - POST   /pwa/plugin/paypal/create-order  - Alias of create-payment
/// - POST   /pwa/plugin/paypal/approve       - Store payer/payment ids
/// - GET    /pwa/plugin/paypal/approval      - Read pending approval
/// - DELETE /pwa/plugin/paypal/approval      - Take and clear pending approval
///
/// - Health:
///   - GET /health, GET /
pub fn create_router(state: AppState) -> Router {
    // Storefronts are served from arbitrary PWA origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = sales_channel_routes()
        .into_router()
        .route_layer(middleware::from_fn(require_api_version));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .merge(api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
