//! # Request Context
//!
//! Extracts the sales channel context from the storefront headers.

use crate::handlers::{payment_error_to_response, ApiError};
use crate::state::AppState;
use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use pay_core::{PaymentError, SalesChannelContext};
use std::ops::Deref;

/// Storefront API key header
pub const ACCESS_KEY_HEADER: &str = "sw-access-key";

/// Checkout session header
pub const CONTEXT_TOKEN_HEADER: &str = "sw-context-token";

/// Sales channel context of the current request
#[derive(Debug, Clone)]
pub struct ChannelContext(pub SalesChannelContext);

impl Deref for ChannelContext {
    type Target = SalesChannelContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl FromRequestParts<AppState> for ChannelContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let access_key = header_str(&parts.headers, ACCESS_KEY_HEADER)
            .ok_or_else(|| payment_error_to_response(PaymentError::MissingAccessKey))?;
        let context_token = header_str(&parts.headers, CONTEXT_TOKEN_HEADER);

        state
            .resolver
            .resolve(access_key, context_token)
            .map(ChannelContext)
            .map_err(payment_error_to_response)
    }
}
