//! # Request Handlers
//!
//! Axum request handlers for the PayPal PWA endpoints.
//! Every PayPal endpoint is scoped to the sales channel resolved from the
//! request headers.

use crate::context::ChannelContext;
use crate::state::AppState;
use axum::{
    body::{Body, Bytes},
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use pay_core::{ApprovalKey, ForwardedRequest, PaymentError, PendingApproval};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Client id response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientIdResponse {
    pub client_id: String,
}

/// Approval callback payload sent by the storefront's `onApprove`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    #[serde(default)]
    pub payer_id: String,
    #[serde(default)]
    pub payment_id: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn payment_error_to_response(err: PaymentError) -> ApiError {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR), Json(response))
}

fn approval_key(ctx: &ChannelContext) -> Result<ApprovalKey, ApiError> {
    let token = ctx
        .require_context_token()
        .map_err(payment_error_to_response)?;
    Ok(ApprovalKey::new(ctx.sales_channel_id.clone(), token))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "paypal-pwa-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Client id for the PayPal JS SDK, picked by the channel's sandbox flag
#[instrument(skip(state, ctx), fields(sales_channel = %ctx.sales_channel_id))]
pub async fn get_client_id(
    State(state): State<AppState>,
    ctx: ChannelContext,
) -> Result<Json<ClientIdResponse>, ApiError> {
    let settings = state
        .settings
        .get_settings(&ctx.sales_channel_id)
        .await
        .map_err(|e| {
            error!("No usable PayPal settings: {}", e);
            payment_error_to_response(e)
        })?;

    Ok(Json(ClientIdResponse {
        client_id: settings.active_client_id().to_string(),
    }))
}

/// Forward order creation to the checkout subsystem and relay its answer
#[instrument(skip(state, headers, body), fields(body_len = body.len()))]
pub async fn create_order(
    State(state): State<AppState>,
    Path(version): Path<String>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request = ForwardedRequest::new(version, method, headers, body);

    let delegated = state.checkout.create_order(request).await.map_err(|e| {
        error!(
            retryable = e.is_retryable(),
            "Checkout delegate {} failed: {}",
            state.checkout.delegate_name(),
            e
        );
        payment_error_to_response(e)
    })?;

    info!("Relaying checkout response: status={}", delegated.status);

    let mut response = Response::new(Body::from(delegated.body));
    *response.status_mut() = delegated.status;
    *response.headers_mut() = delegated.headers;
    Ok(response)
}

/// Remember payer and payment ids for the current checkout session
#[instrument(skip(state, ctx, payload), fields(sales_channel = %ctx.sales_channel_id))]
pub async fn on_approve(
    State(state): State<AppState>,
    ctx: ChannelContext,
    payload: Result<Json<ApproveRequest>, JsonRejection>,
) -> Result<Json<PendingApproval>, ApiError> {
    let key = approval_key(&ctx)?;
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected approve payload: {}", rejection.body_text());
        let (status, Json(body)) = payment_error_to_response(PaymentError::InvalidRequest(
            "approve body must be a JSON object with payerId and paymentId".to_string(),
        ));
        (status, Json(body.with_details(rejection.body_text())))
    })?;
    let approval = PendingApproval::new(request.payer_id, request.payment_id)
        .map_err(payment_error_to_response)?;

    state
        .approvals
        .save(&key, approval.clone())
        .await
        .map_err(payment_error_to_response)?;

    info!("Stored PayPal approval for payment {}", approval.payment_id);

    Ok(Json(approval))
}

/// Pending approval of the current checkout session (confirm and place-order steps)
#[instrument(skip(state, ctx), fields(sales_channel = %ctx.sales_channel_id))]
pub async fn get_approval(
    State(state): State<AppState>,
    ctx: ChannelContext,
) -> Result<Json<PendingApproval>, ApiError> {
    let key = approval_key(&ctx)?;

    state
        .approvals
        .get(&key)
        .await
        .map_err(payment_error_to_response)?
        .map(Json)
        .ok_or_else(|| payment_error_to_response(PaymentError::ApprovalNotFound))
}

/// Take the pending approval and clear it (finalize step)
#[instrument(skip(state, ctx), fields(sales_channel = %ctx.sales_channel_id))]
pub async fn finalize_approval(
    State(state): State<AppState>,
    ctx: ChannelContext,
) -> Result<Json<PendingApproval>, ApiError> {
    let key = approval_key(&ctx)?;

    let approval = state
        .approvals
        .take(&key)
        .await
        .map_err(payment_error_to_response)?
        .ok_or_else(|| {
            warn!("Finalize without a pending approval");
            payment_error_to_response(PaymentError::ApprovalNotFound)
        })?;

    info!("Finalized PayPal approval for payment {}", approval.payment_id);

    Ok(Json(approval))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error", 400).with_details("payerId");
        assert_eq!(err.error, "Test error");
        assert_eq!(err.code, 400);
        assert_eq!(err.details.as_deref(), Some("payerId"));
    }

    #[test]
    fn test_payment_error_conversion() {
        let (status, Json(body)) =
            payment_error_to_response(PaymentError::settings_invalid("sc-1", "clientId"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, 500);

        let (status, _) = payment_error_to_response(PaymentError::MissingAccessKey);
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_client_id_response_shape() {
        let json = serde_json::to_string(&ClientIdResponse {
            client_id: "CID-LIVE".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"clientId":"CID-LIVE"}"#);
    }
}
