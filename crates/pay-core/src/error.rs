//! # Gateway Error Types
//!
//! Typed error handling for the PayPal PWA gateway.
//! All gateway operations return `Result<T, PaymentError>`.

use thiserror::Error;

/// Core error type for all gateway operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// No usable PayPal settings for the sales channel
    #[error("PayPal settings invalid for sales channel {sales_channel_id}: required setting \"{field}\" is missing or invalid")]
    SettingsInvalid {
        sales_channel_id: String,
        field: String,
    },

    /// Configuration errors (missing env vars, unreadable config file)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Request carried no `sw-access-key` header
    #[error("Missing sw-access-key header")]
    MissingAccessKey,

    /// Access key does not belong to an active sales channel
    #[error("No active sales channel for access key {access_key}")]
    SalesChannelNotFound { access_key: String },

    /// Operation needs a checkout session but the request has none
    #[error("Missing sw-context-token header")]
    MissingContextToken,

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Path version segment is not of the form `v<digits>`
    #[error("Unsupported API version: {version}")]
    UnsupportedApiVersion { version: String },

    /// No pending approval for the checkout session
    #[error("No pending PayPal approval for this checkout session")]
    ApprovalNotFound,

    /// The checkout delegate could not be reached
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PaymentError {
    /// Shorthand for a `SettingsInvalid` error
    pub fn settings_invalid(sales_channel_id: impl Into<String>, field: impl Into<String>) -> Self {
        PaymentError::SettingsInvalid {
            sales_channel_id: sales_channel_id.into(),
            field: field.into(),
        }
    }

    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, PaymentError::NetworkError(_))
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::SettingsInvalid { .. } => 500,
            PaymentError::Configuration(_) => 500,
            PaymentError::MissingAccessKey => 401,
            PaymentError::SalesChannelNotFound { .. } => 401,
            PaymentError::MissingContextToken => 400,
            PaymentError::InvalidRequest(_) => 400,
            PaymentError::UnsupportedApiVersion { .. } => 404,
            PaymentError::ApprovalNotFound => 404,
            PaymentError::NetworkError(_) => 502,
            PaymentError::Internal(_) => 500,
            PaymentError::Serialization(_) => 500,
        }
    }
}

/// Result type alias for gateway operations
pub type PaymentResult<T> = Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(PaymentError::NetworkError("connection refused".into()).is_retryable());
        assert!(!PaymentError::settings_invalid("sc-1", "clientId").is_retryable());
        assert!(!PaymentError::InvalidRequest("bad data".into()).is_retryable());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PaymentError::settings_invalid("sc-1", "clientId").status_code(),
            500
        );
        assert_eq!(PaymentError::MissingAccessKey.status_code(), 401);
        assert_eq!(PaymentError::MissingContextToken.status_code(), 400);
        assert_eq!(PaymentError::ApprovalNotFound.status_code(), 404);
        assert_eq!(
            PaymentError::UnsupportedApiVersion {
                version: "latest".into()
            }
            .status_code(),
            404
        );
        assert_eq!(PaymentError::NetworkError("x".into()).status_code(), 502);
    }

    #[test]
    fn test_settings_invalid_message_names_field() {
        let err = PaymentError::settings_invalid("sc-1", "clientIdSandbox");
        let message = err.to_string();
        assert!(message.contains("sc-1"));
        assert!(message.contains("clientIdSandbox"));
    }
}
