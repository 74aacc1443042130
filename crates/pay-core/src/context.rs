//! # Sales Channel Context
//!
//! Per-request context for sales-channel-scoped endpoints and the
//! registry used to resolve it from a storefront access key.

use crate::error::{PaymentError, PaymentResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A configured storefront
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesChannel {
    /// Sales channel id, also the key into the settings source
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Storefront API key sent by clients as `sw-access-key`
    pub access_key: String,

    /// Whether this channel accepts requests
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl SalesChannel {
    pub fn new(id: impl Into<String>, access_key: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            access_key: access_key.into(),
            active: true,
        }
    }

    /// Builder: set display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder: deactivate the channel
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Context resolved for a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesChannelContext {
    pub sales_channel_id: String,

    /// Checkout session identifier (`sw-context-token`), if the client sent one
    pub context_token: Option<String>,
}

impl SalesChannelContext {
    pub fn new(sales_channel_id: impl Into<String>) -> Self {
        Self {
            sales_channel_id: sales_channel_id.into(),
            context_token: None,
        }
    }

    /// Builder: attach a checkout session token
    pub fn with_context_token(mut self, token: impl Into<String>) -> Self {
        self.context_token = Some(token.into());
        self
    }

    /// The checkout session token, or `MissingContextToken`
    pub fn require_context_token(&self) -> PaymentResult<&str> {
        self.context_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(PaymentError::MissingContextToken)
    }
}

/// Resolves the request context from the storefront credentials
pub trait ContextResolver: Send + Sync {
    fn resolve(&self, access_key: &str, context_token: Option<&str>) -> PaymentResult<SalesChannelContext>;
}

/// Type alias for a shared context resolver (dynamic dispatch)
pub type BoxedContextResolver = Arc<dyn ContextResolver>;

/// Registry of all configured sales channels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalesChannelRegistry {
    #[serde(default)]
    pub sales_channels: Vec<SalesChannel>,
}

impl SalesChannelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sales channel to the registry
    pub fn add(&mut self, channel: SalesChannel) {
        self.sales_channels.push(channel);
    }

    /// Add a sales channel with builder pattern
    pub fn with_channel(mut self, channel: SalesChannel) -> Self {
        self.add(channel);
        self
    }

    /// Get an active channel by access key
    pub fn by_access_key(&self, access_key: &str) -> Option<&SalesChannel> {
        self.sales_channels
            .iter()
            .find(|c| c.access_key == access_key && c.active)
    }

    /// List all active channels
    pub fn active_channels(&self) -> impl Iterator<Item = &SalesChannel> {
        self.sales_channels.iter().filter(|c| c.active)
    }

    /// Get number of channels
    pub fn len(&self) -> usize {
        self.sales_channels.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.sales_channels.is_empty()
    }
}

impl ContextResolver for SalesChannelRegistry {
    fn resolve(&self, access_key: &str, context_token: Option<&str>) -> PaymentResult<SalesChannelContext> {
        let channel = self
            .by_access_key(access_key)
            .ok_or_else(|| PaymentError::SalesChannelNotFound {
                access_key: access_key.to_string(),
            })?;

        Ok(SalesChannelContext {
            sales_channel_id: channel.id.clone(),
            context_token: context_token.map(String::from),
        })
    }
}
