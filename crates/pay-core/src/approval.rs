//! # Pending Approvals
//!
//! When the buyer approves a payment in the PayPal Smart Button popup the
//! storefront receives a payer id and a payment id. The approval store keeps
//! them per checkout session so that the confirm page, the order placement
//! payload and the finalize step can read them back without the client
//! having to pass them again.
//!
//! ```text
//! approve ──save──▶ [ (channel, context token) → PendingApproval ]
//! confirm ──get───▶
//! place   ──get───▶
//! finalize ─take──▶ (entry removed)
//! ```

use crate::error::{PaymentError, PaymentResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Default lifetime of an approval. PayPal orders stay approvable for
/// about three hours.
pub const DEFAULT_APPROVAL_TTL_SECS: i64 = 3 * 60 * 60;

/// Identifies one checkout session within one sales channel
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApprovalKey {
    pub sales_channel_id: String,
    pub context_token: String,
}

impl ApprovalKey {
    pub fn new(sales_channel_id: impl Into<String>, context_token: impl Into<String>) -> Self {
        Self {
            sales_channel_id: sales_channel_id.into(),
            context_token: context_token.into(),
        }
    }
}

/// Payer and payment ids handed back by PayPal on approval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingApproval {
    pub payer_id: String,
    pub payment_id: String,
    pub approved_at: DateTime<Utc>,
}

impl PendingApproval {
    /// Create an approval stamped with the current time.
    ///
    /// Both ids must be non-blank.
    pub fn new(payer_id: impl Into<String>, payment_id: impl Into<String>) -> PaymentResult<Self> {
        let payer_id = payer_id.into();
        let payment_id = payment_id.into();

        if payer_id.trim().is_empty() {
            return Err(PaymentError::InvalidRequest("payerId must not be empty".to_string()));
        }
        if payment_id.trim().is_empty() {
            return Err(PaymentError::InvalidRequest("paymentId must not be empty".to_string()));
        }

        Ok(Self {
            payer_id,
            payment_id,
            approved_at: Utc::now(),
        })
    }

    /// Check whether the approval is older than `ttl` at `now`
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.approved_at >= ttl
    }
}

/// Session-scoped storage for pending approvals
#[async_trait]
pub trait ApprovalStore: Send + Sync {
    /// Store an approval, replacing any previous one for the session
    async fn save(&self, key: &ApprovalKey, approval: PendingApproval) -> PaymentResult<()>;

    /// Read the approval for a session without removing it
    async fn get(&self, key: &ApprovalKey) -> PaymentResult<Option<PendingApproval>>;

    /// Read and remove the approval for a session
    async fn take(&self, key: &ApprovalKey) -> PaymentResult<Option<PendingApproval>>;

    /// Drop expired entries, returning how many were removed
    async fn purge_expired(&self) -> PaymentResult<usize>;
}

/// Type alias for a shared approval store (dynamic dispatch)
pub type BoxedApprovalStore = Arc<dyn ApprovalStore>;

/// Process-local approval store with a fixed time-to-live
pub struct InMemoryApprovalStore {
    entries: RwLock<HashMap<ApprovalKey, PendingApproval>>,
    ttl: Duration,
}

impl InMemoryApprovalStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    fn poisoned() -> PaymentError {
        PaymentError::Internal("approval store lock poisoned".to_string())
    }
}

impl Default for InMemoryApprovalStore {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_APPROVAL_TTL_SECS))
    }
}

#[async_trait]
impl ApprovalStore for InMemoryApprovalStore {
    async fn save(&self, key: &ApprovalKey, approval: PendingApproval) -> PaymentResult<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.insert(key.clone(), approval);
        Ok(())
    }

    async fn get(&self, key: &ApprovalKey) -> PaymentResult<Option<PendingApproval>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        let now = Utc::now();
        Ok(entries
            .get(key)
            .filter(|a| !a.is_expired(self.ttl, now))
            .cloned())
    }

    async fn take(&self, key: &ApprovalKey) -> PaymentResult<Option<PendingApproval>> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        let now = Utc::now();
        Ok(entries
            .remove(key)
            .filter(|a| !a.is_expired(self.ttl, now)))
    }

    async fn purge_expired(&self) -> PaymentResult<usize> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        let now = Utc::now();
        let before = entries.len();
        entries.retain(|_, a| !a.is_expired(self.ttl, now));
        Ok(before - entries.len())
    }
}
