//! # Channel Settings
//!
//! Per-sales-channel PayPal configuration.
//!
//! Settings are layered: a global record provides defaults and each sales
//! channel may override any field. A channel with neither its own record
//! nor a global one has no settings at all and every lookup for it fails
//! with [`PaymentError::SettingsInvalid`].

use crate::error::{PaymentError, PaymentResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Wire name of the live client id setting
pub const FIELD_CLIENT_ID: &str = "clientId";

/// Wire name of the sandbox client id setting
pub const FIELD_CLIENT_ID_SANDBOX: &str = "clientIdSandbox";

/// Effective PayPal settings for one sales channel
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSettings {
    /// Use the sandbox credentials instead of the live ones
    #[serde(alias = "sandboxMode")]
    pub sandbox: bool,

    /// Live client id
    pub client_id: String,

    /// Sandbox client id
    pub client_id_sandbox: String,
}

impl ChannelSettings {
    /// Create live-mode settings
    pub fn live(client_id: impl Into<String>, client_id_sandbox: impl Into<String>) -> Self {
        Self {
            sandbox: false,
            client_id: client_id.into(),
            client_id_sandbox: client_id_sandbox.into(),
        }
    }

    /// Create sandbox-mode settings
    pub fn sandbox(client_id: impl Into<String>, client_id_sandbox: impl Into<String>) -> Self {
        Self {
            sandbox: true,
            ..Self::live(client_id, client_id_sandbox)
        }
    }

    /// The client id for the current mode: `client_id_sandbox` in sandbox
    /// mode, `client_id` otherwise.
    pub fn active_client_id(&self) -> &str {
        if self.sandbox {
            &self.client_id_sandbox
        } else {
            &self.client_id
        }
    }

    /// Wire name of the setting `active_client_id` reads
    pub fn active_client_id_field(&self) -> &'static str {
        if self.sandbox {
            FIELD_CLIENT_ID_SANDBOX
        } else {
            FIELD_CLIENT_ID
        }
    }

    /// Check that the credential for the active mode is present.
    ///
    /// The credential of the inactive mode is allowed to be empty.
    pub fn validate(&self, sales_channel_id: &str) -> PaymentResult<()> {
        if self.active_client_id().trim().is_empty() {
            return Err(PaymentError::settings_invalid(
                sales_channel_id,
                self.active_client_id_field(),
            ));
        }
        Ok(())
    }
}

/// A partial settings record, as stored for the global scope or a channel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsOverride {
    #[serde(default, alias = "sandbox_mode", skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id_sandbox: Option<String>,
}

impl SettingsOverride {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set sandbox flag
    pub fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = Some(sandbox);
        self
    }

    /// Builder: set live client id
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Builder: set sandbox client id
    pub fn with_client_id_sandbox(mut self, client_id: impl Into<String>) -> Self {
        self.client_id_sandbox = Some(client_id.into());
        self
    }

    /// Apply this record's set fields on top of `base`
    pub fn apply_to(&self, base: &mut ChannelSettings) {
        if let Some(sandbox) = self.sandbox {
            base.sandbox = sandbox;
        }
        if let Some(ref client_id) = self.client_id {
            base.client_id = client_id.clone();
        }
        if let Some(ref client_id) = self.client_id_sandbox {
            base.client_id_sandbox = client_id.clone();
        }
    }
}

/// Settings lookup used by the gateway.
///
/// The gateway never writes settings; implementations own persistence.
#[async_trait]
pub trait SettingsService: Send + Sync {
    /// Effective, validated settings for a sales channel.
    ///
    /// Fails with [`PaymentError::SettingsInvalid`] when the channel has no
    /// settings or the active credential is missing.
    async fn get_settings(&self, sales_channel_id: &str) -> PaymentResult<ChannelSettings>;
}

/// Type alias for a shared settings service (dynamic dispatch)
pub type BoxedSettingsService = Arc<dyn SettingsService>;

/// In-memory settings source, usually loaded from the channels config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsRegistry {
    /// Defaults for every channel
    #[serde(default)]
    pub global: Option<SettingsOverride>,

    /// Per-channel overrides keyed by sales channel id
    #[serde(default)]
    pub channels: HashMap<String, SettingsOverride>,
}

impl SettingsRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the global record
    pub fn with_global(mut self, global: SettingsOverride) -> Self {
        self.global = Some(global);
        self
    }

    /// Builder: add a channel record
    pub fn with_channel(mut self, sales_channel_id: impl Into<String>, settings: SettingsOverride) -> Self {
        self.set_channel(sales_channel_id, settings);
        self
    }

    /// Insert or replace a channel record
    pub fn set_channel(&mut self, sales_channel_id: impl Into<String>, settings: SettingsOverride) {
        self.channels.insert(sales_channel_id.into(), settings);
    }

    /// Merge global and channel records and validate the result
    pub fn resolve(&self, sales_channel_id: &str) -> PaymentResult<ChannelSettings> {
        let channel = self.channels.get(sales_channel_id);

        if channel.is_none() && self.global.is_none() {
            return Err(PaymentError::settings_invalid(sales_channel_id, FIELD_CLIENT_ID));
        }

        let mut settings = ChannelSettings::default();
        for layer in [self.global.as_ref(), channel].into_iter().flatten() {
            layer.apply_to(&mut settings);
        }

        settings.validate(sales_channel_id)?;
        Ok(settings)
    }

    /// Check if a channel has its own record
    pub fn has_channel(&self, sales_channel_id: &str) -> bool {
        self.channels.contains_key(sales_channel_id)
    }

    /// Get number of channel records
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Check if there are no channel records
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[async_trait]
impl SettingsService for SettingsRegistry {
    async fn get_settings(&self, sales_channel_id: &str) -> PaymentResult<ChannelSettings> {
        self.resolve(sales_channel_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(sandbox: bool) -> SettingsOverride {
        SettingsOverride::new()
            .with_sandbox(sandbox)
            .with_client_id("CID-LIVE")
            .with_client_id_sandbox("CID-SBX")
    }

    #[test]
    fn test_active_client_id_follows_sandbox_flag() {
        let live = ChannelSettings::live("CID-LIVE", "CID-SBX");
        assert_eq!(live.active_client_id(), "CID-LIVE");

        let sandbox = ChannelSettings::sandbox("CID-LIVE", "CID-SBX");
        assert_eq!(sandbox.active_client_id(), "CID-SBX");
    }

    #[test]
    fn test_validate_only_checks_active_credential() {
        assert!(ChannelSettings::live("CID-LIVE", "").validate("a").is_ok());
        assert!(ChannelSettings::sandbox("", "CID-SBX").validate("a").is_ok());

        match ChannelSettings::sandbox("CID-LIVE", "  ").validate("a") {
            Err(PaymentError::SettingsInvalid { field, .. }) => {
                assert_eq!(field, FIELD_CLIENT_ID_SANDBOX)
            }
            other => panic!("expected SettingsInvalid, got {:?}", other),
        }
    }

    #[test]
    fn test_registry_example_channels() {
        let registry = SettingsRegistry::new()
            .with_channel("A", full(false))
            .with_channel("B", full(true));

        assert_eq!(registry.resolve("A").unwrap().active_client_id(), "CID-LIVE");
        assert_eq!(registry.resolve("B").unwrap().active_client_id(), "CID-SBX");
    }

    #[test]
    fn test_registry_missing_channel_is_invalid() {
        let registry = SettingsRegistry::new().with_channel("A", full(false));

        assert!(matches!(
            registry.resolve("unknown"),
            Err(PaymentError::SettingsInvalid { .. })
        ));
    }

    #[test]
    fn test_channel_overrides_global() {
        let registry = SettingsRegistry::new()
            .with_global(full(false))
            .with_channel("B", SettingsOverride::new().with_sandbox(true))
            .with_channel("C", SettingsOverride::new().with_client_id("CID-C"));

        // Unset fields inherit from global
        assert_eq!(registry.resolve("B").unwrap().active_client_id(), "CID-SBX");
        assert_eq!(registry.resolve("C").unwrap().active_client_id(), "CID-C");
        // No channel record: global alone applies
        assert_eq!(registry.resolve("D").unwrap().active_client_id(), "CID-LIVE");
    }

    #[test]
    fn test_registry_from_toml() {
        let registry: SettingsRegistry = toml::from_str(
            r#"
            [global]
            client_id = "CID-LIVE"
            client_id_sandbox = "CID-SBX"

            [channels.B]
            sandbox = true
            "#,
        )
        .unwrap();

        assert_eq!(registry.resolve("A").unwrap().active_client_id(), "CID-LIVE");
        assert_eq!(registry.resolve("B").unwrap().active_client_id(), "CID-SBX");
    }

    #[tokio::test]
    async fn test_get_settings_is_idempotent() {
        let registry = SettingsRegistry::new().with_channel("A", full(false));

        let first = registry.get_settings("A").await.unwrap();
        let second = registry.get_settings("A").await.unwrap();
        assert_eq!(first, second);
    }
}
