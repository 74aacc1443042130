//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the settings source, context resolver, checkout delegate and
//! approval store, all behind traits so tests can substitute fakes.

use pay_core::{
    BoxedApprovalStore, BoxedCheckoutDelegate, BoxedContextResolver, BoxedSettingsService,
    InMemoryApprovalStore, SalesChannel, SalesChannelRegistry, SettingsRegistry,
    DEFAULT_APPROVAL_TTL_SECS,
};
use pay_paypal::SpbCheckoutForwarder;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Default interval between expired-approval sweeps
pub const DEFAULT_PURGE_INTERVAL_SECS: u64 = 300;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Explicit path of the channels config file
    pub channels_config: Option<String>,
    /// Lifetime of a pending approval in seconds
    pub approval_ttl_secs: i64,
    /// Interval between expired-approval sweeps in seconds
    pub approval_purge_interval_secs: u64,
    /// Log output format
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            channels_config: std::env::var("CHANNELS_CONFIG").ok(),
            approval_ttl_secs: std::env::var("APPROVAL_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &i64| *v > 0)
                .unwrap_or(defaults.approval_ttl_secs),
            approval_purge_interval_secs: std::env::var("APPROVAL_PURGE_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &u64| *v > 0)
                .unwrap_or(defaults.approval_purge_interval_secs),
            log_format: std::env::var("LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or(defaults.log_format),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn approval_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.approval_ttl_secs)
    }

    pub fn approval_purge_interval(&self) -> Duration {
        Duration::from_secs(self.approval_purge_interval_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "development".to_string(),
            channels_config: None,
            approval_ttl_secs: DEFAULT_APPROVAL_TTL_SECS,
            approval_purge_interval_secs: DEFAULT_PURGE_INTERVAL_SECS,
            log_format: LogFormat::Text,
        }
    }
}

/// Contents of the channels config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelsConfig {
    /// Storefronts allowed to call the gateway
    #[serde(default)]
    pub sales_channels: Vec<SalesChannel>,
    /// PayPal settings, global and per channel
    #[serde(default)]
    pub paypal: SettingsRegistry,
}

impl ChannelsConfig {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Split into the context resolver and the settings source
    pub fn into_parts(self) -> (SalesChannelRegistry, SettingsRegistry) {
        let channels = SalesChannelRegistry {
            sales_channels: self.sales_channels,
        };
        (channels, self.paypal)
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PayPal settings lookup
    pub settings: BoxedSettingsService,
    /// Sales channel context resolution
    pub resolver: BoxedContextResolver,
    /// Checkout subsystem create-order operation
    pub checkout: BoxedCheckoutDelegate,
    /// Approval state across checkout steps
    pub approvals: BoxedApprovalStore,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create an AppState from a loaded config and the channels config file
    pub fn with_config(config: AppConfig) -> anyhow::Result<Self> {
        let channels_config = load_channels_config(config.channels_config.as_deref())?;
        let (channels, settings) = channels_config.into_parts();

        tracing::info!(
            "Loaded {} sales channels ({} active), {} channel settings records (global: {})",
            channels.len(),
            channels.active_channels().count(),
            settings.len(),
            settings.global.is_some()
        );
        for id in channels_without_settings(&channels, &settings) {
            tracing::warn!("Sales channel {} has no PayPal settings, client-id requests will fail", id);
        }

        let forwarder = SpbCheckoutForwarder::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize checkout forwarder: {}", e))?;

        tracing::info!(
            "Forwarding create-order to {}",
            forwarder.config().create_order_url("{version}")
        );

        let approvals = InMemoryApprovalStore::new(config.approval_ttl());

        Ok(Self::from_parts(
            config,
            Arc::new(settings),
            Arc::new(channels),
            Arc::new(forwarder),
            Arc::new(approvals),
        ))
    }

    /// Assemble state from already-built collaborators
    pub fn from_parts(
        config: AppConfig,
        settings: BoxedSettingsService,
        resolver: BoxedContextResolver,
        checkout: BoxedCheckoutDelegate,
        approvals: BoxedApprovalStore,
    ) -> Self {
        Self {
            settings,
            resolver,
            checkout,
            approvals,
            config,
        }
    }

    /// Periodically drop expired approvals. Runs until the runtime shuts down.
    pub fn spawn_approval_purge(&self) -> tokio::task::JoinHandle<()> {
        let approvals = self.approvals.clone();
        let period = self.config.approval_purge_interval();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match approvals.purge_expired().await {
                    Ok(0) => {}
                    Ok(n) => tracing::debug!("Purged {} expired approvals", n),
                    Err(e) => tracing::error!("Approval purge failed: {}", e),
                }
            }
        })
    }
}

/// Active channels that resolve to no settings record at all
fn channels_without_settings<'a>(
    channels: &'a SalesChannelRegistry,
    settings: &SettingsRegistry,
) -> Vec<&'a str> {
    if settings.global.is_some() {
        return Vec::new();
    }
    channels
        .active_channels()
        .filter(|c| !settings.has_channel(&c.id))
        .map(|c| c.id.as_str())
        .collect()
}

/// Load the channels config file
fn load_channels_config(explicit: Option<&str>) -> anyhow::Result<ChannelsConfig> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?;
        return ChannelsConfig::from_toml_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e));
    }

    let config_paths = [
        "config/channels.toml",
        "../config/channels.toml",
        "../../config/channels.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let config = ChannelsConfig::from_toml_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded channels config from {}", path);
            return Ok(config);
        }
    }

    // Every request will be rejected until channels are configured
    tracing::warn!("No channels config found, no sales channel can call the gateway");
    Ok(ChannelsConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pay_core::{ContextResolver, PaymentError, SettingsOverride};

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.approval_ttl_secs, DEFAULT_APPROVAL_TTL_SECS);
        assert!(!config.is_production());
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            ..AppConfig::default()
        };

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");

        let bad = AppConfig {
            host: "not a host".to_string(),
            ..AppConfig::default()
        };
        assert!(bad.socket_addr().is_err());
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::parse("pretty"), LogFormat::Text);
    }

    #[test]
    fn test_channels_config_from_toml() {
        let config = ChannelsConfig::from_toml_str(
            r#"
            [[sales_channels]]
            id = "storefront"
            name = "Storefront"
            access_key = "SWSCSTOREFRONT"

            [[sales_channels]]
            id = "outlet"
            access_key = "SWSCOUTLET"
            active = false

            [paypal.global]
            client_id = "CID-LIVE"
            client_id_sandbox = "CID-SBX"

            [paypal.channels.storefront]
            sandbox = true
            "#,
        )
        .unwrap();

        let (channels, settings) = config.into_parts();
        assert_eq!(channels.len(), 2);

        let ctx = channels.resolve("SWSCSTOREFRONT", None).unwrap();
        assert_eq!(
            settings.resolve(&ctx.sales_channel_id).unwrap().active_client_id(),
            "CID-SBX"
        );
        assert!(matches!(
            channels.resolve("SWSCOUTLET", None),
            Err(PaymentError::SalesChannelNotFound { .. })
        ));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        assert!(load_channels_config(Some("/nonexistent/channels.toml")).is_err());
    }

    #[test]
    fn test_with_config_uses_given_channels_path() {
        let config = AppConfig {
            channels_config: Some("/nonexistent/channels.toml".to_string()),
            ..AppConfig::default()
        };

        let err = AppState::with_config(config).err().unwrap();
        assert!(err.to_string().contains("/nonexistent/channels.toml"));
    }

    #[test]
    fn test_channels_without_settings() {
        let config = ChannelsConfig::from_toml_str(
            r#"
            [[sales_channels]]
            id = "storefront"
            access_key = "SWSCSTOREFRONT"

            [[sales_channels]]
            id = "outlet"
            access_key = "SWSCOUTLET"

            [[sales_channels]]
            id = "retired"
            access_key = "SWSCRETIRED"
            active = false

            [paypal.channels.storefront]
            client_id = "CID-LIVE"
            "#,
        )
        .unwrap();
        let (channels, mut settings) = config.into_parts();

        assert_eq!(channels_without_settings(&channels, &settings), vec!["outlet"]);

        settings.global = Some(SettingsOverride::new().with_client_id("CID-GLOBAL"));
        assert!(channels_without_settings(&channels, &settings).is_empty());
    }
}
