//! Trading venue tools over a backend chosen once at startup.

use hypermcp_adapter_stub::StubVenueClient;
use hypermcp_core::{ConfigError, Network, VenueClient, VenueInfo};
use hypermcp_tools::{Dispatcher, ToolCallResult, ToolDefinition, ToolRegistry};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub use hypermcp_core;
pub use hypermcp_schema;
pub use hypermcp_tools;

/// Whether this build can talk to the real venue.
pub const LIVE_SUPPORT: bool = cfg!(feature = "hyperliquid");

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Stub,
    Live,
}

#[derive(Debug, Clone)]
pub struct VenueConfig {
    pub private_key: Option<String>,
    pub network: Network,
    /// Overrides the network's default API endpoint.
    pub base_url: Option<Url>,
    pub request_timeout: Duration,
    /// Refuse to fall back to the stub when the credential is missing.
    pub require_live: bool,
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            private_key: None,
            network: Network::Mainnet,
            base_url: None,
            request_timeout: DEFAULT_TIMEOUT,
            require_live: false,
        }
    }
}

impl VenueConfig {
    fn credential(&self) -> Option<&str> {
        self.private_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

pub struct VenueSelection {
    pub client: Arc<dyn VenueClient>,
    pub backend: BackendKind,
    /// Set whenever the stub was chosen.
    pub fallback_reason: Option<String>,
}

impl VenueSelection {
    fn stub(reason: &str, network: Network) -> Self {
        tracing::warn!(reason, "falling back to stub venue client; orders will not be sent");
        Self {
            client: Arc::new(StubVenueClient::new().on_network(network)),
            backend: BackendKind::Stub,
            fallback_reason: Some(reason.to_string()),
        }
    }
}

/// Picks the venue client for the whole process.
///
/// A missing credential or a build without live support degrades to the
/// stub. A credential that is present but malformed is an error: the caller
/// must not start serving.
pub fn select_venue_client(config: &VenueConfig) -> Result<VenueSelection, ConfigError> {
    select_with_support(config, LIVE_SUPPORT)
}

fn select_with_support(
    config: &VenueConfig,
    live_support: bool,
) -> Result<VenueSelection, ConfigError> {
    if !live_support {
        if config.require_live {
            return Err(ConfigError::LiveUnavailable(
                "built without the `hyperliquid` feature".to_string(),
            ));
        }
        return Ok(VenueSelection::stub(
            "live venue support not compiled in",
            config.network,
        ));
    }
    match config.credential() {
        Some(key) => live::connect(key, config),
        None if config.require_live => Err(ConfigError::MissingCredential),
        None => Ok(VenueSelection::stub("PRIVATE_KEY is not set", config.network)),
    }
}

#[cfg(feature = "hyperliquid")]
mod live {
    use super::{BackendKind, VenueConfig, VenueSelection};
    use hypermcp_adapter_hyperliquid::{default_base_url, HyperliquidClient};
    use hypermcp_core::ConfigError;
    use std::sync::Arc;

    pub(crate) fn connect(key: &str, config: &VenueConfig) -> Result<VenueSelection, ConfigError> {
        let base_url = match &config.base_url {
            Some(url) => url.clone(),
            None => default_base_url(config.network)?,
        };
        let client = HyperliquidClient::with_base_url(key, config.network, base_url)?
            .with_timeout(config.request_timeout)?;
        tracing::info!(
            address = %client.address(),
            network = %config.network,
            "live venue client ready"
        );
        Ok(VenueSelection {
            client: Arc::new(client),
            backend: BackendKind::Live,
            fallback_reason: None,
        })
    }
}

#[cfg(not(feature = "hyperliquid"))]
mod live {
    use super::{VenueConfig, VenueSelection};
    use hypermcp_core::ConfigError;

    pub(crate) fn connect(_key: &str, _config: &VenueConfig) -> Result<VenueSelection, ConfigError> {
        Err(ConfigError::LiveUnavailable(
            "built without the `hyperliquid` feature".to_string(),
        ))
    }
}

/// The tool service: registry and dispatcher bound to the selected client.
pub struct HyperMcp {
    dispatcher: Dispatcher,
    backend: BackendKind,
    venue: VenueInfo,
}

impl HyperMcp {
    pub fn new(selection: VenueSelection, call_timeout: Duration) -> Self {
        let venue = selection.client.info();
        let registry = Arc::new(ToolRegistry::new(selection.client));
        Self {
            dispatcher: Dispatcher::new(registry).with_timeout(call_timeout),
            backend: selection.backend,
            venue,
        }
    }

    pub fn tools(&self) -> Vec<&ToolDefinition> {
        self.dispatcher.registry().list()
    }

    pub async fn call(&self, tool_name: &str, arguments: Value) -> ToolCallResult {
        self.dispatcher.execute(tool_name, arguments).await
    }

    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn venue(&self) -> &VenueInfo {
        &self.venue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[cfg(feature = "hyperliquid")]
    const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn config(private_key: Option<&str>) -> VenueConfig {
        VenueConfig {
            private_key: private_key.map(str::to_string),
            ..VenueConfig::default()
        }
    }

    #[test]
    fn missing_credential_falls_back_to_stub() {
        for key in [None, Some(""), Some("   ")] {
            let selection = select_venue_client(&config(key)).unwrap();
            assert_eq!(selection.backend, BackendKind::Stub);
            assert!(selection.fallback_reason.is_some());
            assert!(!selection.client.info().live);
        }
    }

    #[test]
    fn require_live_refuses_the_fallback() {
        let mut strict = config(None);
        strict.require_live = true;
        assert!(select_venue_client(&strict).is_err());
    }

    #[cfg(feature = "hyperliquid")]
    #[test]
    fn valid_credential_selects_live_client() {
        let mut cfg = config(Some(KEY));
        cfg.network = Network::Testnet;
        let selection = select_venue_client(&cfg).unwrap();
        assert_eq!(selection.backend, BackendKind::Live);
        assert!(selection.fallback_reason.is_none());

        let info = selection.client.info();
        assert!(info.live);
        assert_eq!(info.network, Network::Testnet);
        assert_eq!(
            info.base_url.unwrap().as_str(),
            "https://api.hyperliquid-testnet.xyz/"
        );
    }

    #[cfg(feature = "hyperliquid")]
    #[test]
    fn malformed_credential_is_fatal() {
        let err = select_venue_client(&config(Some("0xnot-hex"))).err().unwrap();
        assert!(matches!(err, ConfigError::MalformedCredential(_)));
    }

    #[tokio::test]
    async fn without_live_support_any_credential_uses_stub() {
        let mut cfg = config(Some("0xnot-hex"));
        cfg.network = Network::Testnet;
        let selection = select_with_support(&cfg, false).unwrap();
        assert_eq!(selection.backend, BackendKind::Stub);
        assert_eq!(
            selection.fallback_reason.as_deref(),
            Some("live venue support not compiled in")
        );
        assert_eq!(selection.client.info().network, Network::Testnet);

        let service = HyperMcp::new(selection, DEFAULT_TIMEOUT);
        assert!(service.call("get_all_mids", json!({})).await.success);
        let ack = service
            .call(
                "place_limit_order",
                json!({"coin": "BTC", "side": "buy", "size": 0.5, "limit_price": 59000}),
            )
            .await;
        assert!(ack.success);
    }

    #[test]
    fn without_live_support_require_live_is_refused() {
        let mut strict = config(Some(&"11".repeat(32)));
        strict.require_live = true;
        assert!(matches!(
            select_with_support(&strict, false).err().unwrap(),
            ConfigError::LiveUnavailable(_)
        ));
    }

    #[tokio::test]
    async fn stub_service_serves_both_tools() {
        let service = HyperMcp::new(select_venue_client(&config(None)).unwrap(), DEFAULT_TIMEOUT);
        assert_eq!(service.backend(), BackendKind::Stub);
        assert_eq!(service.venue().name, "stub");
        assert_eq!(service.venue().network, Network::Mainnet);
        assert_eq!(service.tools().len(), 2);

        let mids = service.call("get_all_mids", json!({})).await;
        assert!(mids.success);
        assert!(!mids.data.unwrap().as_object().unwrap().is_empty());

        let ack = service
            .call(
                "place_limit_order",
                json!({"coin": "ETH", "side": "sell", "size": 1.0, "limit_price": 2600.0}),
            )
            .await;
        assert_eq!(ack.data.unwrap()["status"], json!("ok"));
    }
}
