//! Core domain types and the venue client trait for hypermcp.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Mid prices keyed by coin symbol.
pub type Mids = BTreeMap<String, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn is_buy(self) -> bool {
        matches!(self, OrderSide::Buy)
    }
}

/// Order lifetime policy. The literals are case-sensitive on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    #[default]
    Gtc,
    Ioc,
    Alo,
}

impl TimeInForce {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeInForce::Gtc => "Gtc",
            TimeInForce::Ioc => "Ioc",
            TimeInForce::Alo => "Alo",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitOrder {
    pub coin: String,
    pub side: OrderSide,
    pub size: f64,
    pub limit_price: f64,
    #[serde(default)]
    pub time_in_force: TimeInForce,
    #[serde(default)]
    pub reduce_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAck {
    pub status: AckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => f.write_str("mainnet"),
            Network::Testnet => f.write_str("testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(ConfigError::InvalidNetwork(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueInfo {
    pub name: String,
    pub network: Network,
    pub base_url: Option<Url>,
    /// `false` for clients that never touch the network.
    pub live: bool,
}

/// Failures raised by a venue client at call time.
#[derive(Debug, thiserror::Error)]
pub enum VenueError {
    #[error("venue rejected request: {0}")]
    Rejected(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("venue did not respond in time")]
    Timeout,
    #[error("invalid venue response: {0}")]
    InvalidResponse(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Startup-only failures. Any of these aborts the process before it serves.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PRIVATE_KEY is not set")]
    MissingCredential,
    #[error("malformed private key: {0}")]
    MalformedCredential(String),
    #[error("live venue support is not available: {0}")]
    LiveUnavailable(String),
    #[error("unknown network `{0}` (expected mainnet or testnet)")]
    InvalidNetwork(String),
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
}

/// Capability interface over a trading venue.
///
/// Implementations are shared by every request for the lifetime of the
/// process, so they must be callable concurrently through `&self`.
#[async_trait]
pub trait VenueClient: Send + Sync {
    fn info(&self) -> VenueInfo;

    /// Returns an empty map when the venue lists no coins.
    async fn get_all_mids(&self) -> Result<Mids, VenueError>;

    async fn place_limit_order(&self, order: LimitOrder) -> Result<OrderAck, VenueError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn limit_order_applies_serde_defaults() {
        let order: LimitOrder = serde_json::from_value(json!({
            "coin": "BTC",
            "side": "buy",
            "size": 0.1,
            "limit_price": 60000.0
        }))
        .unwrap();
        assert_eq!(order.time_in_force, TimeInForce::Gtc);
        assert!(!order.reduce_only);
        assert!(order.side.is_buy());
    }

    #[test]
    fn order_ack_uses_camel_case_and_skips_empty_fields() {
        let ack = OrderAck {
            status: AckStatus::Ok,
            order_id: Some("42".to_string()),
            raw: None,
        };
        assert_eq!(
            serde_json::to_value(&ack).unwrap(),
            json!({"status": "ok", "orderId": "42"})
        );
    }

    #[test]
    fn network_parses_case_insensitively() {
        assert_eq!("Testnet".parse::<Network>().unwrap(), Network::Testnet);
        assert!(matches!(
            "devnet".parse::<Network>(),
            Err(ConfigError::InvalidNetwork(_))
        ));
    }
}
