//! Hyperliquid venue client.
//!
//! Market data comes from the public `/info` endpoint. Orders are signed
//! locally with the account key and submitted to `/exchange`.
//!
//! Concurrency: the underlying `reqwest::Client` is safe to call from many
//! tasks at once, and nonces come from an atomic counter, so concurrent
//! order placements never share a nonce. No external serialization is needed.

mod signing;
mod wire;

use async_trait::async_trait;
use hypermcp_core::{
    AckStatus, ConfigError, LimitOrder, Mids, Network, OrderAck, VenueClient, VenueError,
    VenueInfo,
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use signing::Wallet;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::OnceCell;
use url::Url;
use wire::{ExchangeRequest, OrderAction, OrderWire};

pub const MAINNET_API_URL: &str = "https://api.hyperliquid.xyz";
pub const TESTNET_API_URL: &str = "https://api.hyperliquid-testnet.xyz";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub fn default_base_url(network: Network) -> Result<Url, ConfigError> {
    let raw = match network {
        Network::Mainnet => MAINNET_API_URL,
        Network::Testnet => TESTNET_API_URL,
    };
    Url::parse(raw).map_err(|e| ConfigError::InvalidBaseUrl(e.to_string()))
}

#[derive(Debug)]
pub struct HyperliquidClient {
    network: Network,
    base_url: Url,
    wallet: Wallet,
    client: HttpClient,
    // Perp universe is fixed for the process; fetched on first order.
    assets: OnceCell<HashMap<String, u32>>,
    last_nonce: AtomicU64,
}

impl HyperliquidClient {
    pub fn new(private_key: &str, network: Network) -> Result<Self, ConfigError> {
        Self::with_base_url(private_key, network, default_base_url(network)?)
    }

    pub fn with_base_url(
        private_key: &str,
        network: Network,
        base_url: Url,
    ) -> Result<Self, ConfigError> {
        let wallet = Wallet::from_hex(private_key)?;
        Ok(Self {
            network,
            base_url: with_trailing_slash(base_url),
            wallet,
            client: build_http_client(DEFAULT_REQUEST_TIMEOUT)?,
            assets: OnceCell::new(),
            last_nonce: AtomicU64::new(0),
        })
    }

    /// Replaces the per-request timeout (default 10s).
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        self.client = build_http_client(timeout)?;
        Ok(self)
    }

    pub fn address(&self) -> String {
        self.wallet.address()
    }

    pub fn network(&self) -> Network {
        self.network
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, VenueError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| VenueError::Internal(format!("failed to construct endpoint url: {e}")))?;
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(parse_http_error(status, text));
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                VenueError::Timeout
            } else {
                VenueError::InvalidResponse(format!("invalid json response: {e}"))
            }
        })
    }

    async fn asset_index(&self, coin: &str) -> Result<u32, VenueError> {
        let assets = self
            .assets
            .get_or_try_init(|| async {
                let meta = self.post("info", &json!({"type": "meta"})).await?;
                parse_universe(&meta)
            })
            .await?;
        assets
            .get(coin)
            .copied()
            .ok_or_else(|| VenueError::Rejected(format!("unknown coin `{coin}`")))
    }

    /// Milliseconds since the epoch, bumped when two calls land in the same
    /// millisecond.
    fn next_nonce(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let previous = self
            .last_nonce
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }
}

// `Url::join` replaces the last segment unless the path ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn build_http_client(timeout: Duration) -> Result<HttpClient, ConfigError> {
    HttpClient::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ConfigError::LiveUnavailable(format!("failed to build http client: {e}")))
}

#[async_trait]
impl VenueClient for HyperliquidClient {
    fn info(&self) -> VenueInfo {
        VenueInfo {
            name: "hyperliquid".to_string(),
            network: self.network,
            base_url: Some(self.base_url.clone()),
            live: true,
        }
    }

    async fn get_all_mids(&self) -> Result<Mids, VenueError> {
        let payload = self.post("info", &json!({"type": "allMids"})).await?;
        parse_mids(payload)
    }

    async fn place_limit_order(&self, order: LimitOrder) -> Result<OrderAck, VenueError> {
        let asset = self.asset_index(&order.coin).await?;
        let action = OrderAction::single(OrderWire::from_order(asset, &order)?);
        let nonce = self.next_nonce();
        let signature = self.wallet.sign_l1_action(&action, nonce, self.network)?;

        tracing::info!(
            coin = %order.coin,
            asset,
            side = ?order.side,
            nonce,
            "submitting limit order"
        );
        let payload = self
            .post(
                "exchange",
                &ExchangeRequest {
                    action: &action,
                    nonce,
                    signature,
                    vault_address: None,
                },
            )
            .await?;
        parse_order_response(payload)
    }
}

fn request_error(error: reqwest::Error) -> VenueError {
    if error.is_timeout() {
        VenueError::Timeout
    } else {
        VenueError::Transport(format!("request failed: {error}"))
    }
}

fn parse_http_error(status: StatusCode, body: String) -> VenueError {
    let message = extract_venue_error(body);
    if status.is_server_error() {
        VenueError::Transport(format!("venue returned {status}: {message}"))
    } else {
        VenueError::Rejected(format!("venue returned {status}: {message}"))
    }
}

fn extract_venue_error(body: String) -> String {
    serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("response"))
                .and_then(Value::as_str)
                .map(ToString::to_string)
        })
        .unwrap_or(body)
}

fn parse_mids(payload: Value) -> Result<Mids, VenueError> {
    let entries = match payload {
        Value::Object(entries) => entries,
        Value::Null => return Ok(Mids::new()),
        other => {
            return Err(VenueError::InvalidResponse(format!(
                "expected an object of mids, got {other}"
            )))
        }
    };
    entries
        .into_iter()
        .map(|(coin, raw)| {
            let mid = match &raw {
                Value::String(text) => text.parse::<f64>().ok(),
                Value::Number(number) => number.as_f64(),
                _ => None,
            }
            .ok_or_else(|| VenueError::InvalidResponse(format!("bad mid for {coin}: {raw}")))?;
            Ok((coin, mid))
        })
        .collect()
}

fn parse_universe(meta: &Value) -> Result<HashMap<String, u32>, VenueError> {
    let universe = meta
        .get("universe")
        .and_then(Value::as_array)
        .ok_or_else(|| VenueError::InvalidResponse("meta response has no universe".to_string()))?;
    Ok(universe
        .iter()
        .enumerate()
        .filter_map(|(index, asset)| {
            let name = asset.get("name").and_then(Value::as_str)?;
            Some((name.to_string(), index as u32))
        })
        .collect())
}

fn parse_order_response(payload: Value) -> Result<OrderAck, VenueError> {
    if payload.get("status").and_then(Value::as_str) != Some("ok") {
        let reason = match payload.get("response") {
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
            None => payload.to_string(),
        };
        return Err(VenueError::Rejected(reason));
    }

    let status = payload
        .pointer("/response/data/statuses/0")
        .cloned()
        .ok_or_else(|| VenueError::InvalidResponse("order response has no status".to_string()))?;
    if let Some(error) = status.get("error").and_then(Value::as_str) {
        return Err(VenueError::Rejected(error.to_string()));
    }
    let oid = status
        .pointer("/resting/oid")
        .or_else(|| status.pointer("/filled/oid"))
        .and_then(Value::as_u64)
        .ok_or_else(|| VenueError::InvalidResponse(format!("unrecognized order status: {status}")))?;

    Ok(OrderAck {
        status: AckStatus::Ok,
        order_id: Some(oid.to_string()),
        raw: Some(status),
    })
}
