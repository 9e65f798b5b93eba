use async_trait::async_trait;
use hypermcp_core::{
    AckStatus, LimitOrder, Mids, Network, OrderAck, VenueClient, VenueError, VenueInfo,
};
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};

/// Venue client that never touches the network.
///
/// Mid prices come from a fixed table and order acknowledgments are
/// fabricated from the request, so every call is reproducible.
#[derive(Debug)]
pub struct StubVenueClient {
    mids: Mids,
    network: Network,
    next_order: AtomicU64,
}

impl StubVenueClient {
    pub fn new() -> Self {
        Self::with_mids([("BTC", 60000.0), ("ETH", 2500.0)])
    }

    pub fn with_mids<I, S>(mids: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            mids: mids.into_iter().map(|(coin, mid)| (coin.into(), mid)).collect(),
            network: Network::default(),
            next_order: AtomicU64::new(1),
        }
    }
}

impl StubVenueClient {
    /// Network reported by [`VenueClient::info`]; the stub never contacts it.
    pub fn on_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }
}

impl Default for StubVenueClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VenueClient for StubVenueClient {
    fn info(&self) -> VenueInfo {
        VenueInfo {
            name: "stub".to_string(),
            network: self.network,
            base_url: None,
            live: false,
        }
    }

    async fn get_all_mids(&self) -> Result<Mids, VenueError> {
        Ok(self.mids.clone())
    }

    async fn place_limit_order(&self, order: LimitOrder) -> Result<OrderAck, VenueError> {
        let seq = self.next_order.fetch_add(1, Ordering::Relaxed);
        let order_id = format!("stub-{seq}");
        tracing::debug!(%order_id, coin = %order.coin, "stub order acknowledged");
        Ok(OrderAck {
            status: AckStatus::Ok,
            order_id: Some(order_id),
            raw: Some(json!({
                "order": order,
                "note": "stub venue client; no order was sent",
            })),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypermcp_core::{OrderSide, TimeInForce};

    fn order() -> LimitOrder {
        LimitOrder {
            coin: "BTC".to_string(),
            side: OrderSide::Buy,
            size: 0.1,
            limit_price: 60000.0,
            time_in_force: TimeInForce::Gtc,
            reduce_only: false,
        }
    }

    #[tokio::test]
    async fn mids_are_identical_across_calls() {
        let client = StubVenueClient::new();
        let first = client.get_all_mids().await.unwrap();
        let second = client.get_all_mids().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.get("BTC"), Some(&60000.0));
    }

    #[tokio::test]
    async fn injected_mids_replace_defaults() {
        let client = StubVenueClient::with_mids([("SOL", 150.5)]);
        let mids = client.get_all_mids().await.unwrap();
        assert_eq!(mids.len(), 1);
        assert_eq!(mids["SOL"], 150.5);
        assert!(StubVenueClient::with_mids(Vec::<(String, f64)>::new())
            .get_all_mids()
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn orders_get_sequential_ids_and_echo_input() {
        let client = StubVenueClient::new();
        let first = client.place_limit_order(order()).await.unwrap();
        let second = client.place_limit_order(order()).await.unwrap();
        assert_eq!(first.status, AckStatus::Ok);
        assert_eq!(first.order_id.as_deref(), Some("stub-1"));
        assert_eq!(second.order_id.as_deref(), Some("stub-2"));
        assert_eq!(first.raw.unwrap()["order"]["coin"], "BTC");
    }

    #[test]
    fn reports_offline_info_for_configured_network() {
        let info = StubVenueClient::new().info();
        assert!(!info.live);
        assert_eq!(info.network, Network::Mainnet);
        assert_eq!(
            StubVenueClient::new().on_network(Network::Testnet).info().network,
            Network::Testnet
        );
    }
}
