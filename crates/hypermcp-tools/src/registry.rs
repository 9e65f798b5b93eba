use crate::ToolError;
use async_trait::async_trait;
use hypermcp_core::{LimitOrder, VenueClient, VenueError};
use hypermcp_schema::{ParamSpec, ParameterSchema, SchemaError};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

pub const GET_ALL_MIDS: &str = "get_all_mids";
pub const PLACE_LIMIT_ORDER: &str = "place_limit_order";

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: ParameterSchema,
}

/// Handler bound to a tool. Receives arguments that already passed the
/// tool's schema, with defaults filled in.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: Map<String, Value>) -> Result<Value, ToolError>;
}

pub struct RegisteredTool {
    pub definition: ToolDefinition,
    pub handler: Arc<dyn ToolHandler>,
}

/// The fixed tool catalog, bound to the process's single venue client.
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new(client: Arc<dyn VenueClient>) -> Self {
        let tools = vec![
            RegisteredTool {
                definition: get_all_mids_definition(),
                handler: Arc::new(GetAllMids {
                    client: Arc::clone(&client),
                }),
            },
            RegisteredTool {
                definition: place_limit_order_definition(),
                handler: Arc::new(PlaceLimitOrder { client }),
            },
        ];
        Self { tools }
    }

    /// Catalog order, stable for the life of the process.
    pub fn list(&self) -> Vec<&ToolDefinition> {
        self.tools.iter().map(|t| &t.definition).collect()
    }

    /// Exact, case-sensitive lookup.
    pub fn resolve(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|t| t.definition.name == name)
    }
}

fn get_all_mids_definition() -> ToolDefinition {
    ToolDefinition {
        name: GET_ALL_MIDS,
        description: "Fetch the mid price of every listed coin. Returns a map of coin symbol to price.",
        parameters: ParameterSchema::empty(),
    }
}

fn place_limit_order_definition() -> ToolDefinition {
    ToolDefinition {
        name: PLACE_LIMIT_ORDER,
        description: "Place a limit order. Requires the coin symbol, side ('buy'/'sell'), size and limit price.",
        parameters: ParameterSchema::new(vec![
            ParamSpec::string("coin")
                .non_empty()
                .describe("Coin symbol, e.g. BTC."),
            ParamSpec::one_of("side", &["buy", "sell"]).describe("Order side."),
            ParamSpec::number("size")
                .positive()
                .describe("Order size in coin units."),
            ParamSpec::number("limit_price")
                .positive()
                .describe("Limit price."),
            ParamSpec::one_of("time_in_force", &["Gtc", "Ioc", "Alo"])
                .with_default(json!("Gtc"))
                .describe("Gtc = good-till-cancelled, Ioc = immediate-or-cancel, Alo = post-only."),
            ParamSpec::boolean("reduce_only")
                .with_default(json!(false))
                .describe("Only reduce an existing position."),
        ]),
    }
}

struct GetAllMids {
    client: Arc<dyn VenueClient>,
}

#[async_trait]
impl ToolHandler for GetAllMids {
    async fn call(&self, _args: Map<String, Value>) -> Result<Value, ToolError> {
        let mids = self.client.get_all_mids().await?;
        to_data(&mids)
    }
}

struct PlaceLimitOrder {
    client: Arc<dyn VenueClient>,
}

#[async_trait]
impl ToolHandler for PlaceLimitOrder {
    async fn call(&self, args: Map<String, Value>) -> Result<Value, ToolError> {
        let order: LimitOrder = serde_json::from_value(Value::Object(args))
            .map_err(|e| SchemaError::single("arguments", e.to_string()))?;
        let ack = self.client.place_limit_order(order).await?;
        to_data(&ack)
    }
}

fn to_data<T: Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value)
        .map_err(|e| VenueError::Internal(format!("failed to encode result: {e}")).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypermcp_core::{Mids, OrderAck, VenueInfo};

    struct NullVenue;

    #[async_trait]
    impl VenueClient for NullVenue {
        fn info(&self) -> VenueInfo {
            VenueInfo {
                name: "null".to_string(),
                network: Default::default(),
                base_url: None,
                live: false,
            }
        }

        async fn get_all_mids(&self) -> Result<Mids, VenueError> {
            Ok(Mids::new())
        }

        async fn place_limit_order(&self, _order: LimitOrder) -> Result<OrderAck, VenueError> {
            Err(VenueError::Rejected("null venue".to_string()))
        }
    }

    #[test]
    fn lists_catalog_in_order() {
        let registry = ToolRegistry::new(Arc::new(NullVenue));
        let names: Vec<_> = registry.list().iter().map(|d| d.name).collect();
        assert_eq!(names, vec![GET_ALL_MIDS, PLACE_LIMIT_ORDER]);
        assert!(registry.list()[0].parameters.is_empty());
        assert_eq!(registry.list()[1].parameters.params().len(), 6);
    }

    #[test]
    fn resolve_is_exact_and_case_sensitive() {
        let registry = ToolRegistry::new(Arc::new(NullVenue));
        assert!(registry.resolve("get_all_mids").is_some());
        assert!(registry.resolve("GET_ALL_MIDS").is_none());
        assert!(registry.resolve("get_all_mids ").is_none());
        assert!(registry.resolve("place_order").is_none());
    }

    #[tokio::test]
    async fn empty_venue_yields_empty_object() {
        let registry = ToolRegistry::new(Arc::new(NullVenue));
        let tool = registry.resolve(GET_ALL_MIDS).unwrap();
        assert_eq!(tool.handler.call(Map::new()).await.unwrap(), json!({}));
    }
}
