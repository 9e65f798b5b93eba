use hypermcp_core::{LimitOrder, VenueError};
use serde::Serialize;

/// Exchange action carrying a batch of orders.
///
/// Field order matters: the msgpack encoding of this struct is hashed for
/// signing and must match the venue's own encoding byte for byte.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct OrderAction {
    #[serde(rename = "type")]
    kind: &'static str,
    orders: Vec<OrderWire>,
    grouping: &'static str,
}

impl OrderAction {
    pub(crate) fn single(order: OrderWire) -> Self {
        Self {
            kind: "order",
            orders: vec![order],
            grouping: "na",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct OrderWire {
    a: u32,
    b: bool,
    p: String,
    s: String,
    r: bool,
    t: OrderTypeWire,
}

#[derive(Debug, Clone, Serialize)]
struct OrderTypeWire {
    limit: LimitWire,
}

#[derive(Debug, Clone, Serialize)]
struct LimitWire {
    tif: &'static str,
}

impl OrderWire {
    pub(crate) fn from_order(asset: u32, order: &LimitOrder) -> Result<Self, VenueError> {
        Ok(Self {
            a: asset,
            b: order.side.is_buy(),
            p: float_to_wire(order.limit_price)?,
            s: float_to_wire(order.size)?,
            r: order.reduce_only,
            t: OrderTypeWire {
                limit: LimitWire {
                    tif: order.time_in_force.as_str(),
                },
            },
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SignatureWire {
    pub r: String,
    pub s: String,
    pub v: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExchangeRequest<'a> {
    pub action: &'a OrderAction,
    pub nonce: u64,
    pub signature: SignatureWire,
    pub vault_address: Option<String>,
}

/// Renders a price or size the way the venue expects: at most eight
/// decimals, trailing zeros removed.
pub(crate) fn float_to_wire(value: f64) -> Result<String, VenueError> {
    let rounded = format!("{value:.8}");
    let parsed: f64 = rounded
        .parse()
        .map_err(|_| VenueError::Internal(format!("cannot render {value} for the wire")))?;
    if value > 0.0 && parsed <= 0.0 {
        return Err(VenueError::Rejected(format!(
            "{value} rounds to zero at 8 decimals"
        )));
    }
    if (parsed - value).abs() >= 1e-12 {
        return Err(VenueError::Rejected(format!(
            "{value} has more precision than the venue accepts"
        )));
    }
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        return Ok("0".to_string());
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hypermcp_core::{OrderSide, TimeInForce};
    use serde_json::json;

    #[test]
    fn float_to_wire_trims_trailing_zeros() {
        assert_eq!(float_to_wire(60000.0).unwrap(), "60000");
        assert_eq!(float_to_wire(0.1).unwrap(), "0.1");
        assert_eq!(float_to_wire(2500.25).unwrap(), "2500.25");
        assert_eq!(float_to_wire(100.0).unwrap(), "100");
        assert_eq!(float_to_wire(0.00000001).unwrap(), "0.00000001");
    }

    #[test]
    fn float_to_wire_rejects_excess_precision() {
        assert!(matches!(
            float_to_wire(0.123456789),
            Err(VenueError::Rejected(_))
        ));
    }

    #[test]
    fn float_to_wire_refuses_values_that_round_to_zero() {
        for tiny in [1e-13, 1e-10, 4.9e-9] {
            let err = float_to_wire(tiny).unwrap_err();
            assert!(
                matches!(&err, VenueError::Rejected(msg) if msg.contains("rounds to zero")),
                "{tiny}: {err}"
            );
        }
    }

    #[test]
    fn order_action_serializes_in_venue_shape() {
        let order = LimitOrder {
            coin: "ETH".to_string(),
            side: OrderSide::Sell,
            size: 0.25,
            limit_price: 2500.5,
            time_in_force: TimeInForce::Alo,
            reduce_only: true,
        };
        let action = OrderAction::single(OrderWire::from_order(1, &order).unwrap());
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({
                "type": "order",
                "orders": [{
                    "a": 1,
                    "b": false,
                    "p": "2500.5",
                    "s": "0.25",
                    "r": true,
                    "t": {"limit": {"tif": "Alo"}}
                }],
                "grouping": "na"
            })
        );
    }
}
