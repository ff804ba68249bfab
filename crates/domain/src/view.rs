//! Externally-shaped order projection.

use chrono::{DateTime, Utc};
use common::{CustomerId, OrderStatus, ProductId};
use serde::{Deserialize, Serialize};
use store::Order;

/// Read-only representation of an order as exposed over the API.
///
/// Field names follow the wire format: `createdAt`, `status`, `customerId`,
/// `productsId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub customer_id: CustomerId,
    pub products_id: Vec<ProductId>,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            created_at: order.created_at,
            status: order.status,
            customer_id: order.customer_id,
            products_id: order.product_ids,
        }
    }
}
