use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, OrderStatus, ProductId};
use store::StoreError;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The order does not exist.
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),

    /// The referenced customer does not exist.
    #[error("Customer {0} not found")]
    CustomerNotFound(CustomerId),

    /// One or more referenced products do not exist.
    #[error("Products not found: {}", format_ids(missing))]
    ProductsNotFound { missing: Vec<ProductId> },

    /// The order has no products at a point requiring at least one.
    #[error("Order must contain at least one product")]
    EmptyProducts,

    /// The order is not in the status required for the requested advance.
    #[error("Invalid transition: cannot {action} an order in {current} status")]
    InvalidTransition {
        current: OrderStatus,
        action: &'static str,
    },

    /// The supplied order timestamp lies in the future.
    #[error("Order timestamp {0} lies in the future")]
    CreatedAtInFuture(DateTime<Utc>),

    /// A store failure occurred.
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn format_ids(ids: &[ProductId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
