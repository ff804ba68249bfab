//! Shared types for the order service.

mod status;
mod types;

pub use status::OrderStatus;
pub use types::{CustomerId, Money, OrderId, ProductId};
