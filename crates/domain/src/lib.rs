//! Domain layer for the order service.
//!
//! [`OrderService`] carries the only real business logic in the system:
//! order assembly with referential validation, and the lifecycle state
//! machine `CREATED → PAID → SHIPPED → DELIVERED`.

mod error;
mod service;
mod view;

pub use common::{CustomerId, Money, OrderId, OrderStatus, ProductId};
pub use error::OrderError;
pub use service::OrderService;
pub use view::OrderView;
