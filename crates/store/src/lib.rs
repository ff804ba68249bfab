//! Entity store for the order service.
//!
//! Defines the relational store contract ([`CustomerStore`], [`ProductStore`],
//! [`OrderStore`]) over the three record kinds, plus an in-memory
//! implementation for tests and local runs and a PostgreSQL implementation
//! for deployment.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod store;

pub use common::{CustomerId, Money, OrderId, OrderStatus, ProductId};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use record::{Customer, NewCustomer, NewOrder, NewProduct, Order, Product};
pub use store::{CustomerStore, EntityStore, OrderStore, ProductStore};
