//! Persistent record types for the three entity kinds.

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, OrderId, OrderStatus, ProductId};
use serde::{Deserialize, Serialize};

/// A customer record.
///
/// Customers are created administratively (seed/import) and are read-only
/// afterwards; no update or delete operations exist in scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
}

/// Input for creating a customer; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
}

impl NewCustomer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// A product record. Name must be non-empty and price strictly positive;
/// the store rejects violations with an integrity error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
}

/// Input for creating a product; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

/// An order record.
///
/// Owns a required customer reference and a many-to-many product reference
/// set. After creation only the `status` field is ever mutated, through the
/// conditional update on [`crate::OrderStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub customer_id: CustomerId,
    pub product_ids: Vec<ProductId>,
}

/// Input for creating an order; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub customer_id: CustomerId,
    pub product_ids: Vec<ProductId>,
}
