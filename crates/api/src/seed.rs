//! Seed data for local runs.
//!
//! Customers and products are created administratively in this system; the
//! binary loads a small fixed catalog at startup so the API is usable
//! immediately.

use chrono::{Duration, Utc};
use common::{Money, OrderStatus};
use store::{EntityStore, NewCustomer, NewOrder, NewProduct, Result};

/// Populates the store with two customers, three products and three orders
/// at various lifecycle stages.
pub async fn load<S: EntityStore>(store: &S) -> Result<()> {
    let alice = store
        .create_customer(NewCustomer::new("Alice", "alice@example.com"))
        .await?;
    let bob = store
        .create_customer(NewCustomer::new("Bob", "bob@example.com"))
        .await?;

    let laptop = store
        .create_product(NewProduct::new("Laptop", Money::from_cents(120_000)))
        .await?;
    let phone = store
        .create_product(NewProduct::new("Smartphone", Money::from_cents(80_000)))
        .await?;
    let headphones = store
        .create_product(NewProduct::new("Headphones", Money::from_cents(15_000)))
        .await?;

    let placed = Utc::now() - Duration::days(1);

    store
        .create_order(NewOrder {
            status: OrderStatus::Created,
            created_at: placed,
            customer_id: alice.id,
            product_ids: vec![laptop.id, headphones.id],
        })
        .await?;
    store
        .create_order(NewOrder {
            status: OrderStatus::Paid,
            created_at: placed,
            customer_id: bob.id,
            product_ids: vec![phone.id],
        })
        .await?;
    store
        .create_order(NewOrder {
            status: OrderStatus::Shipped,
            created_at: placed,
            customer_id: alice.id,
            product_ids: vec![laptop.id, phone.id, headphones.id],
        })
        .await?;

    tracing::info!("seed data loaded");
    Ok(())
}
