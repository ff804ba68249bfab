use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use common::{CustomerId, OrderId, OrderStatus, ProductId};

use crate::{
    Customer, NewCustomer, NewOrder, NewProduct, Order, Product, Result, StoreError,
    store::{CustomerStore, OrderStore, ProductStore},
};

#[derive(Default)]
struct Inner {
    customers: Vec<Customer>,
    products: Vec<Product>,
    orders: Vec<Order>,
    next_customer_id: i64,
    next_product_id: i64,
    next_order_id: i64,
}

/// In-memory entity store.
///
/// Keeps all records in insertion order behind a single `RwLock` and
/// provides the same interface as the PostgreSQL implementation. Used by
/// tests and the default binary.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.inner.read().await.orders.len()
    }

    /// Clears all records.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        *inner = Inner::default();
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn create_customer(&self, new: NewCustomer) -> Result<Customer> {
        let mut inner = self.inner.write().await;
        inner.next_customer_id += 1;
        let customer = Customer {
            id: CustomerId::new(inner.next_customer_id),
            name: new.name,
            email: new.email,
        };
        inner.customers.push(customer.clone());
        Ok(customer)
    }

    async fn find_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let inner = self.inner.read().await;
        Ok(inner.customers.iter().find(|c| c.id == id).cloned())
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn create_product(&self, new: NewProduct) -> Result<Product> {
        if new.name.trim().is_empty() {
            return Err(StoreError::Integrity("product name must not be blank".into()));
        }
        if !new.price.is_positive() {
            return Err(StoreError::Integrity(format!(
                "product price must be positive, got {}",
                new.price
            )));
        }

        let mut inner = self.inner.write().await;
        inner.next_product_id += 1;
        let product = Product {
            id: ProductId::new(inner.next_product_id),
            name: new.name,
            price: new.price,
        };
        inner.products.push(product.clone());
        Ok(product)
    }

    async fn find_products(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let inner = self.inner.read().await;
        let mut found = Vec::new();
        for id in ids {
            if found.iter().any(|p: &Product| p.id == *id) {
                continue;
            }
            if let Some(product) = inner.products.iter().find(|p| p.id == *id) {
                found.push(product.clone());
            }
        }
        Ok(found)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create_order(&self, new: NewOrder) -> Result<Order> {
        let mut inner = self.inner.write().await;

        if !inner.customers.iter().any(|c| c.id == new.customer_id) {
            return Err(StoreError::Integrity(format!(
                "order references missing customer {}",
                new.customer_id
            )));
        }
        for product_id in &new.product_ids {
            if !inner.products.iter().any(|p| p.id == *product_id) {
                return Err(StoreError::Integrity(format!(
                    "order references missing product {product_id}"
                )));
            }
        }

        inner.next_order_id += 1;
        let order = Order {
            id: OrderId::new(inner.next_order_id),
            status: new.status,
            created_at: new.created_at,
            customer_id: new.customer_id,
            product_ids: new.product_ids,
        };
        inner.orders.push(order.clone());
        Ok(order)
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>> {
        let inner = self.inner.read().await;
        Ok(inner.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn find_orders_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let inner = self.inner.read().await;
        Ok(inner
            .orders
            .iter()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<bool> {
        let mut inner = self.inner.write().await;
        match inner
            .orders
            .iter_mut()
            .find(|o| o.id == id && o.status == expected)
        {
            Some(order) => {
                order.status = next;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use common::Money;

    use super::*;

    async fn seeded_store() -> (MemoryStore, Customer, Product, Product) {
        let store = MemoryStore::new();
        let customer = store
            .create_customer(NewCustomer::new("Alice", "alice@example.com"))
            .await
            .unwrap();
        let laptop = store
            .create_product(NewProduct::new("Laptop", Money::from_cents(120_000)))
            .await
            .unwrap();
        let phone = store
            .create_product(NewProduct::new("Smartphone", Money::from_cents(80_000)))
            .await
            .unwrap();
        (store, customer, laptop, phone)
    }

    fn new_order(customer_id: CustomerId, product_ids: Vec<ProductId>) -> NewOrder {
        NewOrder {
            status: OrderStatus::Created,
            created_at: Utc::now(),
            customer_id,
            product_ids,
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_monotonically() {
        let (store, customer, laptop, phone) = seeded_store().await;
        assert_eq!(customer.id, CustomerId::new(1));
        assert_eq!(laptop.id, ProductId::new(1));
        assert_eq!(phone.id, ProductId::new(2));

        let first = store
            .create_order(new_order(customer.id, vec![laptop.id]))
            .await
            .unwrap();
        let second = store
            .create_order(new_order(customer.id, vec![phone.id]))
            .await
            .unwrap();
        assert_eq!(first.id, OrderId::new(1));
        assert_eq!(second.id, OrderId::new(2));
    }

    #[tokio::test]
    async fn blank_product_name_is_rejected() {
        let store = MemoryStore::new();
        let err = store
            .create_product(NewProduct::new("  ", Money::from_cents(100)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Integrity(_)));
    }

    #[tokio::test]
    async fn non_positive_price_is_rejected() {
        let store = MemoryStore::new();
        let err = store
            .create_product(NewProduct::new("Freebie", Money::from_cents(0)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Integrity(_)));
    }

    #[tokio::test]
    async fn order_with_dangling_customer_is_rejected() {
        let (store, _, laptop, _) = seeded_store().await;
        let err = store
            .create_order(new_order(CustomerId::new(999), vec![laptop.id]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Integrity(_)));
    }

    #[tokio::test]
    async fn order_with_dangling_product_is_rejected() {
        let (store, customer, _, _) = seeded_store().await;
        let err = store
            .create_order(new_order(customer.id, vec![ProductId::new(999)]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Integrity(_)));
    }

    #[tokio::test]
    async fn bulk_product_lookup_returns_matches_only() {
        let (store, _, laptop, phone) = seeded_store().await;
        let found = store
            .find_products(&[laptop.id, ProductId::new(999), phone.id])
            .await
            .unwrap();
        assert_eq!(found, vec![laptop, phone]);
    }

    #[tokio::test]
    async fn bulk_product_lookup_deduplicates() {
        let (store, _, laptop, _) = seeded_store().await;
        let found = store
            .find_products(&[laptop.id, laptop.id, laptop.id])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn orders_by_customer_preserve_insertion_order() {
        let (store, customer, laptop, phone) = seeded_store().await;
        let other = store
            .create_customer(NewCustomer::new("Bob", "bob@example.com"))
            .await
            .unwrap();

        let first = store
            .create_order(new_order(customer.id, vec![laptop.id]))
            .await
            .unwrap();
        store
            .create_order(new_order(other.id, vec![phone.id]))
            .await
            .unwrap();
        let third = store
            .create_order(new_order(customer.id, vec![phone.id]))
            .await
            .unwrap();

        let orders = store.find_orders_by_customer(customer.id).await.unwrap();
        let ids: Vec<_> = orders.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![first.id, third.id]);
    }

    #[tokio::test]
    async fn orders_by_unknown_customer_is_empty() {
        let (store, _, _, _) = seeded_store().await;
        let orders = store
            .find_orders_by_customer(CustomerId::new(42))
            .await
            .unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn conditional_update_applies_once() {
        let (store, customer, laptop, _) = seeded_store().await;
        let order = store
            .create_order(new_order(customer.id, vec![laptop.id]))
            .await
            .unwrap();

        let updated = store
            .update_status(order.id, OrderStatus::Created, OrderStatus::Paid)
            .await
            .unwrap();
        assert!(updated);

        // A second caller expecting CREATED loses the race.
        let updated = store
            .update_status(order.id, OrderStatus::Created, OrderStatus::Paid)
            .await
            .unwrap();
        assert!(!updated);

        let order = store.find_order(order.id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn conditional_update_on_missing_order_affects_nothing() {
        let (store, _, _, _) = seeded_store().await;
        let updated = store
            .update_status(OrderId::new(999), OrderStatus::Created, OrderStatus::Paid)
            .await
            .unwrap();
        assert!(!updated);
    }
}
