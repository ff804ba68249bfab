//! Order service: assembly, lifecycle engine and read-side lookups.

use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, OrderStatus, ProductId};
use store::{CustomerStore, NewOrder, OrderStore, ProductStore};

use crate::{OrderError, OrderView};

/// Service for managing orders.
///
/// Generic over the store so tests can run against [`store::MemoryStore`]
/// and deployments against [`store::PostgresStore`]. The store is passed in
/// at construction; the service holds no other state.
pub struct OrderService<S> {
    store: S,
}

impl<S> OrderService<S>
where
    S: CustomerStore + ProductStore + OrderStore,
{
    /// Creates a new order service backed by the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Assembles and persists a new order in `CREATED` status.
    ///
    /// Validates before any write: the product set must be non-empty, the
    /// timestamp must not lie in the future, and every referenced customer
    /// and product must resolve to an existing record. Duplicate product
    /// ids are collapsed (set semantics).
    #[tracing::instrument(skip(self))]
    pub async fn create_order(
        &self,
        customer_id: CustomerId,
        product_ids: Vec<ProductId>,
        created_at: DateTime<Utc>,
    ) -> Result<OrderView, OrderError> {
        if product_ids.is_empty() {
            return Err(OrderError::EmptyProducts);
        }
        if created_at > Utc::now() {
            return Err(OrderError::CreatedAtInFuture(created_at));
        }

        self.store
            .find_customer(customer_id)
            .await?
            .ok_or(OrderError::CustomerNotFound(customer_id))?;

        let products = self.store.find_products(&product_ids).await?;
        let missing: Vec<ProductId> = product_ids
            .iter()
            .filter(|id| !products.iter().any(|p| p.id == **id))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(OrderError::ProductsNotFound { missing });
        }

        let order = self
            .store
            .create_order(NewOrder {
                status: OrderStatus::Created,
                created_at,
                customer_id,
                product_ids: products.into_iter().map(|p| p.id).collect(),
            })
            .await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %order.id, %customer_id, "order created");

        Ok(order.into())
    }

    /// Advances an order from `CREATED` to `PAID`.
    ///
    /// Fails with [`OrderError::EmptyProducts`] if the order's product set
    /// is empty, before the status precondition is checked.
    #[tracing::instrument(skip(self))]
    pub async fn pay(&self, order_id: OrderId) -> Result<(), OrderError> {
        let order = self
            .store
            .find_order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;

        if order.product_ids.is_empty() {
            return Err(OrderError::EmptyProducts);
        }
        if !order.status.can_pay() {
            return Err(OrderError::InvalidTransition {
                current: order.status,
                action: "pay",
            });
        }

        self.advance(order_id, "pay", OrderStatus::Created, OrderStatus::Paid)
            .await
    }

    /// Advances an order from `PAID` to `SHIPPED`.
    #[tracing::instrument(skip(self))]
    pub async fn ship(&self, order_id: OrderId) -> Result<(), OrderError> {
        let order = self
            .store
            .find_order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;

        if !order.status.can_ship() {
            return Err(OrderError::InvalidTransition {
                current: order.status,
                action: "ship",
            });
        }

        self.advance(order_id, "ship", OrderStatus::Paid, OrderStatus::Shipped)
            .await
    }

    /// Advances an order from `SHIPPED` to `DELIVERED`.
    #[tracing::instrument(skip(self))]
    pub async fn deliver(&self, order_id: OrderId) -> Result<(), OrderError> {
        let order = self
            .store
            .find_order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;

        if !order.status.can_deliver() {
            return Err(OrderError::InvalidTransition {
                current: order.status,
                action: "deliver",
            });
        }

        self.advance(
            order_id,
            "deliver",
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        )
        .await
    }

    /// Issues the conditional status write for a transition whose
    /// precondition already passed.
    ///
    /// The store only applies the write when the order still holds
    /// `expected`, so a caller that loses a race observes zero rows
    /// affected and reports the status the order holds by then.
    async fn advance(
        &self,
        order_id: OrderId,
        action: &'static str,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<(), OrderError> {
        if self.store.update_status(order_id, expected, next).await? {
            metrics::counter!("order_transitions_total", "to" => next.as_str()).increment(1);
            tracing::info!(%order_id, from = %expected, to = %next, "order status advanced");
            return Ok(());
        }

        let current = self
            .store
            .find_order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?
            .status;
        Err(OrderError::InvalidTransition { current, action })
    }

    /// Loads an order projection by id.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<OrderView, OrderError> {
        let order = self
            .store
            .find_order(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        Ok(order.into())
    }

    /// Returns projections of all orders owned by a customer, in store
    /// insertion order. A customer with no orders yields an empty list.
    #[tracing::instrument(skip(self))]
    pub async fn orders_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<OrderView>, OrderError> {
        let orders = self.store.find_orders_by_customer(customer_id).await?;
        Ok(orders.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Duration;
    use common::Money;
    use store::{MemoryStore, NewCustomer, NewProduct};

    use super::*;

    struct Fixture {
        service: OrderService<MemoryStore>,
        store: MemoryStore,
        customer: CustomerId,
        products: Vec<ProductId>,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let customer = store
            .create_customer(NewCustomer::new("Alice", "alice@example.com"))
            .await
            .unwrap()
            .id;
        let mut products = Vec::new();
        for (name, cents) in [
            ("Laptop", 120_000),
            ("Smartphone", 80_000),
            ("Headphones", 15_000),
        ] {
            let product = store
                .create_product(NewProduct::new(name, Money::from_cents(cents)))
                .await
                .unwrap();
            products.push(product.id);
        }
        Fixture {
            service: OrderService::new(store.clone()),
            store,
            customer,
            products,
        }
    }

    fn past() -> DateTime<Utc> {
        Utc::now() - Duration::hours(1)
    }

    #[tokio::test]
    async fn create_order_starts_in_created_status() {
        let fx = fixture().await;
        let view = fx
            .service
            .create_order(fx.customer, fx.products.clone(), past())
            .await
            .unwrap();

        assert_eq!(view.status, OrderStatus::Created);
        assert_eq!(view.customer_id, fx.customer);
    }

    #[tokio::test]
    async fn create_order_with_empty_products_writes_nothing() {
        let fx = fixture().await;
        let err = fx
            .service
            .create_order(fx.customer, vec![], past())
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::EmptyProducts));
        assert_eq!(fx.store.order_count().await, 0);
    }

    #[tokio::test]
    async fn create_order_with_future_timestamp_is_rejected() {
        let fx = fixture().await;
        let err = fx
            .service
            .create_order(
                fx.customer,
                fx.products.clone(),
                Utc::now() + Duration::hours(1),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::CreatedAtInFuture(_)));
        assert_eq!(fx.store.order_count().await, 0);
    }

    #[tokio::test]
    async fn create_order_with_unknown_customer_writes_nothing() {
        let fx = fixture().await;
        let err = fx
            .service
            .create_order(CustomerId::new(999), fx.products.clone(), past())
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::CustomerNotFound(id) if id == CustomerId::new(999)));
        assert_eq!(fx.store.order_count().await, 0);
    }

    #[tokio::test]
    async fn create_order_rejects_unresolved_product_ids() {
        let fx = fixture().await;
        let err = fx
            .service
            .create_order(
                fx.customer,
                vec![fx.products[0], ProductId::new(777), ProductId::new(888)],
                past(),
            )
            .await
            .unwrap_err();

        match err {
            OrderError::ProductsNotFound { missing } => {
                assert_eq!(missing, vec![ProductId::new(777), ProductId::new(888)]);
            }
            other => panic!("expected ProductsNotFound, got {other:?}"),
        }
        assert_eq!(fx.store.order_count().await, 0);
    }

    #[tokio::test]
    async fn created_order_round_trips_its_product_set() {
        let fx = fixture().await;
        fx.service
            .create_order(fx.customer, fx.products.clone(), past())
            .await
            .unwrap();

        let view = fx.service.get_order(OrderId::new(1)).await.unwrap();
        let got: BTreeSet<_> = view.products_id.into_iter().collect();
        let want: BTreeSet<_> = fx.products.iter().copied().collect();
        assert_eq!(got, want);
    }

    #[tokio::test]
    async fn full_lifecycle_walk() {
        let fx = fixture().await;
        fx.service
            .create_order(fx.customer, fx.products.clone(), past())
            .await
            .unwrap();
        let id = OrderId::new(1);

        fx.service.pay(id).await.unwrap();
        assert_eq!(
            fx.service.get_order(id).await.unwrap().status,
            OrderStatus::Paid
        );

        fx.service.ship(id).await.unwrap();
        assert_eq!(
            fx.service.get_order(id).await.unwrap().status,
            OrderStatus::Shipped
        );

        fx.service.deliver(id).await.unwrap();
        assert_eq!(
            fx.service.get_order(id).await.unwrap().status,
            OrderStatus::Delivered
        );
    }

    #[tokio::test]
    async fn paying_twice_fails_and_leaves_status_unchanged() {
        let fx = fixture().await;
        fx.service
            .create_order(fx.customer, vec![fx.products[0], fx.products[1]], past())
            .await
            .unwrap();
        let id = OrderId::new(1);

        fx.service.pay(id).await.unwrap();
        let err = fx.service.pay(id).await.unwrap_err();

        assert!(matches!(
            err,
            OrderError::InvalidTransition {
                current: OrderStatus::Paid,
                action: "pay",
            }
        ));
        assert_eq!(
            fx.service.get_order(id).await.unwrap().status,
            OrderStatus::Paid
        );
    }

    #[tokio::test]
    async fn shipping_an_unpaid_order_is_rejected() {
        let fx = fixture().await;
        fx.service
            .create_order(fx.customer, fx.products.clone(), past())
            .await
            .unwrap();

        let err = fx.service.ship(OrderId::new(1)).await.unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidTransition {
                current: OrderStatus::Created,
                action: "ship",
            }
        ));
    }

    #[tokio::test]
    async fn delivering_an_unshipped_order_is_rejected() {
        let fx = fixture().await;
        fx.service
            .create_order(fx.customer, fx.products.clone(), past())
            .await
            .unwrap();
        let id = OrderId::new(1);
        fx.service.pay(id).await.unwrap();

        let err = fx.service.deliver(id).await.unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidTransition {
                current: OrderStatus::Paid,
                action: "deliver",
            }
        ));
    }

    #[tokio::test]
    async fn transitions_on_missing_orders_are_not_found() {
        let fx = fixture().await;
        let missing = OrderId::new(999);

        for result in [
            fx.service.pay(missing).await,
            fx.service.ship(missing).await,
            fx.service.deliver(missing).await,
        ] {
            assert!(matches!(
                result.unwrap_err(),
                OrderError::OrderNotFound(id) if id == missing
            ));
        }
    }

    #[tokio::test]
    async fn fetching_a_missing_order_is_not_found() {
        let fx = fixture().await;
        let err = fx.service.get_order(OrderId::new(999)).await.unwrap_err();
        assert!(matches!(err, OrderError::OrderNotFound(_)));
    }

    #[tokio::test]
    async fn customer_with_no_orders_gets_an_empty_list() {
        let fx = fixture().await;
        let views = fx
            .service
            .orders_for_customer(CustomerId::new(424242))
            .await
            .unwrap();
        assert!(views.is_empty());
    }

    #[tokio::test]
    async fn orders_for_customer_lists_only_their_orders() {
        let fx = fixture().await;
        let bob = fx
            .store
            .create_customer(NewCustomer::new("Bob", "bob@example.com"))
            .await
            .unwrap()
            .id;

        fx.service
            .create_order(fx.customer, vec![fx.products[0]], past())
            .await
            .unwrap();
        fx.service
            .create_order(bob, vec![fx.products[1]], past())
            .await
            .unwrap();
        fx.service
            .create_order(fx.customer, vec![fx.products[2]], past())
            .await
            .unwrap();

        let views = fx.service.orders_for_customer(fx.customer).await.unwrap();
        assert_eq!(views.len(), 2);
        assert!(views.iter().all(|v| v.customer_id == fx.customer));
    }

    #[tokio::test]
    async fn duplicate_product_ids_collapse_to_a_set() {
        let fx = fixture().await;
        let view = fx
            .service
            .create_order(
                fx.customer,
                vec![fx.products[0], fx.products[0], fx.products[1]],
                past(),
            )
            .await
            .unwrap();

        assert_eq!(view.products_id, vec![fx.products[0], fx.products[1]]);
    }
}
