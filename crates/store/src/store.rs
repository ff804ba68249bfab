use async_trait::async_trait;
use common::{CustomerId, OrderId, OrderStatus, ProductId};

use crate::{Customer, NewCustomer, NewOrder, NewProduct, Order, Product, Result};

/// Store contract for customer records.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Persists a new customer and returns it with its assigned id.
    async fn create_customer(&self, new: NewCustomer) -> Result<Customer>;

    /// Looks up a customer by id. `None` when absent.
    async fn find_customer(&self, id: CustomerId) -> Result<Option<Customer>>;
}

/// Store contract for product records.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Persists a new product and returns it with its assigned id.
    ///
    /// Fails with an integrity error when the name is blank or the price
    /// is not strictly positive.
    async fn create_product(&self, new: NewProduct) -> Result<Product>;

    /// Bulk lookup by id. Returns only the matching records, ordered by
    /// first occurrence in the input; ids with no matching record are
    /// simply absent from the result, never an error.
    async fn find_products(&self, ids: &[ProductId]) -> Result<Vec<Product>>;
}

/// Convenience bound for stores implementing all three contracts.
pub trait EntityStore: CustomerStore + ProductStore + OrderStore {}

impl<T: CustomerStore + ProductStore + OrderStore> EntityStore for T {}

/// Store contract for order records.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order (including its product reference set) and
    /// returns it with its assigned id.
    ///
    /// Fails with an integrity error when a referenced customer or product
    /// does not exist.
    async fn create_order(&self, new: NewOrder) -> Result<Order>;

    /// Looks up an order by id. `None` when absent.
    async fn find_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Returns all orders owned by the given customer, in insertion order.
    /// A customer with no orders yields an empty list.
    async fn find_orders_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>>;

    /// Conditionally advances an order's status in a single store
    /// operation: the status is set to `next` only if the order currently
    /// has status `expected`.
    ///
    /// Returns `true` when a row was updated and `false` when no row
    /// matched both id and expected status. Expressing the transition as
    /// one conditional write lets two racing callers resolve to exactly
    /// one winner without locks.
    async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<bool>;
}
