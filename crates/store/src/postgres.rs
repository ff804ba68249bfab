use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use common::{CustomerId, Money, OrderId, OrderStatus, ProductId};

use crate::{
    Customer, NewCustomer, NewOrder, NewProduct, Order, Product, Result, StoreError,
    store::{CustomerStore, OrderStore, ProductStore},
};

/// PostgreSQL-backed entity store.
///
/// Records live in `customers`, `products` and `orders`, with the
/// order-to-product association in the `orders_product` join table.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: &PgRow, product_ids: Vec<ProductId>) -> Result<Order> {
        let status_text: String = row.try_get("status")?;
        let status = OrderStatus::parse(&status_text).ok_or_else(|| {
            StoreError::Integrity(format!("unknown order status {status_text:?} in store"))
        })?;

        Ok(Order {
            id: OrderId::new(row.try_get("id")?),
            status,
            created_at: row.try_get("created_at")?,
            customer_id: CustomerId::new(row.try_get("customer_id")?),
            product_ids,
        })
    }

    async fn product_ids_for_order(&self, order_id: OrderId) -> Result<Vec<ProductId>> {
        let rows = sqlx::query(
            "SELECT product_id FROM orders_product WHERE order_id = $1 ORDER BY product_id",
        )
        .bind(order_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Ok(ProductId::new(row.try_get("product_id")?)))
            .collect()
    }
}

/// Translates constraint violations into integrity errors, leaving other
/// database failures untouched.
fn map_db_err(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e {
        use sqlx::error::ErrorKind;
        if matches!(
            db_err.kind(),
            ErrorKind::ForeignKeyViolation | ErrorKind::CheckViolation | ErrorKind::NotNullViolation
        ) {
            return StoreError::Integrity(db_err.message().to_string());
        }
    }
    StoreError::Database(e)
}

#[async_trait]
impl CustomerStore for PostgresStore {
    async fn create_customer(&self, new: NewCustomer) -> Result<Customer> {
        let row = sqlx::query("INSERT INTO customers (name, email) VALUES ($1, $2) RETURNING id")
            .bind(&new.name)
            .bind(&new.email)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_err)?;

        Ok(Customer {
            id: CustomerId::new(row.try_get("id")?),
            name: new.name,
            email: new.email,
        })
    }

    async fn find_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let row = sqlx::query("SELECT id, name, email FROM customers WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            Ok(Customer {
                id: CustomerId::new(row.try_get("id")?),
                name: row.try_get("name")?,
                email: row.try_get("email")?,
            })
        })
        .transpose()
    }
}

#[async_trait]
impl ProductStore for PostgresStore {
    async fn create_product(&self, new: NewProduct) -> Result<Product> {
        let row =
            sqlx::query("INSERT INTO products (name, price_cents) VALUES ($1, $2) RETURNING id")
                .bind(&new.name)
                .bind(new.price.cents())
                .fetch_one(&self.pool)
                .await
                .map_err(map_db_err)?;

        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            name: new.name,
            price: new.price,
        })
    }

    async fn find_products(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        let raw_ids: Vec<i64> = ids.iter().map(|id| id.as_i64()).collect();
        let rows = sqlx::query(
            "SELECT id, name, price_cents FROM products WHERE id = ANY($1) ORDER BY id",
        )
        .bind(&raw_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(Product {
                    id: ProductId::new(row.try_get("id")?),
                    name: row.try_get("name")?,
                    price: Money::from_cents(row.try_get("price_cents")?),
                })
            })
            .collect()
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn create_order(&self, new: NewOrder) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO orders (status, created_at, customer_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(new.status.as_str())
        .bind(new.created_at)
        .bind(new.customer_id.as_i64())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_err)?;

        let order_id = OrderId::new(row.try_get("id")?);

        for product_id in &new.product_ids {
            sqlx::query(
                r#"
                INSERT INTO orders_product (order_id, product_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(order_id.as_i64())
            .bind(product_id.as_i64())
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        }

        tx.commit().await?;

        Ok(Order {
            id: order_id,
            status: new.status,
            created_at: new.created_at,
            customer_id: new.customer_id,
            product_ids: new.product_ids,
        })
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(
            "SELECT id, status, created_at, customer_id FROM orders WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let product_ids = self.product_ids_for_order(id).await?;
                Ok(Some(Self::row_to_order(&row, product_ids)?))
            }
            None => Ok(None),
        }
    }

    async fn find_orders_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, status, created_at, customer_id
            FROM orders
            WHERE customer_id = $1
            ORDER BY id
            "#,
        )
        .bind(customer_id.as_i64())
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            let order_id = OrderId::new(row.try_get("id")?);
            let product_ids = self.product_ids_for_order(order_id).await?;
            orders.push(Self::row_to_order(row, product_ids)?);
        }
        Ok(orders)
    }

    async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2 AND status = $3")
            .bind(next.as_str())
            .bind(id.as_i64())
            .bind(expected.as_str())
            .execute(&self.pool)
            .await?;

        tracing::debug!(
            %id,
            from = %expected,
            to = %next,
            affected = result.rows_affected(),
            "conditional status update"
        );
        Ok(result.rows_affected() > 0)
    }
}
