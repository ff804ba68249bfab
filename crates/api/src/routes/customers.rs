//! Customer-scoped order listing.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::CustomerId;
use domain::OrderView;
use store::EntityStore;

use crate::error::ApiError;
use crate::routes::orders::AppState;

/// GET /customers/:id/orders — list all orders owned by a customer.
///
/// A customer with no orders (or an unknown customer id) yields an empty
/// array, never an error.
#[tracing::instrument(skip(state))]
pub async fn orders<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<OrderView>>, ApiError> {
    let views = state
        .order_service
        .orders_for_customer(CustomerId::new(id))
        .await?;
    Ok(Json(views))
}
