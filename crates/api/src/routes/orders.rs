//! Order creation, lookup and lifecycle-advance endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{CustomerId, OrderId, ProductId};
use domain::{OrderService, OrderView};
use serde::Deserialize;
use store::EntityStore;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: EntityStore> {
    pub order_service: OrderService<S>,
}

/// POST /orders request body.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateOrderRequest {
    pub customer_id: CustomerId,
    pub products_id: Vec<ProductId>,
    /// Placement timestamp; defaults to the time of the request. Must not
    /// lie in the future.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// POST /orders — assemble and persist a new order.
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Json<OrderView>, ApiError> {
    let Json(req) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

    let created_at = req.created_at.unwrap_or_else(Utc::now);
    let view = state
        .order_service
        .create_order(req.customer_id, req.products_id, created_at)
        .await?;

    Ok(Json(view))
}

/// GET /orders/:id — load an order projection by id.
#[tracing::instrument(skip(state))]
pub async fn get<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<OrderView>, ApiError> {
    let view = state.order_service.get_order(OrderId::new(id)).await?;
    Ok(Json(view))
}

/// PATCH /orders/:id/pay — advance an order to PAID.
#[tracing::instrument(skip(state))]
pub async fn pay<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.order_service.pay(OrderId::new(id)).await?;
    Ok(StatusCode::OK)
}

/// PATCH /orders/:id/ship — advance an order to SHIPPED.
#[tracing::instrument(skip(state))]
pub async fn ship<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.order_service.ship(OrderId::new(id)).await?;
    Ok(StatusCode::OK)
}

/// PATCH /orders/:id/deliver — advance an order to DELIVERED.
#[tracing::instrument(skip(state))]
pub async fn deliver<S: EntityStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.order_service.deliver(OrderId::new(id)).await?;
    Ok(StatusCode::OK)
}
