//! HTTP API

use std::sync::Arc;
use axum::{extract::{Path, State}, http::StatusCode, response::{IntoResponse, Response}, routing::{get, post}, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use validator::Validate;
use crate::application::{EventPublisher, NewOrderItem, OrderCancellationService, OrderCreationService};
use crate::domain::{LineItem, Money, MoneyError, Order, OrderError, OrderId, OrderRepository, OrderStatus};
use crate::OrdersError;

#[derive(Clone)]
pub struct AppState {
    pub creation: Arc<OrderCreationService>,
    pub cancellation: Arc<OrderCancellationService>,
    pub repository: Arc<dyn OrderRepository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn OrderRepository>, publisher: Arc<dyn EventPublisher>, currency: &str) -> Result<Self, MoneyError> {
        Ok(Self {
            creation: Arc::new(OrderCreationService::new(repository.clone(), publisher.clone(), currency)?),
            cancellation: Arc::new(OrderCancellationService::new(repository.clone(), publisher)),
            repository,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "opensase-orders"})) }))
        .route("/api/v1/orders", post(create_order))
        .route("/api/v1/orders/:id", get(get_order))
        .route("/api/v1/orders/:id/cancel", post(cancel_order))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 500))]
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Serialize)] pub struct CreatedResponse { pub id: OrderId }

#[derive(Debug, Serialize)]
pub struct OrderView {
    pub id: Option<OrderId>, pub status: OrderStatus, pub currency: String, pub created_at: DateTime<Utc>,
    pub items: Vec<LineItemView>, pub total: Money,
}

#[derive(Debug, Serialize)]
pub struct LineItemView { pub product_id: i64, pub description: String, pub quantity: u32, pub unit_price: Money, pub subtotal: Money }

impl From<&LineItem> for LineItemView {
    fn from(i: &LineItem) -> Self {
        Self { product_id: i.product_id(), description: i.description().to_string(), quantity: i.quantity(), unit_price: i.unit_price().clone(), subtotal: i.subtotal() }
    }
}

impl OrderView {
    pub fn try_from_order(order: &Order) -> Result<Self, OrderError> {
        Ok(Self {
            id: order.id(), status: order.status(), currency: order.currency().to_string(), created_at: order.created_at(),
            items: order.items().iter().map(LineItemView::from).collect(), total: order.total()?,
        })
    }
}

async fn create_order(State(s): State<AppState>, Json(r): Json<CreateOrderRequest>) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    r.validate()?;
    let id = s.creation.handle(r.items).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

async fn get_order(State(s): State<AppState>, Path(id): Path<i64>) -> Result<Json<OrderView>, ApiError> {
    let id = OrderId::new(id);
    let order = s.repository.find_by_id(id).await.map_err(OrdersError::from)?.ok_or(OrdersError::OrderNotFound(id))?;
    Ok(Json(OrderView::try_from_order(&order).map_err(OrdersError::from)?))
}

async fn cancel_order(State(s): State<AppState>, Path(id): Path<i64>) -> Result<Json<OrderView>, ApiError> {
    let order = s.cancellation.handle(OrderId::new(id)).await?;
    Ok(Json(OrderView::try_from_order(&order).map_err(OrdersError::from)?))
}

#[derive(Debug)]
pub enum ApiError {
    Validation(validator::ValidationErrors),
    Orders(OrdersError),
}

impl From<validator::ValidationErrors> for ApiError { fn from(e: validator::ValidationErrors) -> Self { Self::Validation(e) } }
impl From<OrdersError> for ApiError { fn from(e: OrdersError) -> Self { Self::Orders(e) } }

fn status_for(e: &OrdersError) -> StatusCode {
    match e {
        OrdersError::Money(_) | OrdersError::LineItem(_) | OrdersError::Order(OrderError::Money(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        OrdersError::Order(OrderError::NotEditable(_) | OrderError::InvalidTransition { .. }) => StatusCode::CONFLICT,
        OrdersError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        OrdersError::Order(OrderError::IdentityAlreadyAssigned(_)) | OrdersError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::Orders(e) => {
                let status = status_for(&e);
                if status.is_server_error() { tracing::error!(error = %e, "request failed"); }
                (status, e.to_string())
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}
