//! Persistence port for the Order aggregate

use async_trait::async_trait;
use thiserror::Error;
use crate::domain::aggregates::{Order, OrderError};
use crate::domain::value_objects::OrderId;

/// Durable storage for orders.
///
/// `save` consumes the order and returns the stored value. An id-less order is
/// inserted and comes back carrying its new identifier; an order that already
/// has one replaces its stored status and item snapshot. `find_by_id` returns
/// `Ok(None)` for an unknown id, never an error.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn save(&self, order: Order) -> Result<Order, StorageError>;
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StorageError>;
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("stored order {id} is corrupt: {reason}")]
    Corrupt { id: i64, reason: String },
    #[error("order {id} cannot be stored: {reason}")]
    Unrepresentable { id: i64, reason: String },
    #[error("order {0} does not exist in storage")]
    Missing(OrderId),
    #[error("repository returned an order without an id")]
    IdentityNotAssigned,
    #[error(transparent)]
    Identity(#[from] OrderError),
}
