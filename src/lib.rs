//! OpenSASE Orders
//!
//! Order management core with currency-safe totals.
//!
//! ## Features
//! - Money value object with currency-checked arithmetic
//! - Order aggregate with a draft / confirmed / cancelled lifecycle
//! - Order creation and cancellation services over a repository port
//! - Postgres and in-memory repositories
//! - Order events published to NATS
//! - HTTP API

pub mod application;
pub mod config;
pub mod domain;
pub mod http;
pub mod infrastructure;

use thiserror::Error;
use domain::{LineItemError, MoneyError, OrderError, OrderId, StorageError};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum OrdersError {
    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error(transparent)]
    LineItem(#[from] LineItemError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, OrdersError>;
