//! Order management domain
pub mod value_objects;
pub mod aggregates;
pub mod events;
pub mod repository;

pub use aggregates::{LineItem, LineItemError, Order, OrderError, OrderStatus};
pub use events::OrderEvent;
pub use repository::{OrderRepository, StorageError};
pub use value_objects::{Money, MoneyError, OrderId, DEFAULT_CURRENCY};
