//! Aggregates module
pub mod status;
pub mod line_item;
pub mod order;

pub use status::{OrderStatus, UnknownStatus};
pub use line_item::{LineItem, LineItemError};
pub use order::{Order, OrderError};
