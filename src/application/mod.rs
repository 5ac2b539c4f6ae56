//! Application services
pub mod publisher;
pub mod service;

pub use publisher::{EventEnvelope, EventPublisher};
pub use service::{NewOrderItem, OrderCancellationService, OrderCreationService};
