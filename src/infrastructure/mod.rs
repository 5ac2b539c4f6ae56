//! Infrastructure adapters
pub mod events;
pub mod memory;
pub mod postgres;

pub use events::{LogEventPublisher, NatsEventPublisher};
pub use memory::InMemoryOrderRepository;
pub use postgres::PgOrderRepository;
