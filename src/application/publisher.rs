//! Outbound port for order events

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use crate::domain::{OrderEvent, OrderId};

/// An order event stamped with the order it belongs to.
#[derive(Clone, Debug, Serialize)]
pub struct EventEnvelope {
    pub event_id: Uuid,
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: OrderEvent,
}

impl EventEnvelope {
    pub fn new(order_id: OrderId, event: OrderEvent) -> Self {
        Self { event_id: Uuid::now_v7(), order_id, occurred_at: Utc::now(), event }
    }
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, envelope: &EventEnvelope) -> anyhow::Result<()>;
}
