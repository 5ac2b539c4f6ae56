//! Order event publishers

use async_trait::async_trait;
use crate::application::{EventEnvelope, EventPublisher};

/// Publishes envelopes as JSON on `<prefix>.<event name>`.
#[derive(Clone)]
pub struct NatsEventPublisher { client: async_nats::Client, prefix: String }

impl NatsEventPublisher {
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let client = async_nats::connect(url).await?;
        Ok(Self::new(client, "orders"))
    }

    pub fn new(client: async_nats::Client, prefix: impl Into<String>) -> Self { Self { client, prefix: prefix.into() } }
}

pub(crate) fn subject(prefix: &str, envelope: &EventEnvelope) -> String { format!("{}.{}", prefix, envelope.event.name()) }

#[async_trait]
impl EventPublisher for NatsEventPublisher {
    async fn publish(&self, envelope: &EventEnvelope) -> anyhow::Result<()> {
        let payload = serde_json::to_vec(envelope)?;
        self.client.publish(subject(&self.prefix, envelope), payload.into()).await?;
        Ok(())
    }
}

/// Writes events to the log when no broker is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogEventPublisher;

#[async_trait]
impl EventPublisher for LogEventPublisher {
    async fn publish(&self, envelope: &EventEnvelope) -> anyhow::Result<()> {
        tracing::info!(order_id = %envelope.order_id, event = envelope.event.name(), event_id = %envelope.event_id, "order event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderEvent, OrderId};

    #[test]
    fn test_subject_and_payload() {
        let envelope = EventEnvelope::new(OrderId::new(5), OrderEvent::Confirmed { item_count: 2 });
        assert_eq!(subject("orders", &envelope), "orders.confirmed");

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["order_id"], 5);
        assert_eq!(json["type"], "confirmed");
        assert_eq!(json["item_count"], 2);
    }

    #[tokio::test]
    async fn test_log_publisher_never_fails() {
        let envelope = EventEnvelope::new(OrderId::new(1), OrderEvent::Cancelled);
        assert!(LogEventPublisher.publish(&envelope).await.is_ok());
    }
}
