//! Order application services

use std::sync::Arc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use crate::application::publisher::{EventEnvelope, EventPublisher};
use crate::domain::value_objects::normalize_currency;
use crate::domain::{LineItem, Money, MoneyError, Order, OrderEvent, OrderId, OrderRepository, StorageError};
use crate::{OrdersError, Result};

/// Raw item data as received from a caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub description: String,
    pub quantity: i64,
    pub unit_price: Decimal,
}

/// Builds, confirms and stores a new order in one step.
pub struct OrderCreationService {
    repository: Arc<dyn OrderRepository>,
    publisher: Arc<dyn EventPublisher>,
    currency: String,
}

impl OrderCreationService {
    pub fn new(repository: Arc<dyn OrderRepository>, publisher: Arc<dyn EventPublisher>, currency: &str) -> std::result::Result<Self, MoneyError> {
        Ok(Self { repository, publisher, currency: normalize_currency(currency)? })
    }

    pub fn currency(&self) -> &str { &self.currency }

    /// Any invalid item aborts the whole request before anything is saved.
    #[tracing::instrument(skip_all, fields(items = items.len()))]
    pub async fn handle(&self, items: Vec<NewOrderItem>) -> Result<OrderId> {
        let mut order = Order::with_currency(&self.currency)?;
        for raw in items {
            let price = Money::new(raw.unit_price, &self.currency)?;
            order.add_item(LineItem::new(raw.product_id, raw.description, raw.quantity, price)?)?;
        }
        order.confirm()?;

        let events = order.take_events();
        let order = self.repository.save(order).await?;
        let id = order.id().ok_or(StorageError::IdentityNotAssigned)?;
        info!(order_id = %id, items = order.item_count(), "order created");

        publish_all(self.publisher.as_ref(), id, events).await;
        Ok(id)
    }
}

/// Cancels a stored order.
pub struct OrderCancellationService {
    repository: Arc<dyn OrderRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl OrderCancellationService {
    pub fn new(repository: Arc<dyn OrderRepository>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { repository, publisher }
    }

    #[tracing::instrument(skip(self))]
    pub async fn handle(&self, id: OrderId) -> Result<Order> {
        let mut order = self.repository.find_by_id(id).await?.ok_or(OrdersError::OrderNotFound(id))?;
        order.cancel()?;

        let events = order.take_events();
        let order = self.repository.save(order).await?;
        info!(order_id = %id, "order cancelled");

        publish_all(self.publisher.as_ref(), id, events).await;
        Ok(order)
    }
}

// The order is already durable here, so a failed publish is only logged.
async fn publish_all(publisher: &dyn EventPublisher, id: OrderId, events: Vec<OrderEvent>) {
    for event in events {
        let envelope = EventEnvelope::new(id, event);
        if let Err(e) = publisher.publish(&envelope).await {
            warn!(order_id = %id, event = envelope.event.name(), error = %e, "failed to publish order event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LineItemError, OrderError, OrderStatus};
    use crate::infrastructure::InMemoryOrderRepository;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingPublisher { seen: Mutex<Vec<EventEnvelope>>, fail: bool }

    #[async_trait]
    impl EventPublisher for RecordingPublisher {
        async fn publish(&self, envelope: &EventEnvelope) -> anyhow::Result<()> {
            if self.fail { anyhow::bail!("broker down"); }
            self.seen.lock().await.push(envelope.clone());
            Ok(())
        }
    }

    fn raw(product_id: i64, quantity: i64, price: i64) -> NewOrderItem {
        NewOrderItem { product_id, description: format!("Produto {product_id}"), quantity, unit_price: Decimal::new(price, 0) }
    }

    fn setup() -> (Arc<InMemoryOrderRepository>, Arc<RecordingPublisher>, OrderCreationService) {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let publisher = Arc::new(RecordingPublisher::default());
        let service = OrderCreationService::new(repo.clone(), publisher.clone(), "BRL").unwrap();
        (repo, publisher, service)
    }

    #[tokio::test]
    async fn test_create_order_end_to_end() {
        let (repo, publisher, service) = setup();
        let id = service.handle(vec![raw(1, 2, 50), raw(2, 1, 100)]).await.unwrap();

        let stored = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Confirmed);
        assert_eq!(stored.total().unwrap(), Money::new(Decimal::new(200, 0), "BRL").unwrap());
        assert_eq!(stored.item_count(), 2);

        let seen = publisher.seen.lock().await;
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|e| e.order_id == id));
        assert_eq!(seen[2].event, OrderEvent::Confirmed { item_count: 2 });
    }

    #[tokio::test]
    async fn test_invalid_item_persists_nothing() {
        let (repo, publisher, service) = setup();
        let err = service.handle(vec![raw(1, 2, 50), raw(2, 0, 100)]).await.unwrap_err();
        assert!(matches!(err, OrdersError::LineItem(LineItemError::InvalidQuantity(0))));

        let err = service.handle(vec![raw(1, 1, -5)]).await.unwrap_err();
        assert!(matches!(err, OrdersError::Money(MoneyError::InvalidAmount(_))));

        assert_eq!(repo.len().await, 0);
        assert!(publisher.seen.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_fail_creation() {
        let repo = Arc::new(InMemoryOrderRepository::new());
        let publisher = Arc::new(RecordingPublisher { fail: true, ..Default::default() });
        let service = OrderCreationService::new(repo.clone(), publisher, "BRL").unwrap();
        let id = service.handle(vec![raw(1, 1, 10)]).await.unwrap();
        assert!(repo.find_by_id(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_cancel_stored_order() {
        let (repo, publisher, service) = setup();
        let id = service.handle(vec![raw(1, 1, 10)]).await.unwrap();
        let cancellation = OrderCancellationService::new(repo.clone(), publisher.clone());

        let order = cancellation.handle(id).await.unwrap();
        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert_eq!(repo.find_by_id(id).await.unwrap().unwrap().status(), OrderStatus::Cancelled);
        assert_eq!(publisher.seen.lock().await.last().map(|e| e.event.clone()), Some(OrderEvent::Cancelled));

        let err = cancellation.handle(id).await.unwrap_err();
        assert!(matches!(err, OrdersError::Order(OrderError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_cancel_unknown_order() {
        let (repo, publisher, _) = setup();
        let cancellation = OrderCancellationService::new(repo, publisher);
        let err = cancellation.handle(OrderId::new(99)).await.unwrap_err();
        assert!(matches!(err, OrdersError::OrderNotFound(id) if id == OrderId::new(99)));
    }
}
