//! In-memory order repository

use std::collections::HashMap;
use async_trait::async_trait;
use tokio::sync::RwLock;
use crate::domain::{Order, OrderId, OrderRepository, StorageError};

/// Keeps order snapshots in a map. Ids are handed out sequentially from 1.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    inner: RwLock<Store>,
}

#[derive(Default)]
struct Store { last_id: i64, orders: HashMap<OrderId, Order> }

impl InMemoryOrderRepository {
    pub fn new() -> Self { Self::default() }
    pub async fn len(&self) -> usize { self.inner.read().await.orders.len() }
    pub async fn is_empty(&self) -> bool { self.len().await == 0 }
}

fn snapshot(order: &Order, id: OrderId) -> Order {
    Order::restore(id, order.currency().to_string(), order.status(), order.created_at(), order.items().to_vec())
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: Order) -> Result<Order, StorageError> {
        let mut store = self.inner.write().await;
        let order = match order.id() {
            Some(id) => {
                if !store.orders.contains_key(&id) { return Err(StorageError::Missing(id)); }
                order
            }
            None => {
                store.last_id += 1;
                let id = OrderId::new(store.last_id);
                order.into_persisted(id)?
            }
        };
        let id = order.id().ok_or(StorageError::IdentityNotAssigned)?;
        store.orders.insert(id, snapshot(&order, id));
        tracing::debug!(order_id = %id, status = %order.status(), "order saved in memory");
        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StorageError> {
        Ok(self.inner.read().await.orders.get(&id).cloned())
    }
}
