//! Postgres order repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use crate::domain::{LineItem, Money, Order, OrderId, OrderRepository, OrderStatus, StorageError};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow { id: i64, status: String, currency: String, created_at: DateTime<Utc> }

#[derive(Debug, sqlx::FromRow)]
struct ItemRow { product_id: i64, description: String, quantity: i64, unit_price: Decimal }

#[derive(Clone)]
pub struct PgOrderRepository { pool: PgPool }

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    /// Connects and brings the schema up to date.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new().max_connections(max_connections).connect(url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self::new(pool))
    }

    async fn insert_items(tx: &mut Transaction<'_, Postgres>, id: i64, order: &Order) -> Result<(), StorageError> {
        for (position, item) in order.items().iter().enumerate() {
            sqlx::query("INSERT INTO order_items (order_id, position, product_id, description, quantity, unit_price) VALUES ($1, $2, $3, $4, $5, $6)")
                .bind(id).bind(item_position(id, position)?).bind(item.product_id()).bind(item.description())
                .bind(i64::from(item.quantity())).bind(item.unit_price().amount())
                .execute(&mut **tx).await?;
        }
        Ok(())
    }
}

fn item_position(id: i64, position: usize) -> Result<i32, StorageError> {
    i32::try_from(position).map_err(|_| StorageError::Unrepresentable { id, reason: format!("item position {position} exceeds column range") })
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn save(&self, order: Order) -> Result<Order, StorageError> {
        let mut tx = self.pool.begin().await?;
        let order = match order.id() {
            None => {
                let id: i64 = sqlx::query_scalar("INSERT INTO orders (status, currency, created_at) VALUES ($1, $2, $3) RETURNING id")
                    .bind(order.status().as_str()).bind(order.currency()).bind(order.created_at())
                    .fetch_one(&mut *tx).await?;
                order.into_persisted(OrderId::new(id))?
            }
            Some(id) => {
                let updated = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
                    .bind(id.value()).bind(order.status().as_str())
                    .execute(&mut *tx).await?;
                if updated.rows_affected() == 0 { return Err(StorageError::Missing(id)); }
                sqlx::query("DELETE FROM order_items WHERE order_id = $1").bind(id.value()).execute(&mut *tx).await?;
                order
            }
        };
        let id = order.id().ok_or(StorageError::IdentityNotAssigned)?;
        Self::insert_items(&mut tx, id.value(), &order).await?;
        tx.commit().await?;
        tracing::debug!(order_id = %id, status = %order.status(), items = order.item_count(), "order saved");
        Ok(order)
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StorageError> {
        let Some(row) = sqlx::query_as::<_, OrderRow>("SELECT id, status, currency, created_at FROM orders WHERE id = $1")
            .bind(id.value()).fetch_optional(&self.pool).await? else { return Ok(None) };
        let items = sqlx::query_as::<_, ItemRow>("SELECT product_id, description, quantity, unit_price FROM order_items WHERE order_id = $1 ORDER BY position")
            .bind(id.value()).fetch_all(&self.pool).await?;

        let corrupt = |reason: String| StorageError::Corrupt { id: row.id, reason };
        let status = row.status.parse::<OrderStatus>().map_err(|e| corrupt(e.to_string()))?;
        let items = items.into_iter().map(|i| {
            let price = Money::new(i.unit_price, &row.currency).map_err(|e| corrupt(e.to_string()))?;
            LineItem::new(i.product_id, i.description, i.quantity, price).map_err(|e| corrupt(e.to_string()))
        }).collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Order::restore(OrderId::new(row.id), row.currency.clone(), status, row.created_at, items)))
    }
}
