//! Order Aggregate
//!
//! An order collects line items while it is a draft. Confirming or cancelling
//! freezes the item list; cancelled orders accept no further transition.
//! The identifier is absent until a repository persists the order for the
//! first time and hands back a new value carrying it.

use chrono::{DateTime, SubsecRound, Utc};
use thiserror::Error;
use crate::domain::aggregates::{LineItem, OrderStatus};
use crate::domain::events::OrderEvent;
use crate::domain::value_objects::{normalize_currency, Money, MoneyError, OrderId, DEFAULT_CURRENCY};

/// Only repositories in this crate attach identifiers or rebuild stored orders:
///
/// ```compile_fail
/// use opensase_orders::domain::{Order, OrderId};
/// let order = Order::new().into_persisted(OrderId::new(1));
/// ```
///
/// ```compile_fail
/// use opensase_orders::domain::{Order, OrderId, OrderStatus};
/// let order = Order::restore(OrderId::new(1), "BRL".into(), OrderStatus::Confirmed, chrono::Utc::now(), vec![]);
/// ```
#[derive(Clone, Debug)]
pub struct Order {
    id: Option<OrderId>,
    currency: String,
    items: Vec<LineItem>,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    events: Vec<OrderEvent>,
}

impl Order {
    pub fn new() -> Self {
        Self {
            id: None, currency: DEFAULT_CURRENCY.to_string(), items: vec![],
            status: OrderStatus::Draft, created_at: Utc::now().trunc_subsecs(6), events: vec![],
        }
    }

    pub fn with_currency(currency: &str) -> Result<Self, MoneyError> {
        let mut order = Self::new();
        order.currency = normalize_currency(currency)?;
        Ok(order)
    }

    /// Rebuilds a stored order. Used by repositories; records no events.
    pub(crate) fn restore(id: OrderId, currency: String, status: OrderStatus, created_at: DateTime<Utc>, items: Vec<LineItem>) -> Self {
        Self { id: Some(id), currency, items, status, created_at, events: vec![] }
    }

    /// Returns this order carrying the identifier its first save produced.
    pub(crate) fn into_persisted(self, id: OrderId) -> Result<Self, OrderError> {
        if let Some(existing) = self.id { return Err(OrderError::IdentityAlreadyAssigned(existing)); }
        Ok(Self { id: Some(id), ..self })
    }

    pub fn id(&self) -> Option<OrderId> { self.id }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn items(&self) -> &[LineItem] { &self.items }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn add_item(&mut self, item: LineItem) -> Result<(), OrderError> {
        if !self.status.can_be_modified() { return Err(OrderError::NotEditable(self.status)); }
        self.raise_event(OrderEvent::ItemAdded { product_id: item.product_id(), quantity: item.quantity() });
        self.items.push(item);
        Ok(())
    }

    pub fn confirm(&mut self) -> Result<(), OrderError> {
        if !self.status.can_be_confirmed() {
            return Err(OrderError::InvalidTransition { from: self.status, to: OrderStatus::Confirmed });
        }
        self.status = OrderStatus::Confirmed;
        self.raise_event(OrderEvent::Confirmed { item_count: self.items.len() });
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if !self.status.can_be_cancelled() {
            return Err(OrderError::InvalidTransition { from: self.status, to: OrderStatus::Cancelled });
        }
        self.status = OrderStatus::Cancelled;
        self.raise_event(OrderEvent::Cancelled);
        Ok(())
    }

    /// Sum of every item subtotal in the order's working currency.
    ///
    /// The working currency is the first item's; an empty order totals zero in
    /// the currency it was created with. Mixed currencies are rejected.
    pub fn total(&self) -> Result<Money, OrderError> {
        let currency = self.items.first().map_or(self.currency.as_str(), |i| i.unit_price().currency());
        let total = self.items.iter().try_fold(Money::zero(currency)?, |acc, i| acc.add(&i.subtotal()))?;
        Ok(total)
    }

    pub fn take_events(&mut self) -> Vec<OrderEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: OrderEvent) { self.events.push(e); }
}

impl Default for Order { fn default() -> Self { Self::new() } }

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("order cannot be modified while {0}")]
    NotEditable(OrderStatus),
    #[error("order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("order already has id {0}")]
    IdentityAlreadyAssigned(OrderId),
    #[error(transparent)]
    Money(#[from] MoneyError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn price(amount: i64, currency: &str) -> Money { Money::new(Decimal::new(amount, 0), currency).unwrap() }
    fn item(product_id: i64, qty: i64, amount: i64) -> LineItem {
        LineItem::new(product_id, format!("Product {product_id}"), qty, price(amount, "BRL")).unwrap()
    }

    #[test]
    fn test_new_order_is_draft_without_id() {
        let order = Order::new();
        assert_eq!(order.status(), OrderStatus::Draft);
        assert_eq!(order.id(), None);
        assert!(order.is_empty());
        assert_eq!(order.total().unwrap(), price(0, "BRL"));
    }

    #[test]
    fn test_total() {
        let mut order = Order::new();
        order.add_item(item(1, 2, 50)).unwrap();
        order.add_item(item(2, 1, 100)).unwrap();
        assert_eq!(order.total().unwrap(), price(200, "BRL"));
        assert_eq!(order.items().iter().map(|i| i.product_id()).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_empty_total_uses_order_currency() {
        let order = Order::with_currency("usd").unwrap();
        assert_eq!(order.total().unwrap(), price(0, "USD"));
    }

    #[test]
    fn test_mixed_currencies_rejected() {
        let mut order = Order::new();
        order.add_item(item(1, 1, 10)).unwrap();
        order.add_item(LineItem::new(2, "B", 1, price(10, "USD")).unwrap()).unwrap();
        assert!(matches!(order.total(), Err(OrderError::Money(MoneyError::CurrencyMismatch { .. }))));
    }

    #[test]
    fn test_confirm_twice_fails() {
        let mut order = Order::new();
        order.confirm().unwrap();
        assert_eq!(order.status(), OrderStatus::Confirmed);
        assert_eq!(
            order.confirm(),
            Err(OrderError::InvalidTransition { from: OrderStatus::Confirmed, to: OrderStatus::Confirmed })
        );
    }

    #[test]
    fn test_cancel_transitions() {
        let mut order = Order::new();
        order.confirm().unwrap();
        order.cancel().unwrap();
        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert!(matches!(order.cancel(), Err(OrderError::InvalidTransition { .. })));
        assert!(matches!(order.confirm(), Err(OrderError::InvalidTransition { .. })));

        let mut draft = Order::new();
        draft.cancel().unwrap();
        assert_eq!(draft.status(), OrderStatus::Cancelled);
    }

    #[test]
    fn test_add_after_confirm_leaves_items_unchanged() {
        let mut order = Order::new();
        order.add_item(item(1, 2, 50)).unwrap();
        order.confirm().unwrap();
        let before = order.items().to_vec();
        assert_eq!(order.add_item(item(2, 1, 100)), Err(OrderError::NotEditable(OrderStatus::Confirmed)));
        assert_eq!(order.items(), before.as_slice());
    }

    #[test]
    fn test_identity_assigned_once() {
        let order = Order::new().into_persisted(OrderId::new(7)).unwrap();
        assert_eq!(order.id(), Some(OrderId::new(7)));
        assert_eq!(order.into_persisted(OrderId::new(8)).unwrap_err(), OrderError::IdentityAlreadyAssigned(OrderId::new(7)));
    }

    #[test]
    fn test_events_drained() {
        let mut order = Order::new();
        order.add_item(item(4, 3, 1)).unwrap();
        order.confirm().unwrap();
        assert_eq!(order.take_events(), vec![
            OrderEvent::ItemAdded { product_id: 4, quantity: 3 },
            OrderEvent::Confirmed { item_count: 1 },
        ]);
        assert!(order.take_events().is_empty());
    }
}
