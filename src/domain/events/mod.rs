//! Domain events
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    ItemAdded { product_id: i64, quantity: u32 },
    Confirmed { item_count: usize },
    Cancelled,
}

impl OrderEvent {
    /// Suffix used when routing the event to a subject or topic.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ItemAdded { .. } => "item_added",
            Self::Confirmed { .. } => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}
