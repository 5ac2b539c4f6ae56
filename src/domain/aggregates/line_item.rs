//! Line item entity

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use crate::domain::value_objects::{Money, MoneyError};

/// A product, a positive quantity and its unit price. Read-only once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LineItem {
    product_id: i64,
    description: String,
    quantity: u32,
    unit_price: Money,
    #[serde(skip)]
    subtotal: Money,
}

impl LineItem {
    pub fn new(product_id: i64, description: impl Into<String>, quantity: i64, unit_price: Money) -> Result<Self, LineItemError> {
        if quantity <= 0 { return Err(LineItemError::InvalidQuantity(quantity)); }
        let quantity = u32::try_from(quantity).map_err(|_| LineItemError::InvalidQuantity(quantity))?;
        if product_id <= 0 { return Err(LineItemError::InvalidProductId(product_id)); }
        let description = description.into();
        if description.trim().is_empty() { return Err(LineItemError::EmptyDescription); }
        let subtotal = unit_price.multiply(Decimal::from(quantity))?;
        Ok(Self { product_id, description, quantity, unit_price, subtotal })
    }

    pub fn product_id(&self) -> i64 { self.product_id }
    pub fn description(&self) -> &str { &self.description }
    pub fn quantity(&self) -> u32 { self.quantity }
    pub fn unit_price(&self) -> &Money { &self.unit_price }
    pub fn subtotal(&self) -> Money { self.subtotal.clone() }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineItemError {
    #[error("quantity must be greater than zero, got {0}")]
    InvalidQuantity(i64),
    #[error("product id must be positive, got {0}")]
    InvalidProductId(i64),
    #[error("description cannot be empty")]
    EmptyDescription,
    #[error("subtotal: {0}")]
    Money(#[from] MoneyError),
}
