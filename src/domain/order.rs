use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

/// One `{product_id, quantity}` entry of a submitted cart. Prices are never
/// taken from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub customer_id: Uuid,
    pub lines: Vec<CartLine>,
}

impl OrderRequest {
    pub fn new(customer_id: Uuid, lines: Vec<CartLine>) -> Self {
        Self { customer_id, lines }
    }
}

/// A cart line resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineItem {
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub line_total: BigDecimal,
}

impl LineItem {
    pub fn new(product_id: i64, quantity: i32, unit_price: BigDecimal) -> Self {
        let line_total = &unit_price * BigDecimal::from(quantity);
        Self {
            product_id,
            quantity,
            unit_price,
            line_total,
        }
    }
}

/// Output of the validator: every line exists, is active and is in stock.
#[derive(Debug, Clone)]
pub struct ValidatedOrder {
    pub customer_id: Uuid,
    pub lines: Vec<LineItem>,
}

/// Monetary totals of an order.
///
/// `total_amount == subtotal + shipping_total + tax_total - discount_total`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub subtotal: BigDecimal,
    pub shipping_total: BigDecimal,
    pub tax_total: BigDecimal,
    pub discount_total: BigDecimal,
    pub total_amount: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub customer_id: Uuid,
    pub lines: Vec<LineItem>,
    pub totals: Totals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "PROCESSING" => Ok(OrderStatus::Processing),
            "COMPLETED" => Ok(OrderStatus::Completed),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::Persistence(format!(
                "unknown order status '{}'",
                other
            ))),
        }
    }
}

/// What the transaction boundary hands back after inserting the order row.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedOrder {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub lines: Vec<LineItem>,
    pub totals: Totals,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FinalizedOrder {
    pub fn from_parts(record: OrderRecord, priced: PricedOrder) -> Self {
        Self {
            id: record.id,
            customer_id: record.customer_id,
            status: record.status,
            lines: priced.lines,
            totals: priced.totals,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub total_amount: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<OrderSummary>,
    pub total: i64,
}

/// Published once an order has been committed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderCreatedEvent {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub lines: Vec<LineItem>,
    pub totals: Totals,
    pub created_at: DateTime<Utc>,
}

impl From<&FinalizedOrder> for OrderCreatedEvent {
    fn from(order: &FinalizedOrder) -> Self {
        Self {
            order_id: order.id,
            customer_id: order.customer_id,
            status: order.status,
            lines: order.lines.clone(),
            totals: order.totals.clone(),
            created_at: order.created_at,
        }
    }
}
