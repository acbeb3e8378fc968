use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::OrderCreatedEvent;

use super::models::NewOutboxEventRow;

pub const AGGREGATE_TYPE: &str = "Order";
pub const ORDER_CREATED: &str = "OrderCreated";

/// Build the `commerce_order_outbox` row for an event. The row is inserted
/// in the order's own transaction; CDC (Debezium's EventRouter SMT) derives
/// the Kafka topic from `aggregate_type`.
pub fn outbox_row(event: &OrderCreatedEvent) -> Result<NewOutboxEventRow, DomainError> {
    let payload = serde_json::to_value(event)
        .map_err(|e| DomainError::Persistence(format!("cannot encode event: {}", e)))?;

    Ok(NewOutboxEventRow {
        id: Uuid::new_v4(),
        aggregate_type: AGGREGATE_TYPE.to_string(),
        aggregate_id: event.order_id.to_string(),
        event_type: ORDER_CREATED.to_string(),
        payload,
    })
}
