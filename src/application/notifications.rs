//! Asynchronous fan-out of "order created" events.
//!
//! [`ChannelEventSink`] only enqueues; a background task hands each event to
//! the listeners registered when the sink was spawned. Listener failures are
//! logged and dropped.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::errors::DomainError;
use crate::domain::order::OrderCreatedEvent;
use crate::domain::ports::EventSink;

pub trait OrderCreatedListener: Send + Sync + 'static {
    fn name(&self) -> &'static str;
    fn handle(&self, event: &OrderCreatedEvent) -> Result<(), DomainError>;
}

/// Sends the customer an order confirmation.
///
/// No mail transport is configured, so the confirmation is written to the log.
pub struct ConfirmationEmailListener;

impl OrderCreatedListener for ConfirmationEmailListener {
    fn name(&self) -> &'static str {
        "confirmation-email"
    }

    fn handle(&self, event: &OrderCreatedEvent) -> Result<(), DomainError> {
        log::info!(
            "Order confirmation for customer {}: order {} ({} line(s), total {})",
            event.customer_id,
            event.order_id,
            event.lines.len(),
            event.totals.total_amount
        );
        Ok(())
    }
}

type Listeners = Arc<Vec<Box<dyn OrderCreatedListener>>>;

#[derive(Clone)]
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<OrderCreatedEvent>,
}

impl ChannelEventSink {
    /// Start the dispatch task. Must be called from within a Tokio runtime.
    ///
    /// The task ends once every clone of the returned sink has been dropped.
    pub fn spawn(listeners: Vec<Box<dyn OrderCreatedListener>>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<OrderCreatedEvent>();
        let listeners: Listeners = Arc::new(listeners);

        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let listeners = Arc::clone(&listeners);
                let order_id = event.order_id;
                // Listeners may do blocking I/O.
                let joined =
                    tokio::task::spawn_blocking(move || dispatch(&listeners, &event)).await;
                if let Err(e) = joined {
                    log::error!("Listener task for order {} panicked: {}", order_id, e);
                }
            }
            log::debug!("Order event channel closed");
        });

        (Self { tx }, handle)
    }
}

fn dispatch(listeners: &[Box<dyn OrderCreatedListener>], event: &OrderCreatedEvent) {
    for listener in listeners {
        if let Err(e) = listener.handle(event) {
            log::warn!(
                "Listener {} failed for order {}: {}",
                listener.name(),
                event.order_id,
                e
            );
        }
    }
}

impl EventSink for ChannelEventSink {
    fn publish(&self, event: OrderCreatedEvent) -> Result<(), DomainError> {
        self.tx
            .send(event)
            .map_err(|e| DomainError::Notification(format!("event channel closed: {}", e)))
    }
}
