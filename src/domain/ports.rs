use uuid::Uuid;

use super::errors::DomainError;
use super::order::{FinalizedOrder, LineItem, ListResult, OrderCreatedEvent, OrderRecord, PricedOrder};
use super::product::{Category, Product, ProductFilter, ProductPage};

pub trait CatalogStore: Send + Sync + 'static {
    fn find_product(&self, id: i64) -> Result<Option<Product>, DomainError>;
    fn list_products(
        &self,
        filter: &ProductFilter,
        page: i64,
        limit: i64,
    ) -> Result<ProductPage, DomainError>;
    fn list_categories(&self) -> Result<Vec<Category>, DomainError>;
}

/// Writes available inside one order-placement transaction.
pub trait OrderTransaction {
    /// Insert the order row with status `PENDING`.
    fn create_order(&mut self, order: &PricedOrder) -> Result<OrderRecord, DomainError>;
    /// `position` is the line's index in the cart; lines read back in that order.
    fn attach_line(
        &mut self,
        order_id: Uuid,
        position: i32,
        line: &LineItem,
    ) -> Result<(), DomainError>;
    /// Decrement only if at least `amount` units are left, otherwise
    /// [`DomainError::ConcurrentModification`].
    fn decrement_stock(&mut self, product_id: i64, amount: i32) -> Result<(), DomainError>;
    /// Stage the event in the outbox; it commits or rolls back with the order.
    fn record_event(&mut self, event: &OrderCreatedEvent) -> Result<(), DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Run `work` atomically: commit when it returns `Ok`, roll back every
    /// write it made when it returns `Err`.
    fn transaction<T, F>(&self, work: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn OrderTransaction) -> Result<T, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<FinalizedOrder>, DomainError>;
    fn list(
        &self,
        customer_id: Option<Uuid>,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError>;
}

/// Receives "order created" events after commit, for best-effort side
/// effects such as the confirmation mail. Implementations must not block on
/// delivery.
pub trait EventSink: Send + Sync + 'static {
    fn publish(&self, event: OrderCreatedEvent) -> Result<(), DomainError>;
}
