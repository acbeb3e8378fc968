use uuid::Uuid;

use crate::domain::errors::{DomainError, OrderRejection};
use crate::domain::order::{
    FinalizedOrder, ListResult, OrderCreatedEvent, OrderRequest, PricedOrder, ValidatedOrder,
};
use crate::domain::paging::normalize_paging;
use crate::domain::ports::{CatalogStore, EventSink, OrderRepository};
use crate::domain::pricing::{self, Rates};
use crate::domain::product::{Category, ProductFilter, ProductPage};
use crate::domain::validation;

/// Where an order currently is in the placement pipeline.
#[derive(Debug)]
pub enum Stage {
    Received(OrderRequest),
    Validated(ValidatedOrder),
    Priced(PricedOrder),
    Persisted(FinalizedOrder),
    Completed(FinalizedOrder),
    Rejected(OrderRejection),
    Failed(DomainError),
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Received(_) => "received",
            Stage::Validated(_) => "validated",
            Stage::Priced(_) => "priced",
            Stage::Persisted(_) => "persisted",
            Stage::Completed(_) => "completed",
            Stage::Rejected(_) => "rejected",
            Stage::Failed(_) => "failed",
        }
    }
}

pub struct OrderService<C, R, S> {
    catalog: C,
    repo: R,
    events: S,
    rates: Rates,
}

impl<C: CatalogStore, R: OrderRepository, S: EventSink> OrderService<C, R, S> {
    pub fn new(catalog: C, repo: R, events: S, rates: Rates) -> Self {
        Self {
            catalog,
            repo,
            events,
            rates,
        }
    }

    /// Validate, price, persist and announce an order.
    ///
    /// Validation failures return [`DomainError::Rejected`] before anything is
    /// written. Persistence failures roll the whole transaction back,
    /// including the outbox entry.
    pub fn place_order(&self, request: OrderRequest) -> Result<FinalizedOrder, DomainError> {
        let customer_id = request.customer_id;
        let mut stage = Stage::Received(request);
        loop {
            stage = match stage {
                Stage::Completed(order) => {
                    log::info!(
                        "Placed order {} for customer {} (total {})",
                        order.id,
                        order.customer_id,
                        order.totals.total_amount
                    );
                    return Ok(order);
                }
                Stage::Rejected(reason) => {
                    log::info!("Rejected order for customer {}: {}", customer_id, reason);
                    return Err(reason.into());
                }
                Stage::Failed(err) => {
                    log::warn!("Order placement failed for customer {}: {}", customer_id, err);
                    return Err(err);
                }
                current => {
                    let from = current.name();
                    let next = self.advance(current);
                    log::debug!("Order pipeline {} -> {}", from, next.name());
                    next
                }
            };
        }
    }

    fn advance(&self, stage: Stage) -> Stage {
        match stage {
            Stage::Received(request) => match validation::validate(&request, &self.catalog) {
                Ok(validated) => Stage::Validated(validated),
                Err(DomainError::Rejected(reason)) => Stage::Rejected(reason),
                Err(err) => Stage::Failed(err),
            },
            Stage::Validated(validated) => Stage::Priced(pricing::price(validated, &self.rates)),
            Stage::Priced(priced) => match self.persist(priced) {
                Ok(order) => Stage::Persisted(order),
                Err(err) => Stage::Failed(err),
            },
            Stage::Persisted(order) => {
                self.publish(&order);
                Stage::Completed(order)
            }
            terminal => terminal,
        }
    }

    fn persist(&self, priced: PricedOrder) -> Result<FinalizedOrder, DomainError> {
        self.repo.transaction(move |tx| {
            let record = tx.create_order(&priced)?;
            for (position, line) in (0..).zip(&priced.lines) {
                tx.attach_line(record.id, position, line)?;
                tx.decrement_stock(line.product_id, line.quantity)?;
            }
            let order = FinalizedOrder::from_parts(record, priced);
            tx.record_event(&OrderCreatedEvent::from(&order))?;
            Ok(order)
        })
    }

    fn publish(&self, order: &FinalizedOrder) {
        if let Err(e) = self.events.publish(OrderCreatedEvent::from(order)) {
            log::warn!("Could not publish OrderCreated for order {}: {}", order.id, e);
        }
    }

    pub fn get_order(&self, id: Uuid) -> Result<FinalizedOrder, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound)
    }

    pub fn list_orders(
        &self,
        customer_id: Option<Uuid>,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError> {
        let (page, limit) = normalize_paging(page, limit);
        self.repo.list(customer_id, page, limit)
    }

    pub fn list_products(
        &self,
        filter: &ProductFilter,
        page: i64,
        limit: i64,
    ) -> Result<ProductPage, DomainError> {
        let (page, limit) = normalize_paging(page, limit);
        self.catalog.list_products(filter, page, limit)
    }

    pub fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.catalog.list_categories()
    }
}

/// Object-safe view of the service used by the HTTP layer.
pub trait Storefront: Send + Sync + 'static {
    fn place_order(&self, request: OrderRequest) -> Result<FinalizedOrder, DomainError>;
    fn get_order(&self, id: Uuid) -> Result<FinalizedOrder, DomainError>;
    fn list_orders(
        &self,
        customer_id: Option<Uuid>,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError>;
    fn list_products(
        &self,
        filter: &ProductFilter,
        page: i64,
        limit: i64,
    ) -> Result<ProductPage, DomainError>;
    fn list_categories(&self) -> Result<Vec<Category>, DomainError>;
}

impl<C: CatalogStore, R: OrderRepository, S: EventSink> Storefront for OrderService<C, R, S> {
    fn place_order(&self, request: OrderRequest) -> Result<FinalizedOrder, DomainError> {
        OrderService::place_order(self, request)
    }

    fn get_order(&self, id: Uuid) -> Result<FinalizedOrder, DomainError> {
        OrderService::get_order(self, id)
    }

    fn list_orders(
        &self,
        customer_id: Option<Uuid>,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError> {
        OrderService::list_orders(self, customer_id, page, limit)
    }

    fn list_products(
        &self,
        filter: &ProductFilter,
        page: i64,
        limit: i64,
    ) -> Result<ProductPage, DomainError> {
        OrderService::list_products(self, filter, page, limit)
    }

    fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        OrderService::list_categories(self)
    }
}
