//! Process-local catalog and order store.
//!
//! Transactions run against a copy of the state while holding the store lock
//! and replace the state only on success, so failed work leaves nothing
//! behind and concurrent placements are serialised.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    FinalizedOrder, LineItem, ListResult, OrderCreatedEvent, OrderRecord, OrderStatus,
    OrderSummary, PricedOrder, Totals,
};
use crate::domain::paging::page_offset;
use crate::domain::ports::{CatalogStore, EventSink, OrderRepository, OrderTransaction};
use crate::domain::product::{Category, Product, ProductFilter, ProductPage};

#[derive(Debug, Clone)]
struct StoredOrder {
    record: OrderRecord,
    totals: Totals,
    lines: BTreeMap<i32, LineItem>,
}

#[derive(Debug, Clone, Default)]
struct State {
    categories: BTreeMap<i64, Category>,
    products: BTreeMap<i64, Product>,
    orders: BTreeMap<Uuid, StoredOrder>,
    outbox: Vec<OrderCreatedEvent>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

fn offset(page: i64, limit: i64) -> usize {
    usize::try_from(page_offset(page, limit)).unwrap_or(usize::MAX)
}

impl InMemoryStore {
    fn lock(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::Persistence("in-memory store lock poisoned".to_string()))
    }

    /// Add or replace a catalog entry.
    pub fn insert_product(&self, id: i64, name: &str, price: BigDecimal, stock: i32, active: bool) {
        if let Ok(mut state) = self.lock() {
            state.products.insert(
                id,
                Product {
                    id,
                    name: name.to_string(),
                    price,
                    stock,
                    active,
                    category_id: None,
                },
            );
        }
    }

    pub fn insert_category(&self, id: i64, name: &str) {
        if let Ok(mut state) = self.lock() {
            state.categories.insert(
                id,
                Category {
                    id,
                    name: name.to_string(),
                },
            );
        }
    }

    pub fn set_product_category(&self, product_id: i64, category_id: Option<i64>) {
        if let Ok(mut state) = self.lock() {
            if let Some(product) = state.products.get_mut(&product_id) {
                product.category_id = category_id;
            }
        }
    }

    /// Events committed to the outbox, oldest first.
    pub fn outbox(&self) -> Vec<OrderCreatedEvent> {
        self.lock().map(|state| state.outbox.clone()).unwrap_or_default()
    }

    pub fn stock_of(&self, product_id: i64) -> Option<i32> {
        self.lock()
            .ok()
            .and_then(|state| state.products.get(&product_id).map(|p| p.stock))
    }

    pub fn order_count(&self) -> usize {
        self.lock().map(|state| state.orders.len()).unwrap_or(0)
    }
}

impl CatalogStore for InMemoryStore {
    fn find_product(&self, id: i64) -> Result<Option<Product>, DomainError> {
        Ok(self.lock()?.products.get(&id).cloned())
    }

    fn list_products(
        &self,
        filter: &ProductFilter,
        page: i64,
        limit: i64,
    ) -> Result<ProductPage, DomainError> {
        let state = self.lock()?;
        let matching: Vec<&Product> = state
            .products
            .values()
            .filter(|p| filter.matches(p))
            .collect();

        Ok(ProductPage {
            total: matching.len() as i64,
            items: matching
                .into_iter()
                .skip(offset(page, limit))
                .take(limit.max(0) as usize)
                .cloned()
                .collect(),
        })
    }

    fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut categories: Vec<Category> = self.lock()?.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories)
    }
}

struct MemoryTransaction<'a> {
    state: &'a mut State,
}

impl OrderTransaction for MemoryTransaction<'_> {
    fn create_order(&mut self, order: &PricedOrder) -> Result<OrderRecord, DomainError> {
        let now = Utc::now();
        let record = OrderRecord {
            id: Uuid::new_v4(),
            customer_id: order.customer_id,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.state.orders.insert(
            record.id,
            StoredOrder {
                record: record.clone(),
                totals: order.totals.clone(),
                lines: BTreeMap::new(),
            },
        );
        Ok(record)
    }

    fn attach_line(
        &mut self,
        order_id: Uuid,
        position: i32,
        line: &LineItem,
    ) -> Result<(), DomainError> {
        let order = self.state.orders.get_mut(&order_id).ok_or_else(|| {
            DomainError::Persistence(format!("order {} does not exist", order_id))
        })?;
        if order.lines.insert(position, line.clone()).is_some() {
            return Err(DomainError::Persistence(format!(
                "order {} already has a line at position {}",
                order_id, position
            )));
        }
        Ok(())
    }

    fn decrement_stock(&mut self, product_id: i64, amount: i32) -> Result<(), DomainError> {
        match self.state.products.get_mut(&product_id) {
            Some(product) if product.stock >= amount => {
                product.stock -= amount;
                Ok(())
            }
            _ => Err(DomainError::ConcurrentModification { product_id }),
        }
    }

    fn record_event(&mut self, event: &OrderCreatedEvent) -> Result<(), DomainError> {
        self.state.outbox.push(event.clone());
        Ok(())
    }
}

impl OrderRepository for InMemoryStore {
    fn transaction<T, F>(&self, work: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn OrderTransaction) -> Result<T, DomainError>,
    {
        let mut state = self.lock()?;
        let mut working = state.clone();
        let value = work(&mut MemoryTransaction {
            state: &mut working,
        })?;
        *state = working;
        Ok(value)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<FinalizedOrder>, DomainError> {
        Ok(self.lock()?.orders.get(&id).map(|stored| FinalizedOrder {
            id: stored.record.id,
            customer_id: stored.record.customer_id,
            status: stored.record.status,
            lines: stored.lines.values().cloned().collect(),
            totals: stored.totals.clone(),
            created_at: stored.record.created_at,
            updated_at: stored.record.updated_at,
        }))
    }

    fn list(
        &self,
        customer_id: Option<Uuid>,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError> {
        let state = self.lock()?;
        let mut matching: Vec<&StoredOrder> = state
            .orders
            .values()
            .filter(|o| customer_id.map_or(true, |c| o.record.customer_id == c))
            .collect();
        matching.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));

        Ok(ListResult {
            total: matching.len() as i64,
            items: matching
                .into_iter()
                .skip(offset(page, limit))
                .take(limit.max(0) as usize)
                .map(|o| OrderSummary {
                    id: o.record.id,
                    customer_id: o.record.customer_id,
                    status: o.record.status,
                    total_amount: o.totals.total_amount.clone(),
                    created_at: o.record.created_at,
                })
                .collect(),
        })
    }
}

/// Keeps every published event; useful when no listener is wired.
#[derive(Debug, Clone, Default)]
pub struct RecordingEventSink {
    events: Arc<Mutex<Vec<OrderCreatedEvent>>>,
}

impl RecordingEventSink {
    pub fn events(&self) -> Vec<OrderCreatedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl EventSink for RecordingEventSink {
    fn publish(&self, event: OrderCreatedEvent) -> Result<(), DomainError> {
        self.events
            .lock()
            .map_err(|_| DomainError::Notification("event log lock poisoned".to_string()))?
            .push(event);
        Ok(())
    }
}
