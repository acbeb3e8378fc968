//! Order placement against the in-memory store: reference scenarios,
//! atomicity of the persistence step and stock safety under contention.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use storefront_orders::application::order_service::OrderService;
use storefront_orders::domain::errors::{DomainError, OrderRejection};
use storefront_orders::domain::order::{
    CartLine, FinalizedOrder, LineItem, ListResult, OrderCreatedEvent, OrderRecord, OrderRequest,
    PricedOrder,
};
use storefront_orders::domain::ports::{EventSink, OrderRepository, OrderTransaction};
use storefront_orders::domain::pricing::Rates;
use storefront_orders::infrastructure::memory::{InMemoryStore, RecordingEventSink};
use uuid::Uuid;

fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).expect("valid decimal")
}

fn rates() -> Rates {
    Rates {
        shipping_cost: dec("5.00"),
        tax_rate: dec("0.1"),
        discount_rate: dec("0.05"),
    }
}

fn cart(lines: &[(i64, i32)]) -> OrderRequest {
    OrderRequest::new(
        Uuid::new_v4(),
        lines
            .iter()
            .map(|&(product_id, quantity)| CartLine {
                product_id,
                quantity,
            })
            .collect(),
    )
}

fn seeded_store() -> InMemoryStore {
    let store = InMemoryStore::default();
    store.insert_product(1, "Notebook", dec("10.00"), 5, true);
    store.insert_product(2, "Fountain pen", dec("24.50"), 3, true);
    store
}

// ── Fault injection ──────────────────────────────────────────────────────────

/// Fails the `fail_at`-th `attach_line` call (0-based) of every transaction.
struct FailingRepository {
    inner: InMemoryStore,
    fail_at: usize,
}

struct FaultyTransaction<'a> {
    inner: &'a mut dyn OrderTransaction,
    attached: usize,
    fail_at: usize,
}

impl OrderTransaction for FaultyTransaction<'_> {
    fn create_order(&mut self, order: &PricedOrder) -> Result<OrderRecord, DomainError> {
        self.inner.create_order(order)
    }

    fn attach_line(
        &mut self,
        order_id: Uuid,
        position: i32,
        line: &LineItem,
    ) -> Result<(), DomainError> {
        if self.attached == self.fail_at {
            return Err(DomainError::Persistence("disk full".to_string()));
        }
        self.attached += 1;
        self.inner.attach_line(order_id, position, line)
    }

    fn decrement_stock(&mut self, product_id: i64, amount: i32) -> Result<(), DomainError> {
        self.inner.decrement_stock(product_id, amount)
    }

    fn record_event(&mut self, event: &OrderCreatedEvent) -> Result<(), DomainError> {
        self.inner.record_event(event)
    }
}

impl OrderRepository for FailingRepository {
    fn transaction<T, F>(&self, work: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn OrderTransaction) -> Result<T, DomainError>,
    {
        let fail_at = self.fail_at;
        self.inner.transaction(move |tx| {
            work(&mut FaultyTransaction {
                inner: tx,
                attached: 0,
                fail_at,
            })
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<FinalizedOrder>, DomainError> {
        self.inner.find_by_id(id)
    }

    fn list(
        &self,
        customer_id: Option<Uuid>,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError> {
        self.inner.list(customer_id, page, limit)
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[test]
fn reference_order_is_priced_persisted_and_deducted() {
    let store = seeded_store();
    let events = RecordingEventSink::default();
    let service = OrderService::new(store.clone(), store.clone(), events.clone(), rates());

    let order = service.place_order(cart(&[(1, 2)])).expect("order should be placed");

    assert_eq!(order.totals.subtotal, dec("20.00"));
    assert_eq!(order.totals.shipping_total, dec("5.00"));
    assert_eq!(order.totals.tax_total, dec("2.00"));
    assert_eq!(order.totals.discount_total, dec("1.00"));
    assert_eq!(order.totals.total_amount, dec("26.00"));
    assert_eq!(order.lines[0].unit_price, dec("10.00"));
    assert_eq!(order.lines[0].line_total, dec("20.00"));
    assert_eq!(store.stock_of(1), Some(3));
    assert_eq!(events.events().len(), 1);
    assert_eq!(store.outbox().len(), 1);
    assert_eq!(store.outbox()[0].order_id, order.id);
}

#[test]
fn empty_cart_is_rejected_without_side_effects() {
    let store = seeded_store();
    let events = RecordingEventSink::default();
    let service = OrderService::new(store.clone(), store.clone(), events.clone(), rates());

    let err = service.place_order(cart(&[])).unwrap_err();

    assert!(matches!(err, DomainError::Rejected(OrderRejection::EmptyCart)));
    assert_eq!(store.order_count(), 0);
    assert!(events.events().is_empty());
}

#[test]
fn nonexistent_product_is_rejected_without_side_effects() {
    let store = seeded_store();
    let service = OrderService::new(
        store.clone(),
        store.clone(),
        RecordingEventSink::default(),
        rates(),
    );

    let err = service.place_order(cart(&[(1, 1), (999, 1)])).unwrap_err();

    assert!(matches!(
        err,
        DomainError::Rejected(OrderRejection::ProductNotFound { product_id: 999 })
    ));
    assert_eq!(store.order_count(), 0);
    assert_eq!(store.stock_of(1), Some(5));
}

#[test]
fn insufficient_stock_is_rejected() {
    let store = seeded_store();
    let service = OrderService::new(
        store.clone(),
        store.clone(),
        RecordingEventSink::default(),
        rates(),
    );

    let err = service.place_order(cart(&[(2, 4)])).unwrap_err();

    assert!(matches!(
        err,
        DomainError::Rejected(OrderRejection::InsufficientStock {
            product_id: 2,
            requested: 4,
            available: 3
        })
    ));
    assert_eq!(store.stock_of(2), Some(3));
}

#[test]
fn multi_line_order_reads_back_identically() {
    let store = seeded_store();
    let service = OrderService::new(
        store.clone(),
        store.clone(),
        RecordingEventSink::default(),
        rates(),
    );

    let placed = service.place_order(cart(&[(1, 1), (2, 2)])).unwrap();
    let loaded = service.get_order(placed.id).unwrap();

    assert_eq!(loaded, placed);
    let products: Vec<i64> = loaded.lines.iter().map(|l| l.product_id).collect();
    assert_eq!(products, vec![1, 2]);
    assert_eq!(loaded.totals.subtotal, dec("59.00"));
    assert_eq!(store.stock_of(1), Some(4));
    assert_eq!(store.stock_of(2), Some(1));
}

#[test]
fn failure_before_the_last_line_commits_nothing() {
    let store = seeded_store();
    let events = RecordingEventSink::default();
    let repo = FailingRepository {
        inner: store.clone(),
        fail_at: 1,
    };
    let service = OrderService::new(store.clone(), repo, events.clone(), rates());

    let err = service.place_order(cart(&[(1, 2), (2, 1)])).unwrap_err();

    assert!(matches!(err, DomainError::Persistence(_)));
    assert_eq!(store.order_count(), 0, "no order row may survive");
    assert_eq!(store.stock_of(1), Some(5), "first line's deduction rolled back");
    assert_eq!(store.stock_of(2), Some(3));
    assert!(events.events().is_empty(), "nothing is published for a failed order");
    assert!(store.outbox().is_empty(), "outbox entry rolled back with the order");
}

#[test]
fn failing_mailer_still_leaves_the_outbox_entry() {
    struct DownMailer;

    impl EventSink for DownMailer {
        fn publish(&self, _event: OrderCreatedEvent) -> Result<(), DomainError> {
            Err(DomainError::Notification("pool timed out".to_string()))
        }
    }

    let store = seeded_store();
    let service = OrderService::new(store.clone(), store.clone(), DownMailer, rates());

    let order = service.place_order(cart(&[(1, 1)])).expect("order should be placed");

    let outbox = store.outbox();
    assert_eq!(outbox.len(), 1, "committed order must reach the outbox");
    assert_eq!(outbox[0].order_id, order.id);
}

#[test]
fn concurrent_orders_never_oversell() {
    let store = InMemoryStore::default();
    store.insert_product(1, "Limited print", dec("40.00"), 5, true);
    let service = OrderService::new(
        store.clone(),
        store.clone(),
        RecordingEventSink::default(),
        rates(),
    );

    let results: Vec<Result<FinalizedOrder, DomainError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..20)
            .map(|_| scope.spawn(|| service.place_order(cart(&[(1, 1)]))))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("worker panicked"))
            .collect()
    });

    let placed = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(placed, 5);
    assert_eq!(store.stock_of(1), Some(0));
    assert_eq!(store.order_count(), 5);
    assert_eq!(store.outbox().len(), 5);
    for err in results.into_iter().filter_map(Result::err) {
        assert!(matches!(
            err,
            DomainError::Rejected(OrderRejection::InsufficientStock { .. })
                | DomainError::ConcurrentModification { product_id: 1 }
        ));
    }
}

#[test]
fn orders_are_listed_per_customer() {
    let store = seeded_store();
    let service = OrderService::new(
        store.clone(),
        store.clone(),
        RecordingEventSink::default(),
        rates(),
    );
    let request = cart(&[(1, 1)]);
    let customer_id = request.customer_id;

    service.place_order(request).unwrap();
    service.place_order(cart(&[(2, 1)])).unwrap();

    let mine = service.list_orders(Some(customer_id), 1, 20).unwrap();
    assert_eq!(mine.total, 1);
    assert_eq!(mine.items[0].customer_id, customer_id);
    assert_eq!(mine.items[0].total_amount, dec("15.50"));

    assert_eq!(service.list_orders(None, 1, 20).unwrap().total, 2);
}
