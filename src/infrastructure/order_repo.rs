use chrono::Utc;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    FinalizedOrder, LineItem, ListResult, OrderCreatedEvent, OrderRecord, OrderStatus,
    OrderSummary, PricedOrder, Totals,
};
use crate::domain::paging::page_offset;
use crate::domain::ports::{OrderRepository, OrderTransaction};
use crate::schema::{commerce_order_outbox, order_lines, orders, products};

use super::models::{NewOrderLineRow, NewOrderRow, OrderLineRow, OrderRow};
use super::outbox::outbox_row;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Persistence(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Persistence(e.to_string())
    }
}

fn totals_of(row: &OrderRow) -> Totals {
    Totals {
        subtotal: row.subtotal.clone(),
        shipping_total: row.shipping_total.clone(),
        tax_total: row.tax_total.clone(),
        discount_total: row.discount_total.clone(),
        total_amount: row.total_amount.clone(),
    }
}

// ── Transaction ──────────────────────────────────────────────────────────────

struct DieselTransaction<'a> {
    conn: &'a mut PgConnection,
}

impl OrderTransaction for DieselTransaction<'_> {
    fn create_order(&mut self, order: &PricedOrder) -> Result<OrderRecord, DomainError> {
        let row = diesel::insert_into(orders::table)
            .values(&NewOrderRow {
                id: Uuid::new_v4(),
                customer_id: order.customer_id,
                status: OrderStatus::Pending.as_str().to_string(),
                subtotal: order.totals.subtotal.clone(),
                shipping_total: order.totals.shipping_total.clone(),
                tax_total: order.totals.tax_total.clone(),
                discount_total: order.totals.discount_total.clone(),
                total_amount: order.totals.total_amount.clone(),
            })
            .returning(OrderRow::as_returning())
            .get_result(&mut *self.conn)?;

        Ok(OrderRecord {
            id: row.id,
            customer_id: row.customer_id,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn attach_line(
        &mut self,
        order_id: Uuid,
        position: i32,
        line: &LineItem,
    ) -> Result<(), DomainError> {
        diesel::insert_into(order_lines::table)
            .values(&NewOrderLineRow {
                id: Uuid::new_v4(),
                order_id,
                product_id: line.product_id,
                position,
                quantity: line.quantity,
                unit_price: line.unit_price.clone(),
                line_total: line.line_total.clone(),
            })
            .execute(&mut *self.conn)?;
        Ok(())
    }

    fn decrement_stock(&mut self, product_id: i64, amount: i32) -> Result<(), DomainError> {
        // Compare-and-decrement: no row matches once stock has dropped below
        // `amount`, so two racing orders cannot both take the last units.
        let updated = diesel::update(
            products::table
                .filter(products::id.eq(product_id))
                .filter(products::stock.ge(amount)),
        )
        .set((
            products::stock.eq(products::stock - amount),
            products::updated_at.eq(Utc::now()),
        ))
        .execute(&mut *self.conn)?;

        if updated == 0 {
            return Err(DomainError::ConcurrentModification { product_id });
        }
        Ok(())
    }

    fn record_event(&mut self, event: &OrderCreatedEvent) -> Result<(), DomainError> {
        diesel::insert_into(commerce_order_outbox::table)
            .values(&outbox_row(event)?)
            .execute(&mut *self.conn)?;
        Ok(())
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn transaction<T, F>(&self, work: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn OrderTransaction) -> Result<T, DomainError>,
    {
        let mut pooled = self.pool.get()?;
        let conn: &mut PgConnection = &mut pooled;

        conn.transaction::<_, DomainError, _>(|conn| work(&mut DieselTransaction { conn }))
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<FinalizedOrder>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .filter(orders::id.eq(id))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let lines = OrderLineRow::belonging_to(&order)
            .select(OrderLineRow::as_select())
            .order(order_lines::position.asc())
            .load(&mut conn)?;

        Ok(Some(FinalizedOrder {
            id: order.id,
            customer_id: order.customer_id,
            status: order.status.parse()?,
            totals: totals_of(&order),
            created_at: order.created_at,
            updated_at: order.updated_at,
            lines: lines
                .into_iter()
                .map(|l| LineItem {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                    line_total: l.line_total,
                })
                .collect(),
        }))
    }

    fn list(
        &self,
        customer_id: Option<Uuid>,
        page: i64,
        limit: i64,
    ) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        let offset = page_offset(page, limit);
        conn.transaction::<_, DomainError, _>(|conn| {
            let mut count = orders::table.into_boxed::<Pg>();
            let mut query = orders::table.into_boxed::<Pg>();
            if let Some(customer_id) = customer_id {
                count = count.filter(orders::customer_id.eq(customer_id));
                query = query.filter(orders::customer_id.eq(customer_id));
            }

            let total: i64 = count.count().get_result(conn)?;

            let rows = query
                .select(OrderRow::as_select())
                .order(orders::created_at.desc())
                .limit(limit)
                .offset(offset)
                .load(conn)?;

            let items = rows
                .into_iter()
                .map(|o| {
                    Ok(OrderSummary {
                        id: o.id,
                        customer_id: o.customer_id,
                        status: o.status.parse()?,
                        total_amount: o.total_amount,
                        created_at: o.created_at,
                    })
                })
                .collect::<Result<Vec<_>, DomainError>>()?;

            Ok(ListResult { items, total })
        })
    }
}
