use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::Storefront;
use crate::domain::paging::{normalize_paging, DEFAULT_PAGE_LIMIT};
use crate::domain::order::{CartLine, FinalizedOrder, LineItem, OrderRequest, OrderSummary};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderLineRequest {
    pub product_id: i64,
    pub quantity: i32,
}

/// Only product ids and quantities are accepted; prices come from the catalog.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub customer_id: Uuid,
    pub lines: Vec<PlaceOrderLineRequest>,
}

impl From<PlaceOrderRequest> for OrderRequest {
    fn from(body: PlaceOrderRequest) -> Self {
        OrderRequest::new(
            body.customer_id,
            body.lines
                .into_iter()
                .map(|l| CartLine {
                    product_id: l.product_id,
                    quantity: l.quantity,
                })
                .collect(),
        )
    }
}

/// Money fields are decimal strings, e.g. "9.99".
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderLineResponse {
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<LineItem> for OrderLineResponse {
    fn from(line: LineItem) -> Self {
        Self {
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.unit_price.to_string(),
            line_total: line.line_total.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: String,
    pub subtotal: String,
    pub shipping_total: String,
    pub tax_total: String,
    pub discount_total: String,
    pub total_amount: String,
    pub created_at: String,
    pub updated_at: String,
    pub lines: Vec<OrderLineResponse>,
}

impl From<FinalizedOrder> for OrderResponse {
    fn from(order: FinalizedOrder) -> Self {
        Self {
            id: order.id,
            customer_id: order.customer_id,
            status: order.status.to_string(),
            subtotal: order.totals.subtotal.to_string(),
            shipping_total: order.totals.shipping_total.to_string(),
            tax_total: order.totals.tax_total.to_string(),
            discount_total: order.totals.discount_total.to_string(),
            total_amount: order.totals.total_amount.to_string(),
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
            lines: order.lines.into_iter().map(OrderLineResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderSummaryResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: String,
    pub total_amount: String,
    pub created_at: String,
}

impl From<OrderSummary> for OrderSummaryResponse {
    fn from(o: OrderSummary) -> Self {
        Self {
            id: o.id,
            customer_id: o.customer_id,
            status: o.status.to_string(),
            total_amount: o.total_amount.to_string(),
            created_at: o.created_at.to_rfc3339(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Only orders of this customer.
    pub customer_id: Option<Uuid>,
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

pub(crate) fn default_page() -> i64 {
    1
}

pub(crate) fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderSummaryResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Validates the cart against the catalog, prices it, and stores the order,
/// its lines and the stock deduction in one transaction.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 422, description = "Cart rejected (empty, unknown or unavailable product, insufficient stock)"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn place_order(
    service: web::Data<dyn Storefront>,
    body: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let request = OrderRequest::from(body.into_inner());

    let order = web::block(move || service.place_order(request))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /orders/{id}
///
/// Returns the order together with its order lines.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<dyn Storefront>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || service.get_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders
///
/// Returns a paginated list of orders (without their lines), newest first.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("customer_id" = Option<Uuid>, Query, description = "Restrict to one customer"),
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    service: web::Data<dyn Storefront>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let (page, limit) = normalize_paging(params.page, params.limit);

    let result = web::block(move || service.list_orders(params.customer_id, page, limit))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result
            .items
            .into_iter()
            .map(OrderSummaryResponse::from)
            .collect(),
        total: result.total,
        page,
        limit,
    }))
}
