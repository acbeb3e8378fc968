pub mod orders;
pub mod products;

use actix_web::web;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::place_order,
        orders::get_order,
        orders::list_orders,
        products::list_products,
        products::list_categories,
    ),
    components(schemas(
        orders::PlaceOrderRequest,
        orders::PlaceOrderLineRequest,
        orders::OrderResponse,
        orders::OrderLineResponse,
        orders::OrderSummaryResponse,
        orders::ListOrdersResponse,
        products::ProductResponse,
        products::ListProductsResponse,
        products::CategoryResponse,
    )),
    tags(
        (name = "orders", description = "Checkout and order retrieval"),
        (name = "products", description = "Catalog browsing"),
    )
)]
pub struct ApiDoc;

/// Mount the storefront routes. Expects `web::Data<dyn Storefront>` in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::post().to(orders::place_order))
            .route("", web::get().to(orders::list_orders))
            .route("/{id}", web::get().to(orders::get_order)),
    )
    .service(web::scope("/products").route("", web::get().to(products::list_products)))
    .service(web::scope("/categories").route("", web::get().to(products::list_categories)));
}
