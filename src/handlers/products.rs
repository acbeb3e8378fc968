use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::orders::{default_limit, default_page};
use crate::application::order_service::Storefront;
use crate::domain::paging::normalize_paging;
use crate::domain::product::{Category, Product, ProductFilter};
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListProductsParams {
    /// Substring of the product name.
    pub search: Option<String>,
    /// Inclusive lower price bound, e.g. "5.00".
    pub min_price: Option<String>,
    /// Inclusive upper price bound.
    pub max_price: Option<String>,
    /// Comma-separated category ids, e.g. "1,4".
    pub categories: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub price: String,
    pub stock: i32,
    pub category_id: Option<i64>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            price: p.price.to_string(),
            stock: p.stock,
            category_id: p.category_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListProductsResponse {
    pub items: Vec<ProductResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

fn price_param(name: &str, raw: Option<String>) -> Result<Option<BigDecimal>, AppError> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| {
            BigDecimal::from_str(s.trim())
                .map_err(|e| AppError::BadRequest(format!("{} '{}': {}", name, s, e)))
        })
        .transpose()
}

fn category_ids(raw: Option<String>) -> Result<Vec<i64>, AppError> {
    raw.as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|e| AppError::BadRequest(format!("categories '{}': {}", s, e)))
        })
        .collect()
}

/// GET /products
///
/// Lists active products, optionally filtered by name and price range.
#[utoipa::path(
    get,
    path = "/products",
    params(
        ("search" = Option<String>, Query, description = "Substring of the product name"),
        ("min_price" = Option<String>, Query, description = "Inclusive lower price bound"),
        ("max_price" = Option<String>, Query, description = "Inclusive upper price bound"),
        ("categories" = Option<String>, Query, description = "Comma-separated category ids"),
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of products", body = ListProductsResponse),
        (status = 400, description = "Malformed price bound or category id"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn list_products(
    service: web::Data<dyn Storefront>,
    query: web::Query<ListProductsParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let (page, limit) = normalize_paging(params.page, params.limit);
    let filter = ProductFilter {
        search: params.search.filter(|s| !s.is_empty()),
        min_price: price_param("min_price", params.min_price)?,
        max_price: price_param("max_price", params.max_price)?,
        categories: category_ids(params.categories)?,
    };

    let result = web::block(move || service.list_products(&filter, page, limit))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListProductsResponse {
        items: result.items.into_iter().map(ProductResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}

/// GET /categories
///
/// Lists every category, ordered by name.
#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "All categories", body = [CategoryResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn list_categories(service: web::Data<dyn Storefront>) -> Result<HttpResponse, AppError> {
    let categories = web::block(move || service.list_categories())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(
        categories
            .into_iter()
            .map(CategoryResponse::from)
            .collect::<Vec<_>>(),
    ))
}
