use bigdecimal::BigDecimal;
use diesel::pg::Pg;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::paging::page_offset;
use crate::domain::ports::CatalogStore;
use crate::domain::product::{Category, Product, ProductFilter, ProductPage};
use crate::schema::{categories, products};

use super::models::{CategoryRow, NewCategoryRow, NewProductRow, ProductRow};

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            price: row.price,
            stock: row.stock,
            active: row.is_active,
            category_id: row.category_id,
        }
    }
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
        }
    }
}

/// `%term%` for ILIKE, with the term's own wildcards taken literally.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn filtered(filter: &ProductFilter) -> products::BoxedQuery<'static, Pg> {
    let mut query = products::table
        .filter(products::is_active.eq(true))
        .into_boxed();
    if let Some(search) = &filter.search {
        query = query.filter(products::name.ilike(contains_pattern(search)));
    }
    if let Some(min) = &filter.min_price {
        query = query.filter(products::price.ge(min.clone()));
    }
    if let Some(max) = &filter.max_price {
        query = query.filter(products::price.le(max.clone()));
    }
    if !filter.categories.is_empty() {
        query = query.filter(products::category_id.eq_any(filter.categories.clone()));
    }
    query
}

#[derive(Clone)]
pub struct DieselCatalog {
    pool: DbPool,
}

impl DieselCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn add_product(
        &self,
        name: &str,
        price: BigDecimal,
        stock: i32,
        active: bool,
    ) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(products::table)
            .values(&NewProductRow {
                category_id: None,
                name,
                price,
                stock,
                is_active: active,
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)?;

        Ok(row.into())
    }

    pub fn add_category(&self, name: &str) -> Result<Category, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(categories::table)
            .values(&NewCategoryRow { name })
            .returning(CategoryRow::as_returning())
            .get_result(&mut conn)?;

        Ok(row.into())
    }

    pub fn set_product_category(
        &self,
        product_id: i64,
        category_id: Option<i64>,
    ) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        diesel::update(products::table.filter(products::id.eq(product_id)))
            .set(products::category_id.eq(category_id))
            .execute(&mut conn)?;
        Ok(())
    }
}

impl CatalogStore for DieselCatalog {
    fn find_product(&self, id: i64) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = products::table
            .filter(products::id.eq(id))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Product::from))
    }

    fn list_products(
        &self,
        filter: &ProductFilter,
        page: i64,
        limit: i64,
    ) -> Result<ProductPage, DomainError> {
        let mut conn = self.pool.get()?;

        let total: i64 = filtered(filter).count().get_result(&mut conn)?;

        let rows = filtered(filter)
            .select(ProductRow::as_select())
            .order(products::id.asc())
            .limit(limit)
            .offset(page_offset(page, limit))
            .load(&mut conn)?;

        Ok(ProductPage {
            items: rows.into_iter().map(Product::from).collect(),
            total,
        })
    }

    fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = categories::table
            .select(CategoryRow::as_select())
            .order((categories::name.asc(), categories::id.asc()))
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Category::from).collect())
    }
}
