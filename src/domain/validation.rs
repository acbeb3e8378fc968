use std::collections::HashMap;

use super::errors::{DomainError, OrderRejection};
use super::order::{LineItem, OrderRequest, ValidatedOrder};
use super::ports::CatalogStore;

/// Check a cart against the catalog and resolve each line's unit price.
///
/// Checks run line by line in cart order: quantity, existence, availability,
/// then stock. The first failing line aborts the whole validation. Repeated
/// lines for one product are checked against their cumulative quantity.
pub fn validate<C>(request: &OrderRequest, catalog: &C) -> Result<ValidatedOrder, DomainError>
where
    C: CatalogStore + ?Sized,
{
    if request.lines.is_empty() {
        return Err(OrderRejection::EmptyCart.into());
    }

    let mut requested: HashMap<i64, i32> = HashMap::new();
    let mut lines = Vec::with_capacity(request.lines.len());

    for line in &request.lines {
        if line.quantity <= 0 {
            return Err(OrderRejection::InvalidQuantity {
                product_id: line.product_id,
                quantity: line.quantity,
            }
            .into());
        }

        let product = catalog
            .find_product(line.product_id)?
            .ok_or(OrderRejection::ProductNotFound {
                product_id: line.product_id,
            })?;

        if !product.active {
            return Err(OrderRejection::ProductUnavailable {
                product_id: product.id,
            }
            .into());
        }

        let total_requested = requested.entry(product.id).or_insert(0);
        *total_requested = total_requested.saturating_add(line.quantity);
        if product.stock < *total_requested {
            return Err(OrderRejection::InsufficientStock {
                product_id: product.id,
                requested: *total_requested,
                available: product.stock,
            }
            .into());
        }

        lines.push(LineItem::new(product.id, line.quantity, product.price));
    }

    Ok(ValidatedOrder {
        customer_id: request.customer_id,
        lines,
    })
}
