use thiserror::Error;

/// Reasons a cart is turned away before anything is written.
///
/// All of these are correctable by the caller and carry a stable
/// machine-readable [`code`](OrderRejection::code).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderRejection {
    #[error("The cart is empty.")]
    EmptyCart,
    #[error("Quantity {quantity} for product with ID {product_id} must be greater than zero.")]
    InvalidQuantity { product_id: i64, quantity: i32 },
    #[error("Product with ID {product_id} does not exist.")]
    ProductNotFound { product_id: i64 },
    #[error("Product with ID {product_id} is unavailable.")]
    ProductUnavailable { product_id: i64 },
    #[error("Product with ID {product_id} is out of stock ({requested} requested, {available} available).")]
    InsufficientStock {
        product_id: i64,
        requested: i32,
        available: i32,
    },
}

impl OrderRejection {
    pub fn code(&self) -> &'static str {
        match self {
            OrderRejection::EmptyCart => "EMPTY_CART",
            OrderRejection::InvalidQuantity { .. } => "INVALID_QUANTITY",
            OrderRejection::ProductNotFound { .. } => "PRODUCT_NOT_FOUND",
            OrderRejection::ProductUnavailable { .. } => "PRODUCT_UNAVAILABLE",
            OrderRejection::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
        }
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Order not found")]
    NotFound,
    #[error("Order rejected: {0}")]
    Rejected(#[from] OrderRejection),
    /// Stock moved between validation and the conditional decrement.
    #[error("Stock for product {product_id} changed while the order was being placed")]
    ConcurrentModification { product_id: i64 },
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Notification error: {0}")]
    Notification(String),
}
