pub mod errors;
pub mod order;
pub mod paging;
pub mod ports;
pub mod pricing;
pub mod product;
pub mod validation;
