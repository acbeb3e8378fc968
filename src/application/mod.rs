pub mod notifications;
pub mod order_service;
