use std::sync::Arc;

use dotenvy::dotenv;
use storefront_orders::application::notifications::{
    ChannelEventSink, ConfirmationEmailListener, OrderCreatedListener,
};
use storefront_orders::application::order_service::OrderService;
use storefront_orders::config::Config;
use storefront_orders::infrastructure::catalog_repo::DieselCatalog;
use storefront_orders::infrastructure::order_repo::DieselOrderRepository;
use storefront_orders::{build_server, create_pool, run_migrations};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(std::io::Error::other)?;

    let pool = create_pool(&config.database_url, config.pool_size).map_err(std::io::Error::other)?;
    run_migrations(&pool).map_err(std::io::Error::other)?;

    // The outbox row is written inside the order transaction; listeners
    // only handle after-commit side effects.
    let listeners: Vec<Box<dyn OrderCreatedListener>> = vec![Box::new(ConfirmationEmailListener)];
    let (events, _dispatcher) = ChannelEventSink::spawn(listeners);

    log::info!(
        "Pricing with shipping {}, tax rate {}, discount rate {}",
        config.rates.shipping_cost,
        config.rates.tax_rate,
        config.rates.discount_rate
    );
    let service = OrderService::new(
        DieselCatalog::new(pool.clone()),
        DieselOrderRepository::new(pool),
        events,
        config.rates,
    );

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(Arc::new(service), &config.host, config.port)?.await
}
