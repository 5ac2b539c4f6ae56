//! OpenSASE Orders - Self-hosted order management service

use std::sync::Arc;
use anyhow::Result;
use opensase_orders::application::EventPublisher;
use opensase_orders::config::Config;
use opensase_orders::domain::OrderRepository;
use opensase_orders::http::{router, AppState};
use opensase_orders::infrastructure::{InMemoryOrderRepository, LogEventPublisher, NatsEventPublisher, PgOrderRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = Config::from_env()?;

    let repository: Arc<dyn OrderRepository> = match &config.database_url {
        Some(url) => Arc::new(PgOrderRepository::connect(url, config.max_connections).await?),
        None => {
            tracing::warn!("DATABASE_URL not set, orders are kept in memory");
            Arc::new(InMemoryOrderRepository::new())
        }
    };
    let publisher: Arc<dyn EventPublisher> = match &config.nats_url {
        Some(url) => match NatsEventPublisher::connect(url).await {
            Ok(p) => Arc::new(p),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, order events will only be logged");
                Arc::new(LogEventPublisher)
            }
        },
        None => Arc::new(LogEventPublisher),
    };

    let app = router(AppState::new(repository, publisher, &config.currency)?);
    tracing::info!("🚀 OpenSASE Orders listening on 0.0.0.0:{} ({})", config.port, config.currency);
    axum::serve(tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?, app).await?;
    Ok(())
}
