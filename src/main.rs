use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use book_catalog_api::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, InMemoryStore, PgStore},
    services::{RandomSource, SeededRandom, ThreadRandom},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "book_catalog_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let random: Arc<dyn RandomSource> = match config.recommendation_seed {
        Some(seed) => {
            tracing::info!(seed, "Using seeded recommendation randomness");
            Arc::new(SeededRandom::new(seed))
        }
        None => Arc::new(ThreadRandom),
    };

    let state = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url, config.database_max_connections).await?;
            tracing::info!("Connected to PostgreSQL");
            AppState::new(Arc::new(PgStore::new(pool)), random)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            AppState::new(Arc::new(InMemoryStore::new()), random)
        }
    };

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
