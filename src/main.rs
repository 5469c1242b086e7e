use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use hammergen_backend::{
    AppState, Backends,
    config::Config,
    database::{PgUserRepository, PgWhRepository, schema},
    external::RecaptchaVerifier,
    kv::{RateCounter, RedisResetLedger},
    middleware::RateLimiter,
    router::build_router,
    seed,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    let mut backends = Backends::in_memory();

    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .after_connect(|conn, _meta| {
                    Box::pin(async move {
                        conn.execute("SET application_name = 'hammergen_backend';")
                            .await?;
                        Ok(())
                    })
                })
                .connect(url)
                .await
                .expect("Failed to connect to Postgres");
            schema::ensure_schema(&pool)
                .await
                .expect("Failed to create schema");
            backends.users = Arc::new(PgUserRepository::new(pool.clone()));
            backends.wh = Arc::new(PgWhRepository::new(pool));
            tracing::info!("Using Postgres storage");
        }
        None => tracing::warn!("DATABASE_URL not set, data lives in memory only"),
    }

    let rate_limiter = match &config.redis_url {
        Some(url) => {
            let redis = Arc::new(redis::Client::open(url.as_str()).expect("Failed to create Redis client"));
            backends.reset_ledger = Arc::new(RedisResetLedger::new(redis.clone()));
            let counter = RateCounter::new(redis, config.rate_limit_window());
            Some(Arc::new(RateLimiter::new(counter, config.rate_limit_requests)))
        }
        None => {
            tracing::warn!("REDIS_URL not set, rate limiting disabled");
            None
        }
    };

    if let Some(secret) = &config.captcha_secret {
        backends.captcha = Arc::new(RecaptchaVerifier::new(secret.clone()));
    }

    let seed_mock_data = config.seed_mock_data;
    let state = AppState::new(config, backends);

    if seed_mock_data {
        seed::load(&state.users, &state.wh)
            .await
            .expect("Failed to seed mock data");
    }

    let app = build_router(state.clone(), rate_limiter);

    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
