use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use crypto_core::JwtKeys;
use db_pool::{create_pool as create_pg_pool, DbConfig as DbPoolConfig};
use devcommunity_service::config::StorageBackend;
use devcommunity_service::db::{EntityStore, InMemoryEntityStore, PgEntityStore};
use devcommunity_service::handlers::{self, health::HealthState};
use devcommunity_service::services::{ReputationPolicy, Services};
use devcommunity_service::{middleware, Config};
use std::io;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SERVICE_NAME: &str = "devcommunity-service";

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn build_store(config: &Config) -> Result<Arc<dyn EntityStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(InMemoryEntityStore::new()))
        }
        StorageBackend::Postgres => {
            let db_cfg = DbPoolConfig::from_env(SERVICE_NAME)
                .context("Failed to load database configuration")?;
            db_cfg.log_config();

            let pool = create_pg_pool(db_cfg)
                .await
                .context("Failed to create database pool")?;
            tracing::info!("Connected to database via db-pool crate");

            if config.database.run_migrations {
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("Failed to run database migrations")?;
                tracing::info!("Database migrations applied");
            }

            Ok(Arc::new(PgEntityStore::new(pool)))
        }
    }
}

/// Devcommunity Service
///
/// # Routes
///
/// - `/api/v1/votes/*` - Cast, delete and query votes
/// - `/api/v1/developers/*` - Profiles and reputation
/// - `/api/v1/posts/*`, `/api/v1/responses/*`, `/api/v1/comments/*` - Content
/// - `/api/v1/health*`, `/metrics` - Operational endpoints (unauthenticated)
#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()
        .map_err(anyhow::Error::msg)
        .context("Failed to load configuration")?;

    tracing::info!("Starting {} v{}", SERVICE_NAME, env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let jwt_keys = match config.auth.jwt_public_key_pem.as_deref() {
        Some(pem) => Some(
            JwtKeys::from_public_pem(pem).context("Failed to initialize JWT validation key")?,
        ),
        None => {
            tracing::warn!(
                "JWT public key not configured; authenticated requests will be rejected"
            );
            None
        }
    };

    let policy = ReputationPolicy::new(config.reputation.divisor)
        .context("Invalid reputation configuration")?;

    let store = build_store(&config).await?;
    let services = Services::new(store.clone(), policy);
    let health_state = web::Data::new(HealthState::new(store, config.storage.backend));
    let jwt_data = jwt_keys.map(web::Data::new);

    let http_bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", http_bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        let mut app = App::new()
            .app_data(health_state.clone())
            .configure(|cfg| services.register(cfg));
        if let Some(keys) = &jwt_data {
            app = app.app_data(keys.clone());
        }

        app.wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .route(
                "/metrics",
                web::get().to(devcommunity_service::metrics::serve_metrics),
            )
            .configure(handlers::health::configure_health)
            .service(
                web::scope("/api/v1")
                    .wrap(middleware::JwtAuthMiddleware)
                    .wrap(middleware::MetricsMiddleware)
                    .configure(handlers::configure_routes),
            )
    })
    .bind(&http_bind_address)
    .with_context(|| format!("Failed to bind {}", http_bind_address))?
    .workers(config.app.workers)
    .run();

    let server_handle = server.handle();

    let mut tasks: JoinSet<io::Result<()>> = JoinSet::new();
    tasks.spawn(async move {
        tracing::info!("HTTP server is running");
        server.await
    });

    let mut first_error: Option<io::Error> = None;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = tasks.join_next() => {
                match result {
                    Some(Ok(Ok(_))) => {
                        tracing::info!("HTTP server stopped");
                    }
                    Some(Ok(Err(e))) => {
                        tracing::error!("Server returned error: {}", e);
                        first_error.get_or_insert(e);
                        tasks.shutdown().await;
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::error!("Task join error: {}", e);
                        first_error.get_or_insert(io::Error::new(io::ErrorKind::Other, e.to_string()));
                        tasks.shutdown().await;
                        break;
                    }
                    None => break,
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                server_handle.stop(true).await;
                tasks.shutdown().await;
                break;
            }
        }
    }

    tracing::info!("{} shutting down", SERVICE_NAME);

    match first_error {
        Some(e) => Err(e).context("HTTP server failed"),
        None => Ok(()),
    }
}
