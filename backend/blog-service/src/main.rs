use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use blog_service::cache::{self, PostListCache};
use blog_service::db::{self, PgPostRepository, PgUserRepository};
use blog_service::handlers::{self, health::HealthState};
use blog_service::middleware::{JwtAuthMiddleware, MetricsMiddleware};
use blog_service::security::JwtKeys;
use blog_service::services::{AuthService, PostService};
use blog_service::AppState;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Blog Service
///
/// # Routes
///
/// - `POST /register`, `POST /token` - accounts and bearer tokens
/// - `/posts`, `/post/{id}`, `/post/{id}/like` - post CRUD and likes
/// - `GET /users/{user_id}/posts` - per-user listing behind the post list cache
/// - `/health`, `/health/ready`, `/health/live`, `/metrics`
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = match blog_service::Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);
    tracing::debug!(database = ?config.database, auth = ?config.auth, "Loaded configuration");

    let db_pool = db::create_pool(&config.database)
        .await
        .context("Failed to create database pool")?;

    if config.database.run_migrations {
        db::run_migrations(&db_pool)
            .await
            .context("Failed to run database migrations")?;
    }

    let cache_store = cache::build_store(&config.cache).await;
    let post_lists = PostListCache::new(
        cache_store.clone(),
        config.cache.ttl(),
        config.cache.probe_timeout(),
    );

    let keys = JwtKeys::from_config(&config.auth)
        .map_err(|e| anyhow::anyhow!("Failed to initialize token keys: {e}"))?;

    let state = web::Data::new(AppState::new(
        AuthService::new(Arc::new(PgUserRepository::new(db_pool.clone())), keys.clone()),
        PostService::new(Arc::new(PgPostRepository::new(db_pool.clone())), post_lists),
    ));
    let health_state = web::Data::new(HealthState::new(
        db_pool.clone(),
        cache_store,
        config.cache.probe_timeout(),
    ));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let cors_origins = config.cors.allowed_origins.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in cors_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(state.clone())
            .app_data(health_state.clone())
            .wrap(JwtAuthMiddleware::new(keys.clone()))
            .wrap(MetricsMiddleware)
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .route(
                "/metrics",
                web::get().to(blog_service::metrics::serve_metrics),
            )
            .configure(handlers::health::configure)
            .configure(handlers::configure)
            .default_service(web::to(handlers::not_found))
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .workers(config.app.workers)
    .disable_signals()
    .run();

    let server_handle = server.handle();
    let mut server_task = tokio::spawn(server);

    let finished = tokio::select! {
        result = &mut server_task => Some(result),
        _ = shutdown_signal() => None,
    };

    let result = match finished {
        Some(result) => result,
        None => {
            tracing::info!("Shutdown signal received");
            server_handle.stop(true).await;
            server_task.await
        }
    };
    result
        .context("HTTP server task panicked")?
        .context("HTTP server failed")?;

    db_pool.close().await;
    tracing::info!("blog-service shut down");
    Ok(())
}
