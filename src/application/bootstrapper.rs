//! Application bootstrapper
//!
//! Handles all initialization and setup for the SnapServe backend.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::CONFIG;
use crate::db;
use crate::endpoints;
use crate::services::admin_bootstrap::{self, AdminSeed};
use crate::services::{scheduler, Clock, NotificationService, SystemClock};
use crate::state::AppState;

/// Bootstrap and run the application
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting SnapServe backend v{}", CONFIG.version);

    let state = init_services().await?;
    let app = create_app(state);

    serve(app).await
}

/// Seed an admin and restaurant from command-line arguments, then exit
pub async fn create_admin(args: Vec<String>) -> anyhow::Result<()> {
    init_tracing();

    let seed = AdminSeed::from_args(args)?;
    let conn = db::connect().await?;
    let seeded =
        admin_bootstrap::create_admin_with_restaurant(&conn, SystemClock.now(), seed).await?;

    tracing::info!(
        email = %seeded.user.email,
        user_id = seeded.user.id,
        restaurant_id = seeded.restaurant.id,
        "Admin ready: sign in with POST /api/auth/login, profile at /api/restaurants/{}/profile",
        seeded.restaurant.id
    );

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("snapserve={},tower_http=info", CONFIG.log_level).into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    if CONFIG.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_ansi(false))
            .init();
    }
}

/// Connect the database, pick a notification channel and start background tasks
async fn init_services() -> anyhow::Result<AppState> {
    let conn = db::connect().await?;
    tracing::info!("Database connection established");

    let notification = NotificationService::from_config(&CONFIG.mail);
    tracing::info!(
        channel = %notification.channel_type(),
        "Notification service initialized"
    );

    let state = AppState::new(conn, notification);
    scheduler::start_scheduler(&state);

    Ok(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create the main application router with its HTTP layers
pub fn create_app(state: AppState) -> Router {
    endpoints::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer(&CONFIG.server.allowed_origins))
}

/// Start the HTTP server
async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", CONFIG.server.host, CONFIG.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
