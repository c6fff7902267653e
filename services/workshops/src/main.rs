use std::sync::Arc;

use axum::{
    http::{Method, StatusCode},
    response::Json,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alumnet_common::ApiResponse;
use alumnet_database::{create_pool, run_migrations};
use alumnet_workshops::config::WorkshopsConfig;
use alumnet_workshops::store::{PgStore, WorkshopStore};
use alumnet_workshops::{routes, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alumnet_workshops=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = WorkshopsConfig::from_env();

    // Create database connection pool and run migrations
    let db_pool = create_pool(&config.database).await?;
    run_migrations(&db_pool).await?;

    // Create JWT service
    let jwt_service = alumnet_auth::JwtService::new(&config.jwt.secret);

    // Build application state
    let store: Arc<dyn WorkshopStore> = Arc::new(PgStore::new(db_pool));
    let host = config.server.host.clone();
    let port = config.server.port;
    let app_state = AppState::new(config, jwt_service, store);

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(Any);

    // Build the application
    let app = routes::create_router(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .fallback(handler_404);

    // Start the server
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    tracing::info!("Workshops Service listening on {}:{}", host, port);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn handler_404() -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error("Route not found".to_string())),
    )
}
