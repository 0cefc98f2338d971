use std::net::SocketAddr;
use std::sync::atomic::Ordering;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chirpy_server::routes::{
    admin_metrics, api_metrics, create_chirp, create_user, delete_chirp, get_chirp, health_check,
    list_chirps, login, polka_webhook, refresh, reset_metrics, revoke, update_user,
};
use chirpy_server::{open_database, AppState, Config};

/// Count every request that reaches the static site
async fn count_fileserver_hits(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    state.fileserver_hits.fetch_add(1, Ordering::Relaxed);
    next.run(req).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chirpy_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Chirpy Server...");

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Environment: {}, Server: {}",
        config.environment,
        config.server_address()
    );

    // Open the database; a corrupt file is fatal here, not per-request
    let db = open_database(&config.database_path)?;

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(
            config
                .allowed_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect::<Vec<_>>(),
        )
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
        ])
        .allow_headers(Any);

    // Create app state
    let state = AppState::new(db, config.clone());

    // Static site, counted into the admin metrics
    let static_site = Router::new()
        .nest_service("/app", ServeDir::new(&config.static_dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            count_fileserver_hits,
        ));

    // Build router
    let app = Router::new()
        .route("/api/healthz", get(health_check))
        .route("/api/chirps", get(list_chirps).post(create_chirp))
        .route(
            "/api/chirps/:chirp_id",
            get(get_chirp).delete(delete_chirp),
        )
        .route("/api/users", post(create_user).put(update_user))
        .route("/api/login", post(login))
        .route("/api/refresh", post(refresh))
        .route("/api/revoke", post(revoke))
        .route("/api/polka/webhooks", post(polka_webhook))
        .route("/api/metrics", get(api_metrics))
        .route("/api/reset", post(reset_metrics))
        .route("/admin/metrics", get(admin_metrics))
        .merge(static_site)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server_address().parse()?;
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
