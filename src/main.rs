use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use nexocert::{config, fonts, routes, state, storage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nexocert=info,tower_http=info".into()),
        )
        .init();

    let config = config::Config::from_env()?;
    let config = Arc::new(config);

    storage::ensure_dirs(&config.upload_folder, &config.output_folder)?;

    let fonts = Arc::new(fonts::FontSet::load(
        config.font_regular.as_deref(),
        config.font_bold.as_deref(),
    )?);

    let state = Arc::new(state::AppState {
        config: config.clone(),
        fonts,
    });

    let app = Router::new()
        .route("/", get(routes::index))
        .route("/generate", post(routes::generate_handler))
        .route("/download/:filename", get(routes::download_file))
        .route("/download_all", get(routes::download_all))
        .nest_service("/static", tower_http::services::ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Nexocert listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
