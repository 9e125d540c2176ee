// src/main.rs

use axum::Router;
use std::env;
use std::net::SocketAddr;
use tokio::io;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vottun_explorer::{api::create_api_router, config::Config, console::run_console, AppState};

// --- HTTP Server Logic ---
async fn run_http_server(state: AppState) -> anyhow::Result<()> {
    let app = Router::new()
        .nest("/api", create_api_router())
        .with_state(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from((state.config.host, state.config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🚀 HTTP Server listening on {}", addr);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    // Initialize tracing. Logs go to stderr so the console keeps stdout clean.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vottun_explorer=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Failed to load configuration: {}", e);
            return;
        }
    };

    let app_state = match AppState::new(config) {
        Ok(state) => state,
        Err(e) => {
            error!("❌ Failed to initialize application state: {}", e);
            return;
        }
    };
    info!(
        "Loaded {} catalog endpoints and {} networks",
        app_state.catalog.len(),
        app_state.balance_client.registry().list().len()
    );

    // Console mode (stdin/stdout) or HTTP server mode
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--console") || env::var("CONSOLE_MODE").is_ok() {
        run_console(app_state, io::BufReader::new(io::stdin()), io::stdout()).await;
    } else if let Err(e) = run_http_server(app_state).await {
        error!("❌ HTTP server error: {}", e);
    }
}
