//! JustWrite: a daily journaling service.
//!
//! Users write entries, get AI productivity feedback on them, and browse or
//! edit past entries. Sign-in is handled by a hosted auth backend, feedback by
//! a hosted chat-completions model, and entries live in a local SQLite file.
//!
//! Every request passes the session gate first, which resolves the session from
//! cookies and decides between passing through and redirecting.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    http::{
        header::{CONTENT_TYPE, COOKIE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, CorsLayer};

pub mod commands;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

use commands::{analyze, auth, echo, entry, pages};
use services::session_gate::session_gate;
use state::AppState;

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring invalid allowed origin {}: {}", origin, e);
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([CONTENT_TYPE, COOKIE])
            .allow_credentials(true)
            .max_age(Duration::from_secs(60 * 60)),
    )
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        // Pages
        .route("/", get(pages::write_page))
        .route("/dashboard", get(pages::dashboard_page))
        .route("/history", get(pages::history_page))
        .route("/profile", get(pages::profile_page))
        .route("/settings", get(pages::settings_page))
        .route("/login", get(pages::login_page))
        .route("/signup", get(pages::signup_page))
        // API
        .route("/api/analyze", post(analyze::analyze_entry))
        .route("/api/log", post(echo::log_text))
        .route(
            "/api/entries",
            get(entry::get_entries)
                .post(entry::create_entry)
                .delete(entry::reset_entries),
        )
        .route("/api/entries/export", get(entry::export_entries))
        .route(
            "/api/entries/:id",
            get(entry::get_entry)
                .patch(entry::update_entry)
                .delete(entry::delete_entry),
        )
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/logout", post(auth::logout))
        .layer(middleware::from_fn_with_state(state.clone(), session_gate));

    let router = match cors_layer(&state.settings.server.allowed_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.with_state(state)
}

pub async fn start_server() -> Result<()> {
    utils::config::load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Loading settings...");
    let settings = utils::config::load_settings()?;
    let address = format!("{}:{}", settings.server.host, settings.server.port);

    log::info!("Opening database at {}", settings.storage.database_path);
    let state = AppState::new(settings)?;
    let app = build_router(state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    log::info!("Server running on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        log::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                log::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                log::error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
