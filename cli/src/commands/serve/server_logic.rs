//! # Makan HTTP Server Implementation
//!
//! File: cli/src/commands/serve/server_logic.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Axum router for the webhook transport, the session sweeper, and the
//! server loop with graceful shutdown on Ctrl+C or SIGTERM.
//!
use crate::bot::{Bot, Incoming, Outgoing};
use crate::core::config::ServerConfig;
use crate::core::error::Result;
use anyhow::Context;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, error, info, warn, Level};

const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Shared by every request handler.
pub struct AppState {
    pub bot: Bot,
    started_at: DateTime<Utc>,
    /// Timeout notices waiting for the next response in their channel.
    pending: Mutex<HashMap<String, Vec<Outgoing>>>,
}

impl AppState {
    pub fn new(bot: Bot) -> Self {
        Self {
            bot,
            started_at: Utc::now(),
            pending: Mutex::new(HashMap::new()),
        }
    }
}

/// Response body of `POST /messages`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Replies {
    pub replies: Vec<Outgoing>,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    started_at: DateTime<Utc>,
    active_sessions: usize,
    recommendations: usize,
}

/// Runs the HTTP transport until a shutdown signal arrives.
pub async fn run_server(bot: Bot, server: ServerConfig, site_dir: PathBuf) -> Result<()> {
    let max_port_attempts = 10;
    let addr = find_available_port(server.host, server.port, max_port_attempts).await?;

    let state = Arc::new(AppState::new(bot));
    let app = create_app(state.clone(), &site_dir);

    let sweeper_state = state.clone();
    let sweeper = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            sweep_expired(&sweeper_state, Instant::now()).await;
        }
    });

    println!("\n=================================================================");
    println!("🍜 Webhook endpoint:  http://{}/messages", addr);
    println!("📂 Site directory:    {}", site_dir.display());
    println!("🌐 Site URL:          http://{}/", addr);
    println!("=================================================================\n");
    info!("Starting server on {}", addr);
    println!("Server starting! Press Ctrl+C to stop.");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind TCP listener to address {}", addr))?;

    let served = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed");
    sweeper.abort();
    served?;

    println!("\nServer shutdown complete.");
    Ok(())
}

/// Builds the router: webhook, health check, then the static site.
pub fn create_app(state: Arc<AppState>, site_dir: &Path) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::default())
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/messages", post(post_message))
        .route("/health", get(health))
        .fallback_service(ServeDir::new(site_dir))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(CorsLayer::permissive()),
        )
}

async fn post_message(
    State(state): State<Arc<AppState>>,
    Json(msg): Json<Incoming>,
) -> Json<Replies> {
    debug!("Message from {} in #{}", msg.author.name, msg.channel);
    let channel = msg.channel.clone();
    let answered = state.bot.handle(msg).await;

    let mut replies = state
        .pending
        .lock()
        .await
        .remove(&channel)
        .unwrap_or_default();
    replies.extend(answered);
    Json(Replies { replies })
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Health> {
    let recommendations = state
        .bot
        .context()
        .state
        .lock()
        .await
        .recommendations
        .len();
    Json(Health {
        status: "ok",
        started_at: state.started_at,
        active_sessions: state.bot.active_sessions().await,
        recommendations,
    })
}

/// Expires sessions due at `now` and queues their notices.
pub async fn sweep_expired(state: &AppState, now: Instant) {
    let notices = state.bot.expire_sessions(now).await;
    if notices.is_empty() {
        return;
    }
    let mut pending = state.pending.lock().await;
    for notice in notices {
        pending
            .entry(notice.channel.clone())
            .or_default()
            .push(notice);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown..."),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received SIGTERM, initiating graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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

/// Returns the first bindable address starting at `start_port`.
async fn find_available_port(
    host: std::net::IpAddr,
    start_port: u16,
    max_attempts: u8,
) -> Result<SocketAddr> {
    let mut port = start_port;
    for attempt in 0..max_attempts {
        let addr = SocketAddr::new(host, port);
        match TcpListener::bind(addr).await {
            Ok(listener) => {
                drop(listener);
                if attempt > 0 {
                    info!("Port {} was unavailable, using {}", start_port, port);
                }
                return Ok(addr);
            }
            Err(e) => {
                warn!("Port {} on {} is unavailable ({}), trying next", port, host, e);
                port = port.checked_add(1).context("Ran out of port numbers")?;
            }
        }
    }
    anyhow::bail!(
        "Could not find an available port on host {} starting from port {} after trying {} ports.",
        host,
        start_port,
        max_attempts
    )
}
