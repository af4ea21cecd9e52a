//! Gateway HTTP + WebSocket server (single port).

use crate::config::{self, Config};
use crate::conversation::Conversation;
use crate::gateway::protocol::{ClientEvent, ServerEvent};
use crate::llm::{GroqClient, LlmBackend};
use crate::session::SessionStore;
use crate::tools::CitizenServices;
use anyhow::{Context, Result};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{Html, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

static INDEX_HTML: &str = include_str!("../../static/index.html");

/// Shared state for the gateway (config, sessions, conversation runner, shutdown events).
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    pub session_store: Arc<SessionStore>,
    pub conversation: Conversation,
    /// Broadcasts events to connected clients (e.g. shutdown).
    pub event_tx: broadcast::Sender<ServerEvent>,
}

/// Build gateway state around an LLM backend. The citizen services executor is always used.
pub fn build_state(config: Config, backend: Arc<dyn LlmBackend>) -> GatewayState {
    let conversation = Conversation::new(
        backend,
        Arc::new(CitizenServices::new()),
        config.llm.model.clone(),
        Duration::from_secs(config.llm.timeout_secs.max(1)),
    );
    let (event_tx, _) = broadcast::channel(16);
    GatewayState {
        session_store: Arc::new(SessionStore::new(config.session.window)),
        config: Arc::new(config),
        conversation,
        event_tx,
    }
}

/// Routes: `/` landing page, `/health` probe, `/ws` chat socket.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(index_html))
        .route("/health", get(health_http))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

/// Run the gateway with the configured hosted LLM until SIGINT/SIGTERM.
pub async fn run_gateway(config: Config) -> Result<()> {
    let api_key = config::resolve_api_key(&config);
    if api_key.is_none() {
        log::warn!("no LLM api key configured (GROQ_API_KEY); replies will report the service as unavailable");
    }
    let backend = Arc::new(GroqClient::new(Some(config.llm.base_url.clone()), api_key));
    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {} (model {})", bind_addr, config.llm.model);
    serve(listener, build_state(config, backend)).await
}

/// Serve on an already bound listener until SIGINT/SIGTERM.
pub async fn serve(listener: TcpListener, state: GatewayState) -> Result<()> {
    let event_tx = state.event_tx.clone();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal(event_tx))
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
/// Broadcasts a shutdown event so open sockets close before connections drain.
async fn shutdown_signal(event_tx: broadcast::Sender<ServerEvent>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, closing chat connections");
    let _ = event_tx.send(ServerEvent::Shutdown {});
}

/// GET / serves the chat page.
async fn index_html() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health returns a simple status JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
        "model": state.conversation.model(),
        "sessions": state.session_store.len().await,
    }))
}

/// GET /ws upgrades to WebSocket; the connection gets its own session.
async fn ws_handler(State(state): State<GatewayState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: GatewayState) {
    let session_id = state.session_store.create().await;
    let Some(session) = state.session_store.get(&session_id).await else {
        return;
    };
    log::info!("ws connected: {}", session_id);
    let mut event_rx = state.event_tx.subscribe();

    loop {
        tokio::select! {
            biased;

            event = event_rx.recv() => {
                match event {
                    Ok(event) => {
                        let is_shutdown = matches!(event, ServerEvent::Shutdown {});
                        let _ = socket.send(Message::Text(event.to_json())).await;
                        if is_shutdown {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        log::debug!("ws client lagged {} broadcast messages", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                let Message::Text(text) = msg else { continue };
                let ClientEvent::SendMessage { message } = match serde_json::from_str(&text) {
                    Ok(ev) => ev,
                    Err(e) => {
                        log::debug!("ws {}: ignoring frame: {}", session_id, e);
                        continue;
                    }
                };
                if message.trim().is_empty() {
                    continue;
                }
                let reply = {
                    let mut session = session.lock().await;
                    state.conversation.respond(&mut session, &message).await
                };
                let frame = ServerEvent::assistant(reply).to_json();
                if socket.send(Message::Text(frame)).await.is_err() {
                    break;
                }
            }
        }
    }

    state.session_store.remove(&session_id).await;
    log::info!("ws disconnected: {}", session_id);
}
