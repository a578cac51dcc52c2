//! MoveYield Copilot - chat-driven, non-custodial vault transaction builder
//!
//! Guides a chat user through deposit, withdraw and position flows against a
//! Movement vault contract and hands unsigned transactions to an external
//! wallet. The service never holds keys and never submits anything.

mod api;
mod chain;
mod config;
mod payload;
mod render;
mod runtime;
mod session;
mod state_machine;
mod validate;

use api::{create_router, AppState};
use chain::{ChainGateway, HttpChainGateway, LoggingGateway};
use config::CopilotConfig;
use payload::{HandOffLinks, PayloadBuilder};
use runtime::FlowManager;
use session::InMemorySessionStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moveyield_copilot=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = CopilotConfig::from_env()?;
    tracing::info!(
        rpc_url = %config.rpc_url,
        vault = %config.vault_address,
        network = %config.network,
        timeout_secs = config.chain_timeout.as_secs(),
        "Configuration loaded"
    );

    // Chain access
    let http = HttpChainGateway::new(
        &config.rpc_url,
        config.vault_address.as_str(),
        config.chain_timeout,
    )?;
    let gateway = LoggingGateway::new(Arc::new(http));
    tracing::info!(vault = gateway.vault_address(), "Chain gateway ready");

    // Sessions
    let sessions = match config.session_ttl {
        Some(ttl) => {
            tracing::info!(ttl_secs = ttl.as_secs(), "Idle sessions expire");
            InMemorySessionStore::with_ttl(chrono::Duration::from_std(ttl)?)
        }
        None => InMemorySessionStore::new(),
    };

    let links = HandOffLinks::new(
        config.sign_url.clone(),
        config.explorer_url.clone(),
        config.network.clone(),
    );
    let payloads = PayloadBuilder::new(config.vault_address.clone(), links);
    let manager = FlowManager::new(gateway, Arc::new(sessions), payloads)
        .with_idle_timeout(config.chat_idle);
    let state = AppState::new(manager);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("MoveYield Copilot listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
