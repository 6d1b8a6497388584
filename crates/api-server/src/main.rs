use std::net::SocketAddr;
use std::sync::Arc;

use api_server::http::{AppState, build_router};
use chat_core::chat::{CompletionGateway, SessionStore};
use chat_core::config::{ApiConfig, load_dotenv};
use chat_core::llm::{GroqProvider, GroqProviderConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(err) = load_dotenv() {
        eprintln!("{err}");
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "api_server=info,chat_core=info,axum=info".to_string()),
        )
        .json()
        .flatten_event(true)
        .with_current_span(true)
        .init();

    let config = match ApiConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "failed to read config");
            std::process::exit(1);
        }
    };

    let provider_config = match GroqProviderConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "failed to read completion provider config");
            std::process::exit(1);
        }
    };

    let provider = match GroqProvider::new(provider_config) {
        Ok(provider) => provider,
        Err(err) => {
            error!(error = %err, "failed to initialize completion provider");
            std::process::exit(1);
        }
    };
    info!(model = provider.model(), "completion provider ready");

    let sessions = SessionStore::new(config.max_stored_messages);
    let gateway = CompletionGateway::new(sessions, Arc::new(provider), config.max_in_flight);
    let app = build_router(AppState {
        gateway,
        max_message_chars: config.max_message_chars,
    });

    let addr: SocketAddr = match config.bind_addr.parse() {
        Ok(addr) => addr,
        Err(err) => {
            error!(error = %err, bind_addr = %config.bind_addr, "invalid bind address");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(error = %err, %addr, "failed to bind listener");
            std::process::exit(1);
        }
    };

    info!(
        "api server listening on {}",
        listener.local_addr().unwrap_or(addr)
    );
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %err, "server terminated unexpectedly");
        std::process::exit(1);
    }

    info!("api server stopped; in-memory sessions discarded");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
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

    info!("shutdown signal received");
}
