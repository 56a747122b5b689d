use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pagbot_core::audit::AuditStore;
use pagbot_core::{
    create_audit_system, load_config, validate_config, AuditEvent, ChatClient, DiscordClient,
    FsReceiptStore, OrderStore, OrderWorkflow, ReceiptStore, SqliteAuditStore, SupabaseOrderStore,
    WorkflowConfig,
};

use pagbot_server::api::create_router;
use pagbot_server::keepalive;
use pagbot_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Buffer size for audit event channel
const AUDIT_BUFFER_SIZE: usize = 1000;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("PAGBOT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);
    info!("Receipts directory: {:?}", config.receipts.dir);

    // Compute config hash for audit
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    let config_hash_short = &config_hash[..16];

    // Create SQLite audit store
    let audit_store: Arc<dyn AuditStore> = Arc::new(
        SqliteAuditStore::new(&config.database.path).context("Failed to create audit store")?,
    );
    info!("Audit store initialized");

    // Create audit system
    let (audit_handle, audit_writer) =
        create_audit_system(Arc::clone(&audit_store), AUDIT_BUFFER_SIZE);

    // Spawn audit writer task
    let writer_handle = tokio::spawn(audit_writer.run());

    // Emit ServiceStarted event
    audit_handle
        .emit(AuditEvent::ServiceStarted {
            version: VERSION.to_string(),
            config_hash: config_hash_short.to_string(),
        })
        .await;

    // Create the chat client, order store and receipt store
    let chat: Arc<dyn ChatClient> =
        Arc::new(DiscordClient::new(&config.chat).context("Failed to create chat client")?);
    info!("Chat client initialized");

    let order_store: Arc<dyn OrderStore> =
        Arc::new(SupabaseOrderStore::new(&config.store).context("Failed to create order store")?);
    info!("Order store initialized at {}", config.store.url);

    let receipt_store: Arc<dyn ReceiptStore> =
        Arc::new(FsReceiptStore::new(config.receipts.dir.clone()));

    // Assemble the workflow
    let workflow = Arc::new(OrderWorkflow::new(
        order_store,
        Arc::clone(&chat),
        receipt_store,
        audit_handle.clone(),
        WorkflowConfig::from(&config),
    ));

    // Repost the how-to-submit message. Startup proceeds even if this fails.
    if let Err(e) = workflow.post_instructions().await {
        warn!("Failed to post instruction message: {}", e);
    }

    // Spawn keepalive pinger if configured
    if let Some(keepalive_config) = config.keepalive.clone() {
        tokio::spawn(keepalive::run(keepalive_config));
    }

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::clone(&workflow),
        chat,
        audit_store,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Emit ServiceStopped event
    info!("Server shutting down...");
    audit_handle
        .emit(AuditEvent::ServiceStopped {
            reason: "graceful_shutdown".to_string(),
        })
        .await;

    // Drop all holders of AuditHandle so the writer's channel closes.
    // The workflow holds a handle clone; the AppState inside the router was
    // dropped when the server stopped. Order matters: the final event is
    // emitted BEFORE the handles go away.
    drop(workflow);
    drop(audit_handle);

    // Wait for writer to finish processing remaining events
    let _ = writer_handle.await;
    info!("Audit writer stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
