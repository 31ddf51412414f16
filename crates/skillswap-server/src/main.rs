//! SkillSwap HTTP Server
//!
//! Serves the REST API for accounts, sessions, bookings and communities.

use anyhow::Result;
use skillswap_server::api;
use skillswap_server::config::ServerConfig;
use skillswap_service::SkillSwapBuilder;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = ServerConfig::load()?;

    // Initialize tracing
    init_tracing(&config)?;
    info!(
        "Loaded configuration: {}:{} with {:?} storage",
        config.host, config.port, config.storage.source
    );

    // Build services over the configured store
    let app = SkillSwapBuilder::new()
        .with_config(config.service_config())
        .with_store_config(config.storage.clone())
        .build()
        .await?;
    info!("Services initialized on {} store", app.store().backend_name());

    if let Some(admin) = &config.admin {
        let account = app.accounts().ensure_admin(&admin.email, &admin.password).await?;
        info!("Administrator account ready: {}", account.email);
    }

    let router = api::create_router(app);

    // Start server
    let addr = config.bind_address();
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(&addr).await?;
    info!("✓ Server listening on http://{}", addr);
    info!("  Health check: http://{}/health", addr);
    info!("  Sessions API: http://{}/api/sessions", addr);
    if config.enable_dev_endpoints {
        info!("  Dev mail test: POST http://{}/api/dev/mail/test", addr);
    }

    axum::serve(listener, router).await?;

    Ok(())
}

/// Initialize tracing subscriber
fn init_tracing(config: &ServerConfig) -> Result<()> {
    let default_filter = format!(
        "skillswap_server={level},skillswap_service={level},skillswap_repository={level},tower_http=debug",
        level = config.log_level
    );

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());
    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.log_format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
