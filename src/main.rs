use std::sync::Arc;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tradebook::config::{CONFIG, Config};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg: &Config = &CONFIG;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.basic.database_url,
        mail_api = %cfg.mail.api_url,
        loglevel = %cfg.basic.loglevel,
        company = %cfg.company.name,
    );
    if cfg.basic.office_key.as_deref().is_none_or(str::is_empty) {
        warn!("basic.office_key is not set, the office api rejects every call");
    }
    if cfg.mail.api_key.is_none() {
        warn!("mail.api_key is not set, outbound mail will fail");
    }
    if cfg.digest.cron_secret.is_none() {
        warn!("digest.cron_secret is not set, the delivery digest endpoint rejects every call");
    }

    let store = tradebook::db::Store::connect(&cfg.basic.database_url).await?;
    let mailer = tradebook::service::mailer::MailClient::new(&cfg.mail)?;

    let state = tradebook::router::TradebookState::new(store, mailer, Arc::new(cfg.clone()));
    let app = tradebook::router::tradebook_router(state);

    let listener = TcpListener::bind(cfg.basic.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.basic.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
}
