//! Веб-дашборд криптовалютного портфеля (Upbit)
//! Цены, остатки, P/L и индекс страха/жадности в браузере

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use coin_dashboard::dashboard::{create_router, AppState};
use coin_dashboard::utils::config::Settings;
use coin_dashboard::utils::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "dashboard_server", about = "Upbit portfolio dashboard")]
struct Args {
    /// YAML-конфиг (по умолчанию config/dashboard.yaml, если есть)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Адрес прослушивания, важнее конфига и DASHBOARD_BIND
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let args = Args::parse();
    let mut settings = Settings::load(args.config.as_deref()).context("failed to load settings")?;
    if let Some(bind) = args.bind {
        settings.server.bind = bind;
    }

    if settings.credentials().is_none() {
        warn!("⚠️ Upbit API keys not set, holdings and P/L will be hidden");
    }

    let state = AppState::from_settings(&settings).context("failed to build API clients")?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&settings.server.bind)
        .await
        .with_context(|| format!("cannot bind {}", settings.server.bind))?;

    info!("🚀 Dashboard server starting on http://{}", settings.server.bind);
    info!("📊 Markets page: http://{}/", settings.server.bind);
    info!("😨 Fear & Greed: http://{}/dashboard", settings.server.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Dashboard server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("⚠️ Ctrl+C handler failed: {}", e);
    }
}
