use std::net::SocketAddr;
use std::sync::Arc;

use lcd_clock::config::ClockConfig;
use lcd_clock::display::{DisplayAdapter, TerminalDisplay};
use lcd_clock::ntp::{self, SystemWallClock};
use lcd_clock::sync::{ClockSyncEngine, ClockTask};
use lcd_clock::time::{HttpTimeSource, MonotonicClock};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Logs go to stderr so they never interleave with frames on stdout.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lcd_clock=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match ClockConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: time_source_url={}, serve={}, resync_interval={:?}",
        config.time_source_url,
        config.serve,
        config.resync_interval
    );

    if config.serve {
        let addr = SocketAddr::from(([127, 0, 0, 1], config.listen_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("Failed to bind: {e}");
                std::process::exit(1);
            });
        tracing::info!("time source listening on {addr}");

        let _server = tokio::spawn(async move {
            if let Err(e) = ntp::serve(listener, ntp::router(Arc::new(SystemWallClock))).await {
                tracing::error!("Time source server error: {e}");
            }
        });
    }

    let adapter = DisplayAdapter::new(config.utc_offset);
    let mut display = TerminalDisplay::new(std::io::stdout());
    let mut task = ClockTask::spawn(
        ClockSyncEngine::new(MonotonicClock::new()),
        HttpTimeSource::new(config.time_source_url.clone()),
        config.task_config(),
        move |status| {
            if let Err(e) = display.present(&adapter.frame(status)) {
                tracing::warn!("failed to draw frame: {e}");
            }
        },
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
    task.cancel();
    tracing::info!("clock stopped");
}
