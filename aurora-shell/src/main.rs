//! Aurora Shell entry point.
//!
//! Bring-up order: configuration, logging, compositor connection (the
//! initial round-trips happen inside [`wayland::connect`]), mandatory
//! capability check, handler discovery, initial workspaces, and finally
//! the event loop. Fatal startup conditions exit nonzero with a
//! diagnostic; everything after bootstrap is anomaly-tolerant.

use std::sync::Arc;

use anyhow::Context as _;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use aurora_core::config::{ConfigLoader, ShellConfig};
use aurora_core::logging;
use aurora_shell::{notifications, wayland, ShellRuntime};

fn main() -> anyhow::Result<()> {
    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(e) => {
            logging::init_minimal_logging();
            error!(error = %e, "cannot load configuration");
            return Err(e.into());
        }
    };
    logging::init_logging(&config.logging).context("logging setup failed")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build the async runtime")?;
    runtime.block_on(run(config))
}

async fn run(config: ShellConfig) -> anyhow::Result<()> {
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    let link = wayland::connect(events_tx.clone())?;
    let mut shell = ShellRuntime::new(Arc::new(link), config);

    // The initial announcements were queued during connect(); apply
    // them before the mandatory-capability check runs.
    while let Ok(event) = events_rx.try_recv() {
        shell.dispatch(event);
    }
    shell.bootstrap().context("shell startup failed")?;

    let notification_events = events_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = notifications::watch_notification_daemon(notification_events).await {
            warn!(error = %e, "notification daemon watcher stopped");
        }
    });

    info!("entering the shell event loop");
    shell.run(events_rx).await;
    Ok(())
}
