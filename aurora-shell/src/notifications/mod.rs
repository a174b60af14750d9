//! Notification daemon availability.
//!
//! The notification daemon lives on the session bus, not in the Wayland
//! registry, but its capability lifecycle is the same as any compositor
//! global: the watcher translates `org.freedesktop.Notifications` name
//! ownership into synthetic registry announcements so the registry
//! applies its usual binding rules (exactly-once, invalidate-on-loss).

use futures_util::StreamExt;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};
use zbus::names::BusName;

use crate::protocol::events::{GlobalEvent, ProtocolEvent};
use crate::protocol::types::NOTIFICATION_DAEMON_NAME;

/// Synthetic global name for the daemon capability. Wayland global
/// names start at 1, so 0 can never collide with a real one.
const NOTIFICATION_GLOBAL_NAME: u32 = 0;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("session bus error: {0}")]
    Dbus(#[from] zbus::Error),

    #[error("bus daemon error: {0}")]
    Fdo(#[from] zbus::fdo::Error),

    #[error("invalid bus name: {0}")]
    BusName(#[from] zbus::names::Error),
}

/// Watch the session bus and report daemon availability into the
/// runtime's event queue. Runs until the bus connection or the queue
/// goes away.
pub async fn watch_notification_daemon(
    events: mpsc::UnboundedSender<ProtocolEvent>,
) -> Result<(), NotificationError> {
    let connection = zbus::Connection::session().await?;
    let dbus = zbus::fdo::DBusProxy::new(&connection).await?;
    let daemon: BusName<'static> = BusName::try_from(NOTIFICATION_DAEMON_NAME)?;

    // Report the state at attach time, then follow ownership changes.
    if dbus.name_has_owner(daemon.clone()).await? {
        info!(name = NOTIFICATION_DAEMON_NAME, "notification daemon available");
        let _ = events.send(announce());
    }

    let mut changes = dbus.receive_name_owner_changed().await?;
    while let Some(signal) = changes.next().await {
        let args = match signal.args() {
            Ok(args) => args,
            Err(e) => {
                debug!(error = %e, "undecodable NameOwnerChanged signal");
                continue;
            }
        };
        if args.name() != &daemon {
            continue;
        }
        if args.new_owner().is_some() {
            info!(name = NOTIFICATION_DAEMON_NAME, "notification daemon appeared");
            let _ = events.send(announce());
        } else {
            info!(name = NOTIFICATION_DAEMON_NAME, "notification daemon gone");
            let _ = events.send(
                GlobalEvent::Removed {
                    name: NOTIFICATION_GLOBAL_NAME,
                }
                .into(),
            );
        }
    }
    Ok(())
}

fn announce() -> ProtocolEvent {
    GlobalEvent::Added {
        name: NOTIFICATION_GLOBAL_NAME,
        interface: NOTIFICATION_DAEMON_NAME.to_string(),
        version: 1,
    }
    .into()
}
