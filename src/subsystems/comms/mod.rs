//! Comms subsystem — the console and HTTP shells.
//!
//! Each channel implements [`Component`] and is spawned by [`start`] via
//! [`spawn_components`]. Channels capture their shared [`Arc<CommsState>`]
//! at construction time.
//!
//! [`start`] is synchronous: it returns a [`SubsystemHandle`] as soon as the
//! tasks are spawned.

#[cfg(feature = "channel-axum")]
pub mod axum_channel;
#[cfg(feature = "channel-pty")]
pub mod pty;
mod state;

pub use state::{CommsEvent, CommsState};

use std::sync::{Arc, OnceLock};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Config;
use crate::subsystems::events::EventHub;
use crate::subsystems::runtime::{Component, SubsystemHandle, spawn_components};
use crate::supervisor::bus::BusHandle;
use crate::supervisor::component_info::ComponentInfo;

/// Spawn all configured comms channels.
///
/// If any channel exits with an error the shared `shutdown` token is
/// cancelled. The channel list is published into `info` for the management
/// tree.
pub fn start(
    config: &Config,
    bus: BusHandle,
    events: Arc<EventHub>,
    shutdown: CancellationToken,
    info: Arc<OnceLock<ComponentInfo>>,
) -> SubsystemHandle {
    let (event_tx, event_rx) = mpsc::channel::<CommsEvent>(32);
    let state = Arc::new(CommsState::new(bus, events, event_tx));

    let mut components: Vec<Box<dyn Component>> = Vec::new();
    let mut children: Vec<ComponentInfo> = Vec::new();

    #[cfg(feature = "channel-pty")]
    {
        if config.comms_pty_should_load() {
            info!("loading pty channel");
            components.push(Box::new(pty::PtyChannel::new("pty0", state.clone())));
            children.push(ComponentInfo::leaf("pty0", "Console"));
        }
    }

    #[cfg(feature = "channel-axum")]
    {
        if config.comms_http_should_load() {
            info!(bind = %config.comms.http.bind, "loading http channel");
            components.push(Box::new(axum_channel::AxumChannel::new(
                "http0",
                config.comms.http.bind.clone(),
                state.clone(),
            )));
            children.push(ComponentInfo::leaf("http0", "HTTP"));
        }
    }

    if components.is_empty() {
        info!("no comms channels configured, waiting for shutdown");
    }

    let _ = info.set(ComponentInfo::running("comms", "Comms", children));

    // Monitoring only; exits once every channel has dropped its sender.
    tokio::spawn(async move {
        let mut rx = event_rx;
        while let Some(event) = rx.recv().await {
            match event {
                CommsEvent::ChannelShutdown { ref channel_id } => {
                    debug!(channel_id, "channel reported shutdown");
                }
                CommsEvent::SessionStarted { ref channel_id } => {
                    debug!(channel_id, "channel session started");
                }
            }
        }
    });

    spawn_components(components, shutdown)
}
