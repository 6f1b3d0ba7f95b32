//! Supervisor — owns the event bus and routes messages between subsystems.

pub mod bus;
pub mod component_info;
pub mod control;
pub mod dispatch;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use bus::{BusError, BusMessage, SupervisorBus};
use component_info::ComponentInfo;
use control::{ControlCommand, ControlError, ControlMessage, ControlResponse, SupervisorControl};
use dispatch::BusHandler;

/// Run the supervisor message loop until `shutdown` is cancelled.
///
/// The supervisor is a pure router: it reads each message, picks the handler
/// by the first `/`-delimited method segment, and hands off ownership of
/// `reply_tx`. Control commands are answered inline.
///
/// `comms_info` is filled in by the comms subsystem once its channel list is
/// known and shows up in the component tree when present.
///
/// # Panics
///
/// Panics on startup if two handlers share the same prefix.
pub async fn run(
    mut bus: SupervisorBus,
    mut control: SupervisorControl,
    shutdown: CancellationToken,
    handlers: Vec<Box<dyn BusHandler>>,
    comms_info: Arc<OnceLock<ComponentInfo>>,
) {
    let mut table: HashMap<String, Box<dyn BusHandler>> = HashMap::new();
    for h in handlers {
        let prefix = h.prefix().to_string();
        debug!(%prefix, "registering bus handler");
        if table.insert(prefix.clone(), h).is_some() {
            panic!("duplicate BusHandler prefix registered: {prefix:?}");
        }
    }

    info!(handlers = ?table.keys().collect::<Vec<_>>(), "supervisor ready");

    let started_at = Instant::now();

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("supervisor shutting down");
                break;
            }

            control_msg = control.rx.recv() => {
                match control_msg {
                    Some(ControlMessage::Request { command, reply_tx }) => {
                        let uptime_ms = started_at.elapsed().as_millis() as u64;
                        let result = match command {
                            ControlCommand::Health => Ok(ControlResponse::Health { uptime_ms }),
                            ControlCommand::Status => Ok(ControlResponse::Status {
                                uptime_ms,
                                handlers: sorted_ids(&table),
                            }),
                            ControlCommand::ComponentTree => {
                                let mut children: Vec<ComponentInfo> =
                                    table.values().map(|h| h.component_info()).collect();
                                if let Some(comms) = comms_info.get() {
                                    children.push(comms.clone());
                                }
                                let mut root = ComponentInfo::running("supervisor", "Supervisor", children);
                                root.uptime_ms = Some(uptime_ms);
                                serde_json::to_string(&root)
                                    .map(|tree_json| ControlResponse::ComponentTree { tree_json })
                                    .map_err(|e| ControlError::Internal { message: e.to_string() })
                            }
                            ControlCommand::Shutdown => {
                                info!("control requested supervisor shutdown");
                                shutdown.cancel();
                                Ok(ControlResponse::Ack { message: "shutdown requested".to_string() })
                            }
                        };
                        let _ = reply_tx.send(result);
                    }
                    Some(ControlMessage::Notification { command }) => {
                        if matches!(command, ControlCommand::Shutdown) {
                            info!("control notification requested supervisor shutdown");
                            shutdown.cancel();
                        } else {
                            debug!(?command, "control notification ignored");
                        }
                    }
                    None => {
                        debug!("control channel closed");
                    }
                }
            }

            msg = bus.rx.recv() => {
                match msg {
                    Some(BusMessage::Request { id, method, payload, reply_tx }) => {
                        let prefix = method.split('/').next().unwrap_or_default();
                        match table.get(prefix) {
                            Some(handler) => {
                                debug!(%id, %method, %prefix, "routing request");
                                trace!(%id, %method, payload = ?payload, "request payload");
                                handler.handle_request(&method, payload, reply_tx);
                            }
                            None => {
                                warn!(%id, %method, "unhandled request method, replying with error");
                                let _ = reply_tx.send(Err(BusError::method_not_found(&method)));
                            }
                        }
                    }
                    Some(BusMessage::Notification { method, payload }) => {
                        let prefix = method.split('/').next().unwrap_or_default();
                        match table.get(prefix) {
                            Some(handler) => {
                                debug!(%method, "routing notification");
                                trace!(%method, payload = ?payload, "notification payload");
                                handler.handle_notification(&method, payload);
                            }
                            None => {
                                debug!(%method, "unhandled notification: no handler for prefix");
                            }
                        }
                    }
                    None => {
                        info!("bus closed, supervisor exiting");
                        break;
                    }
                }
            }
        }
    }
}

fn sorted_ids(table: &HashMap<String, Box<dyn BusHandler>>) -> Vec<String> {
    let mut ids: Vec<String> = table.keys().cloned().collect();
    ids.sort();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use bus::{BusPayload, BusResult, ERR_METHOD_NOT_FOUND};
    use tokio::sync::oneshot;

    struct Echo;

    impl BusHandler for Echo {
        fn prefix(&self) -> &str {
            "echo"
        }

        fn handle_request(&self, method: &str, _payload: BusPayload, reply_tx: oneshot::Sender<BusResult>) {
            let _ = reply_tx.send(Ok(BusPayload::JsonResponse { data: method.to_string() }));
        }
    }

    fn start(handlers: Vec<Box<dyn BusHandler>>) -> (bus::BusHandle, control::ControlHandle, CancellationToken) {
        let bus = SupervisorBus::new(8);
        let control = SupervisorControl::new(8);
        let bus_handle = bus.handle.clone();
        let control_handle = control.handle.clone();
        let shutdown = CancellationToken::new();
        tokio::spawn(run(bus, control, shutdown.clone(), handlers, Arc::new(OnceLock::new())));
        (bus_handle, control_handle, shutdown)
    }

    #[tokio::test]
    async fn routes_by_prefix_and_passes_full_method() {
        let (bus, _control, shutdown) = start(vec![Box::new(Echo)]);
        let reply = bus.request("echo/a/b", BusPayload::Empty).await.unwrap();
        match reply {
            Ok(BusPayload::JsonResponse { data }) => assert_eq!(data, "echo/a/b"),
            other => panic!("unexpected reply: {other:?}"),
        }
        shutdown.cancel();
    }

    #[tokio::test]
    async fn unknown_prefix_is_method_not_found() {
        let (bus, _control, shutdown) = start(vec![Box::new(Echo)]);
        let reply = bus.request("nowhere/x", BusPayload::Empty).await.unwrap();
        assert_eq!(reply.unwrap_err().code, ERR_METHOD_NOT_FOUND);
        shutdown.cancel();
    }

    #[tokio::test]
    async fn control_status_lists_handlers_and_tree_serialises() {
        let (_bus, control, shutdown) = start(vec![Box::new(Echo)]);
        match control.request(ControlCommand::Status).await.unwrap() {
            Ok(ControlResponse::Status { handlers, .. }) => assert_eq!(handlers, vec!["echo"]),
            other => panic!("unexpected: {other:?}"),
        }
        match control.request(ControlCommand::ComponentTree).await.unwrap() {
            Ok(ControlResponse::ComponentTree { tree_json }) => {
                let tree: serde_json::Value = serde_json::from_str(&tree_json).unwrap();
                assert_eq!(tree["id"], "supervisor");
                assert_eq!(tree["children"][0]["id"], "echo");
            }
            other => panic!("unexpected: {other:?}"),
        }
        shutdown.cancel();
    }

    #[tokio::test]
    async fn control_shutdown_cancels_token() {
        let (_bus, control, shutdown) = start(vec![]);
        let reply = control.request(ControlCommand::Shutdown).await.unwrap();
        assert!(matches!(reply, Ok(ControlResponse::Ack { .. })));
        shutdown.cancelled().await;
    }
}
