//! Management subsystem — health and component tree over the bus.
//!
//! ```text
//! manage/health  Empty → JsonResponse (status, uptime, handlers)
//! manage/tree    Empty → JsonResponse (component tree)
//! ```
//!
//! Both are answered from the supervisor control plane.

use tokio::sync::oneshot;

use crate::supervisor::bus::{BusError, BusPayload, BusResult, ERR_INTERNAL};
use crate::supervisor::control::{ControlCommand, ControlHandle, ControlResponse};
use crate::supervisor::dispatch::BusHandler;

/// Static info collected at startup and included in the health response.
#[derive(Debug, Clone)]
pub struct ManagementInfo {
    pub app_name: String,
    pub version: String,
    pub map_configured: bool,
}

pub struct ManagementSubsystem {
    control: ControlHandle,
    info: ManagementInfo,
}

impl ManagementSubsystem {
    pub fn new(control: ControlHandle, info: ManagementInfo) -> Self {
        Self { control, info }
    }
}

async fn health_body(control: ControlHandle, info: ManagementInfo) -> BusResult {
    match control.request(ControlCommand::Status).await {
        Ok(Ok(ControlResponse::Status { uptime_ms, handlers })) => {
            let body = serde_json::json!({
                "status": "ok",
                "app_name": info.app_name,
                "version": info.version,
                "uptime_ms": uptime_ms,
                "handlers": handlers,
                "map_configured": info.map_configured,
            });
            Ok(BusPayload::JsonResponse { data: body.to_string() })
        }
        Ok(Ok(_)) => Err(BusError::new(ERR_INTERNAL, "unexpected control response for status")),
        Ok(Err(e)) => Err(BusError::new(ERR_INTERNAL, format!("control error: {e:?}"))),
        Err(e) => Err(BusError::new(ERR_INTERNAL, format!("control transport error: {e}"))),
    }
}

async fn tree_body(control: ControlHandle) -> BusResult {
    match control.request(ControlCommand::ComponentTree).await {
        Ok(Ok(ControlResponse::ComponentTree { tree_json })) => Ok(BusPayload::JsonResponse { data: tree_json }),
        Ok(Ok(_)) => Err(BusError::new(ERR_INTERNAL, "unexpected control response for tree")),
        Ok(Err(e)) => Err(BusError::new(ERR_INTERNAL, format!("control error: {e:?}"))),
        Err(e) => Err(BusError::new(ERR_INTERNAL, format!("control transport error: {e}"))),
    }
}

impl BusHandler for ManagementSubsystem {
    fn prefix(&self) -> &str {
        "manage"
    }

    fn handle_request(&self, method: &str, payload: BusPayload, reply_tx: oneshot::Sender<BusResult>) {
        if !matches!(payload, BusPayload::Empty) {
            let _ = reply_tx.send(Err(BusError::unsupported_payload(method)));
            return;
        }

        let control = self.control.clone();
        match method {
            "manage/health" => {
                let info = self.info.clone();
                tokio::spawn(async move {
                    let _ = reply_tx.send(health_body(control, info).await);
                });
            }
            "manage/tree" => {
                tokio::spawn(async move {
                    let _ = reply_tx.send(tree_body(control).await);
                });
            }
            _ => {
                let _ = reply_tx.send(Err(BusError::method_not_found(method)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, OnceLock};

    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::supervisor::bus::SupervisorBus;
    use crate::supervisor::control::SupervisorControl;

    fn info() -> ManagementInfo {
        ManagementInfo { app_name: "wanderwise".into(), version: "0.1.0".into(), map_configured: false }
    }

    #[tokio::test]
    async fn health_reports_registered_handlers() {
        let bus = SupervisorBus::new(8);
        let control = SupervisorControl::new(8);
        let handle = bus.handle.clone();
        let shutdown = CancellationToken::new();
        let mgmt = ManagementSubsystem::new(control.handle.clone(), info());
        tokio::spawn(crate::supervisor::run(
            bus,
            control,
            shutdown.clone(),
            vec![Box::new(mgmt)],
            Arc::new(OnceLock::new()),
        ));

        let reply = handle.request("manage/health", BusPayload::Empty).await.unwrap().unwrap();
        let BusPayload::JsonResponse { data } = reply else { panic!("expected json") };
        let v: serde_json::Value = serde_json::from_str(&data).unwrap();
        assert_eq!(v["status"], "ok");
        assert_eq!(v["handlers"][0], "manage");

        let reply = handle.request("manage/tree", BusPayload::Empty).await.unwrap().unwrap();
        let BusPayload::JsonResponse { data } = reply else { panic!("expected json") };
        let v: serde_json::Value = serde_json::from_str(&data).unwrap();
        assert_eq!(v["children"][0]["id"], "manage");

        let err = handle.request("manage/other", BusPayload::Empty).await.unwrap().unwrap_err();
        assert_eq!(err.code, crate::supervisor::bus::ERR_METHOD_NOT_FOUND);
        shutdown.cancel();
    }
}
