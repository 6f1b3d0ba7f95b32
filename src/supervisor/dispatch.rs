//! Supervisor dispatch — generic trait for subsystem request handlers.
//!
//! Each subsystem implements [`BusHandler`] and registers with the supervisor
//! under its [`BusHandler::prefix`]. The supervisor extracts the first
//! `/`-delimited segment of a method and forwards the full method string to
//! the matching handler, which does its own secondary routing.

use tokio::sync::oneshot;

use crate::supervisor::bus::{BusPayload, BusResult};
use crate::supervisor::component_info::ComponentInfo;

/// A subsystem that can handle [`crate::supervisor::bus::BusMessage`]s.
pub trait BusHandler: Send + Sync {
    /// The method prefix this handler owns (e.g. `"planner"`, `"chat"`).
    ///
    /// Must be unique across all registered handlers.
    fn prefix(&self) -> &str;

    /// Handle an incoming request, taking ownership of `reply_tx`.
    ///
    /// Implementations **must not block** the caller — either resolve
    /// `reply_tx` synchronously or move it into a `tokio::spawn` task.
    fn handle_request(&self, method: &str, payload: BusPayload, reply_tx: oneshot::Sender<BusResult>);

    /// Handle a fire-and-forget notification. Default: ignore.
    fn handle_notification(&self, _method: &str, _payload: BusPayload) {}

    /// Node for the management component tree. Default: a running leaf.
    fn component_info(&self) -> ComponentInfo {
        let id = self.prefix();
        ComponentInfo::leaf(id, &ComponentInfo::capitalise(id))
    }
}
