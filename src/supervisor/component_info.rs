//! Component info — the runtime component tree served by `manage/tree`.
//!
//! Every [`BusHandler`](crate::supervisor::dispatch::BusHandler) can describe
//! itself; comms channels are listed by the comms subsystem at startup.

use serde::{Deserialize, Serialize};

/// Runtime state of a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    On,
    Off,
    Err,
}

/// Description of a single node in the management tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentInfo {
    /// Stable machine identifier (e.g. `"planner"`, `"pty0"`).
    pub id: String,
    /// Display name (e.g. `"Planner"`).
    pub name: String,
    /// Lifecycle status string (`"running"` or `"stopped"`).
    pub status: String,
    pub state: ComponentStatus,
    /// Supervisor root only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_ms: Option<u64>,
    /// Sorted by id.
    pub children: Vec<ComponentInfo>,
}

impl ComponentInfo {
    /// A running node with children.
    pub fn running(id: &str, name: &str, children: Vec<ComponentInfo>) -> Self {
        let mut node = Self {
            id: id.to_string(),
            name: name.to_string(),
            status: "running".to_string(),
            state: ComponentStatus::On,
            uptime_ms: None,
            children,
        };
        node.sort_children();
        node
    }

    /// A running leaf node.
    pub fn leaf(id: &str, name: &str) -> Self {
        Self::running(id, name, vec![])
    }

    pub fn sort_children(&mut self) {
        self.children.sort_by(|a, b| a.id.cmp(&b.id));
    }

    /// `"planner"` → `"Planner"`.
    pub fn capitalise(s: &str) -> String {
        let mut chars = s.chars();
        match chars.next() {
            None => String::new(),
            Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_are_sorted() {
        let node = ComponentInfo::running(
            "comms",
            "Comms",
            vec![ComponentInfo::leaf("pty0", "PTY"), ComponentInfo::leaf("http0", "HTTP")],
        );
        let ids: Vec<_> = node.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["http0", "pty0"]);
    }

    #[test]
    fn serialises_state_lowercase_and_skips_uptime() {
        let json = serde_json::to_value(ComponentInfo::leaf("chat", "Chat")).unwrap();
        assert_eq!(json["state"], "on");
        assert!(json.get("uptime_ms").is_none());
    }

    #[test]
    fn capitalise_handles_empty() {
        assert_eq!(ComponentInfo::capitalise(""), "");
        assert_eq!(ComponentInfo::capitalise("planner"), "Planner");
    }
}
