use super::format::format_duration;
use crate::core::types::{CommandId, NodeId, SimTime};
use serde::{Deserialize, Serialize};

/// Executor seam: the owner's flight computer that commands act on.
///
/// Each method reports whether the action took effect.
pub trait FlightControl {
    fn trigger_action_group(&mut self, owner: &NodeId, group: &str) -> bool;

    fn fire_event(&mut self, owner: &NodeId, part: &str, event: &str) -> bool;

    /// `None` clears the current target
    fn set_target(&mut self, owner: &NodeId, target: Option<&str>) -> bool;

    fn burn(&mut self, owner: &NodeId, throttle: f64, duration: SimTime) -> bool;
}

/// The closed set of deferred actions.
///
/// Kinds differ only in what they do and what they persist; delay arithmetic,
/// ids and ordering live on [`super::Command`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload")]
pub enum CommandKind {
    ActionGroup { group: String },
    Event { part: String, event: String },
    Target { target: Option<String> },
    Burn { throttle: f64, duration: SimTime },
    /// Abort another queued command once this one arrives
    Cancel { command: CommandId },
}

impl CommandKind {
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::ActionGroup { .. } => "Action group",
            CommandKind::Event { .. } => "Event",
            CommandKind::Target { .. } => "Target",
            CommandKind::Burn { .. } => "Burn",
            CommandKind::Cancel { .. } => "Cancel",
        }
    }

    pub fn describe(&self) -> String {
        match self {
            CommandKind::ActionGroup { group } => format!("Toggle action group: {}", group),
            CommandKind::Event { part, event } => format!("Event: {} on {}", event, part),
            CommandKind::Target { target: Some(target) } => format!("Target: {}", target),
            CommandKind::Target { target: None } => "Target: none".to_string(),
            CommandKind::Burn { throttle, duration } => format!(
                "Burn: {:.0}% for {}",
                throttle * 100.0,
                format_duration(*duration)
            ),
            CommandKind::Cancel { command } => format!("Cancel command {}", command),
        }
    }

    /// Carry out the action on `owner`'s flight computer.
    ///
    /// `Cancel` acts on the queue rather than the vessel and is resolved by
    /// the queue before this is reached; invoking it here does nothing.
    pub fn invoke(&self, owner: &NodeId, control: &mut dyn FlightControl) -> bool {
        match self {
            CommandKind::ActionGroup { group } => control.trigger_action_group(owner, group),
            CommandKind::Event { part, event } => control.fire_event(owner, part, event),
            CommandKind::Target { target } => control.set_target(owner, target.as_deref()),
            CommandKind::Burn { throttle, duration } => {
                control.burn(owner, throttle.clamp(0.0, 1.0), *duration)
            }
            CommandKind::Cancel { .. } => false,
        }
    }
}
