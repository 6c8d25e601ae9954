use super::command::Command;
use super::kinds::CommandKind;
use crate::core::errors::CommandError;
use crate::core::types::{CommandId, NodeId, Priority, SimTime};
use serde::{Deserialize, Serialize};

/// Schema version written into every command record
pub const RECORD_VERSION: u32 = 1;

/// One pending command as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedCommand {
    pub version: u32,
    pub command_id: CommandId,
    pub priority: Priority,
    pub timestamp: SimTime,
    pub delay: SimTime,
    pub extra_delay: SimTime,
    /// Kind tag and kind-specific payload
    pub action: CommandKind,
}

impl PersistedCommand {
    pub fn from_command(command: &Command) -> Self {
        Self {
            version: RECORD_VERSION,
            command_id: command.id(),
            priority: command.priority(),
            timestamp: command.timestamp(),
            delay: command.delay(),
            extra_delay: command.extra_delay(),
            action: command.kind().clone(),
        }
    }

    /// Decode and check one record
    pub fn from_value(value: &serde_json::Value) -> Result<Self, CommandError> {
        let record: Self = serde_json::from_value(value.clone())
            .map_err(|e| CommandError::InvalidRecord(e.to_string()))?;
        if record.version != RECORD_VERSION {
            return Err(CommandError::InvalidRecord(format!(
                "unsupported record version {}",
                record.version
            )));
        }
        if !(record.timestamp.is_finite() && record.delay >= 0.0 && record.extra_delay >= 0.0) {
            return Err(CommandError::InvalidRecord(format!(
                "bad timing fields on command {}",
                record.command_id
            )));
        }
        Ok(record)
    }

    pub fn to_value(&self) -> Result<serde_json::Value, CommandError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn into_command(self, owner: NodeId) -> Command {
        Command::restore(
            self.command_id,
            owner,
            self.priority,
            self.timestamp,
            self.delay,
            self.extra_delay,
            self.action,
        )
    }
}

/// All pending commands of one owner, saved and loaded as a unit.
///
/// Records are kept as raw JSON values so a single bad record can be skipped
/// without losing the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerRecord {
    pub owner: NodeId,
    pub commands: Vec<serde_json::Value>,
}

impl OwnerRecord {
    pub fn new(owner: NodeId) -> Self {
        Self {
            owner,
            commands: Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String, CommandError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CommandError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Result of loading an [`OwnerRecord`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}
