use super::format::format_duration;
use super::kinds::CommandKind;
use crate::core::types::{CommandId, NodeId, Priority, SimTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU8, Ordering as AtomicOrdering};
use std::sync::Arc;

pub const DEFAULT_PRIORITY: Priority = 0;

/// Outcome of a command. `Executed` and `Aborted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandState {
    Pending,
    Executed,
    Aborted,
}

impl CommandState {
    fn to_u8(self) -> u8 {
        match self {
            CommandState::Pending => 0,
            CommandState::Executed => 1,
            CommandState::Aborted => 2,
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => CommandState::Pending,
            1 => CommandState::Executed,
            _ => CommandState::Aborted,
        }
    }
}

/// Atomically updated state shared between a command and its abort handles
#[derive(Debug)]
struct StateCell(AtomicU8);

impl StateCell {
    fn new() -> Self {
        Self(AtomicU8::new(CommandState::Pending.to_u8()))
    }

    fn load(&self) -> CommandState {
        CommandState::from_u8(self.0.load(AtomicOrdering::Acquire))
    }

    /// Move Pending to `to`. Fails if the command already left Pending.
    fn leave_pending(&self, to: CommandState) -> bool {
        self.0
            .compare_exchange(
                CommandState::Pending.to_u8(),
                to.to_u8(),
                AtomicOrdering::AcqRel,
                AtomicOrdering::Acquire,
            )
            .is_ok()
    }
}

/// Thread-safe handle that can abort one command from outside the tick,
/// e.g. from a user interface.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    id: CommandId,
    state: Arc<StateCell>,
}

impl AbortHandle {
    pub fn command_id(&self) -> CommandId {
        self.id
    }

    /// Returns true if this call moved the command from Pending to Aborted
    pub fn abort(&self) -> bool {
        self.state.leave_pending(CommandState::Aborted)
    }

    pub fn state(&self) -> CommandState {
        self.state.load()
    }
}

/// A deferred action plus the delay bookkeeping shared by every kind
#[derive(Debug)]
pub struct Command {
    id: CommandId,
    priority: Priority,
    owner: NodeId,
    timestamp: SimTime,
    delay: SimTime,
    extra_delay: SimTime,
    kind: CommandKind,
    state: Arc<StateCell>,
}

impl Command {
    /// Create a pending command with no delay. The timestamp is assigned
    /// when the command is enqueued.
    pub fn new(owner: NodeId, kind: CommandKind) -> Self {
        Self {
            id: CommandId::new(),
            priority: DEFAULT_PRIORITY,
            owner,
            timestamp: 0.0,
            delay: 0.0,
            extra_delay: 0.0,
            kind,
            state: Arc::new(StateCell::new()),
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Base delay derived from the network at submission time
    pub fn with_delay(mut self, delay: SimTime) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    /// Caller-requested delay on top of the signal delay
    pub fn with_extra_delay(mut self, extra_delay: SimTime) -> Self {
        self.extra_delay = extra_delay.max(0.0);
        self
    }

    /// Rebuild a command from persisted fields. The state starts Pending.
    pub(crate) fn restore(
        id: CommandId,
        owner: NodeId,
        priority: Priority,
        timestamp: SimTime,
        delay: SimTime,
        extra_delay: SimTime,
        kind: CommandKind,
    ) -> Self {
        Self {
            id,
            priority,
            owner,
            timestamp,
            delay,
            extra_delay,
            kind,
            state: Arc::new(StateCell::new()),
        }
    }

    pub fn id(&self) -> CommandId {
        self.id
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn owner(&self) -> &NodeId {
        &self.owner
    }

    pub fn timestamp(&self) -> SimTime {
        self.timestamp
    }

    pub fn delay(&self) -> SimTime {
        self.delay
    }

    pub fn extra_delay(&self) -> SimTime {
        self.extra_delay
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    pub fn state(&self) -> CommandState {
        self.state.load()
    }

    pub fn is_pending(&self) -> bool {
        self.state() == CommandState::Pending
    }

    pub fn planned_execution_time(&self) -> SimTime {
        self.timestamp + self.delay + self.extra_delay
    }

    /// True once `now` has reached the planned execution time
    pub fn is_executable(&self, now: SimTime) -> bool {
        now >= self.planned_execution_time()
    }

    /// Flag the command as aborted. It stays queued until dispatch.
    pub fn abort(&self) -> bool {
        self.state.leave_pending(CommandState::Aborted)
    }

    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle {
            id: self.id,
            state: Arc::clone(&self.state),
        }
    }

    pub(crate) fn stamp(&mut self, now: SimTime) {
        self.timestamp = now;
    }

    /// Claim the command for execution. Fails if it was aborted first.
    pub(crate) fn claim(&self) -> bool {
        self.state.leave_pending(CommandState::Executed)
    }

    /// Order by planned execution time, earliest first
    pub fn cmp_by_delay(&self, other: &Self) -> Ordering {
        self.planned_execution_time()
            .total_cmp(&other.planned_execution_time())
    }

    /// Order by priority, most privileged first, ignoring delay
    pub fn cmp_by_priority(&self, other: &Self) -> Ordering {
        other.priority.cmp(&self.priority)
    }

    pub fn delay_description(&self) -> String {
        format!(
            "Signal delay: {} + {}",
            format_duration(self.delay),
            format_duration(self.extra_delay)
        )
    }

    pub fn description(&self) -> String {
        format!("{}\n{}", self.kind.describe(), self.delay_description())
    }
}
