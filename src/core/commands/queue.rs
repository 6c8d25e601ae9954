use super::command::{AbortHandle, Command, CommandState};
use super::kinds::{CommandKind, FlightControl};
use super::persistence::{LoadReport, OwnerRecord, PersistedCommand};
use crate::core::clock::Clock;
use crate::core::errors::CommandError;
use crate::core::types::{CommandId, NodeId, Priority, SimTime};
use log::{debug, info, warn};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::mpsc::Sender;
use std::sync::Arc;

/// Lifecycle notifications fired by the queue
#[derive(Debug, Clone, PartialEq)]
pub enum QueueEvent {
    Enqueued(CommandId),
    Aborted(CommandId),
    /// The command was dispatched. A failed invocation is still terminal.
    Executed { id: CommandId, succeeded: bool },
}

/// Observer trait for queue lifecycle events
pub trait QueueObserver {
    fn on_queue_event(&mut self, event: &QueueEvent);
}

impl QueueObserver for Sender<QueueEvent> {
    fn on_queue_event(&mut self, event: &QueueEvent) {
        let _ = self.send(event.clone());
    }
}

/// Read-only view of a queued command for listings
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSummary {
    pub id: CommandId,
    pub owner: NodeId,
    pub kind: &'static str,
    pub priority: Priority,
    pub planned_execution_time: SimTime,
    pub description: String,
}

/// What one dispatch pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub executed: Vec<CommandId>,
    pub failed: Vec<CommandId>,
    pub aborted: Vec<CommandId>,
}

impl TickReport {
    pub fn dispatched(&self) -> usize {
        self.executed.len() + self.failed.len() + self.aborted.len()
    }
}

#[derive(Debug)]
struct QueuedCommand {
    sequence_num: u64,
    command: Command,
}

impl QueuedCommand {
    /// Dispatch order: planned time ascending, then priority descending,
    /// then enqueue order.
    fn dispatch_order(&self, other: &Self) -> Ordering {
        self.command
            .cmp_by_delay(&other.command)
            .then_with(|| self.command.cmp_by_priority(&other.command))
            .then_with(|| self.sequence_num.cmp(&other.sequence_num))
    }
}

impl PartialEq for QueuedCommand {
    fn eq(&self, other: &Self) -> bool {
        self.dispatch_order(other) == Ordering::Equal
    }
}

impl Eq for QueuedCommand {}

impl PartialOrd for QueuedCommand {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedCommand {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other.dispatch_order(self)
    }
}

/// Time-ordered collection of deferred commands.
///
/// The queue is the only writer of command lifecycle state apart from
/// aborts, which only flip an atomic flag and are honoured at dispatch.
pub struct CommandQueue {
    heap: BinaryHeap<QueuedCommand>,
    handles: HashMap<CommandId, AbortHandle>,
    clock: Arc<dyn Clock>,
    sequence_counter: u64,
    observers: Vec<Box<dyn QueueObserver>>,
}

impl CommandQueue {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            heap: BinaryHeap::new(),
            handles: HashMap::new(),
            clock,
            sequence_counter: 0,
            observers: Vec::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Box<dyn QueueObserver>) {
        self.observers.push(observer);
    }

    fn notify(&mut self, event: QueueEvent) {
        for observer in &mut self.observers {
            observer.on_queue_event(&event);
        }
    }

    fn push(&mut self, command: Command) {
        self.handles.insert(command.id(), command.abort_handle());
        self.heap.push(QueuedCommand {
            sequence_num: self.sequence_counter,
            command,
        });
        self.sequence_counter += 1;
    }

    /// Queue a command, stamping it with the current clock time
    pub fn enqueue(&mut self, mut command: Command) -> Result<CommandId, CommandError> {
        let id = command.id();
        if self.handles.contains_key(&id) {
            return Err(CommandError::DuplicateCommand(id));
        }
        if !command.is_pending() {
            return Err(CommandError::InvalidRecord(format!(
                "command {} is already {:?}",
                id,
                command.state()
            )));
        }

        command.stamp(self.clock.now());
        debug!(
            "Enqueued {} for {} ({}), due at {}",
            id,
            command.owner(),
            command.kind().name(),
            command.planned_execution_time()
        );
        self.push(command);
        self.notify(QueueEvent::Enqueued(id));
        Ok(id)
    }

    /// Flag a command as aborted. It is dropped, without running, when due.
    pub fn abort(&mut self, id: &CommandId) -> Result<(), CommandError> {
        let handle = self
            .handles
            .get(id)
            .ok_or(CommandError::CommandNotFound(*id))?;
        if handle.abort() {
            debug!("Command {} flagged for abort", id);
        }
        Ok(())
    }

    pub fn abort_handle(&self, id: &CommandId) -> Option<AbortHandle> {
        self.handles.get(id).cloned()
    }

    /// Remove a command right away without dispatching it
    pub fn cancel(&mut self, id: &CommandId) -> Result<Command, CommandError> {
        if self.handles.remove(id).is_none() {
            return Err(CommandError::CommandNotFound(*id));
        }

        let (removed, kept): (Vec<QueuedCommand>, Vec<QueuedCommand>) = std::mem::take(&mut self.heap)
            .into_vec()
            .into_iter()
            .partition(|queued| queued.command.id() == *id);
        self.heap = BinaryHeap::from(kept);

        let command = removed
            .into_iter()
            .next()
            .map(|queued| queued.command)
            .ok_or(CommandError::CommandNotFound(*id))?;
        command.abort();
        info!("Cancelled command {} for {}", id, command.owner());
        self.notify(QueueEvent::Aborted(*id));
        Ok(command)
    }

    /// Dispatch every command whose planned execution time is at or before `now`
    pub fn tick(&mut self, now: SimTime, control: &mut dyn FlightControl) -> TickReport {
        let mut report = TickReport::default();

        loop {
            match self.heap.peek() {
                Some(head) if head.command.is_executable(now) => {}
                _ => break,
            }
            let command = match self.heap.pop() {
                Some(queued) => queued.command,
                None => break,
            };
            let id = command.id();
            self.handles.remove(&id);

            if !command.claim() {
                info!("Dropping aborted command {} for {}", id, command.owner());
                report.aborted.push(id);
                self.notify(QueueEvent::Aborted(id));
                continue;
            }

            let succeeded = match command.kind() {
                CommandKind::Cancel { command: target } => {
                    self.abort_queued(command.owner(), target)
                }
                kind => kind.invoke(command.owner(), control),
            };

            if succeeded {
                info!(
                    "Executed {} for {}: {}",
                    id,
                    command.owner(),
                    command.kind().describe()
                );
                report.executed.push(id);
            } else {
                warn!(
                    "Command {} for {} did not take effect: {}",
                    id,
                    command.owner(),
                    command.kind().describe()
                );
                report.failed.push(id);
            }
            self.notify(QueueEvent::Executed { id, succeeded });
        }

        if report.dispatched() > 0 {
            debug!(
                "Queue tick at {}: {} executed, {} failed, {} aborted, {} pending",
                now,
                report.executed.len(),
                report.failed.len(),
                report.aborted.len(),
                self.heap.len()
            );
        }
        report
    }

    /// A `Cancel` only reaches commands addressed to the same owner
    fn abort_queued(&self, owner: &NodeId, target: &CommandId) -> bool {
        match self.get(target) {
            Some(queued) if queued.owner() != owner => {
                warn!(
                    "Cancel from {} ignored: command {} belongs to {}",
                    owner,
                    target,
                    queued.owner()
                );
                false
            }
            Some(_) => self.handles.get(target).map_or(false, AbortHandle::abort),
            None => false,
        }
    }

    pub fn get(&self, id: &CommandId) -> Option<&Command> {
        self.heap
            .iter()
            .map(|queued| &queued.command)
            .find(|command| command.id() == *id)
    }

    pub fn describe(&self, id: &CommandId) -> Option<String> {
        self.get(id).map(Command::description)
    }

    /// Pending commands in dispatch order, optionally for one owner only
    pub fn list_pending(&self, owner: Option<&NodeId>) -> Vec<CommandSummary> {
        let mut pending: Vec<&QueuedCommand> = self
            .heap
            .iter()
            .filter(|queued| queued.command.state() == CommandState::Pending)
            .filter(|queued| owner.map_or(true, |owner| queued.command.owner() == owner))
            .collect();
        pending.sort_by(|a, b| a.dispatch_order(b));

        pending
            .into_iter()
            .map(|queued| {
                let command = &queued.command;
                CommandSummary {
                    id: command.id(),
                    owner: command.owner().clone(),
                    kind: command.kind().name(),
                    priority: command.priority(),
                    planned_execution_time: command.planned_execution_time(),
                    description: command.description(),
                }
            })
            .collect()
    }

    /// Planned time of the next command to dispatch
    pub fn next_due(&self) -> Option<SimTime> {
        self.heap
            .peek()
            .map(|queued| queued.command.planned_execution_time())
    }

    /// Number of queued commands, including aborted ones not yet dropped
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Snapshot an owner's pending commands, in dispatch order
    pub fn save_owner(&self, owner: &NodeId) -> Result<OwnerRecord, CommandError> {
        let mut pending: Vec<&QueuedCommand> = self
            .heap
            .iter()
            .filter(|queued| queued.command.state() == CommandState::Pending)
            .filter(|queued| queued.command.owner() == owner)
            .collect();
        pending.sort_by(|a, b| a.dispatch_order(b));

        let mut record = OwnerRecord::new(owner.clone());
        for queued in pending {
            record
                .commands
                .push(PersistedCommand::from_command(&queued.command).to_value()?);
        }
        debug!("Saved {} commands for {}", record.commands.len(), owner);
        Ok(record)
    }

    /// Restore an owner's commands. Bad records are skipped, not fatal.
    ///
    /// Restored commands keep their persisted timestamps.
    pub fn load_owner(&mut self, record: &OwnerRecord) -> LoadReport {
        let mut report = LoadReport::default();

        for value in &record.commands {
            let persisted = match PersistedCommand::from_value(value) {
                Ok(persisted) => persisted,
                Err(err) => {
                    warn!("Skipping command record for {}: {}", record.owner, err);
                    report.skipped += 1;
                    continue;
                }
            };
            if self.handles.contains_key(&persisted.command_id) {
                warn!(
                    "Skipping command record for {}: {}",
                    record.owner,
                    CommandError::DuplicateCommand(persisted.command_id)
                );
                report.skipped += 1;
                continue;
            }
            self.push(persisted.into_command(record.owner.clone()));
            report.loaded += 1;
        }

        info!(
            "Loaded {} commands for {} ({} skipped)",
            report.loaded, record.owner, report.skipped
        );
        report
    }
}
