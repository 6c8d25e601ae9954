use crate::core::clock::Clock;
use crate::core::commands::{Command, CommandKind, CommandQueue, FlightControl, TickReport};
use crate::core::errors::{CommandError, ConfigError};
use crate::core::execution::config::CommNetConfig;
use crate::core::network::{ConnectivityScanner, LinkModel, NetworkGraph, SweepStats};
use crate::core::types::{CommandId, NodeId, Priority, SimTime};
use log::{debug, warn};
use std::sync::Arc;

/// Signal delay of an owner given the current topology.
///
/// `None` means the owner has no path to anyone who could send it commands.
/// Closures `Fn(&NetworkGraph, &NodeId) -> Option<SimTime>` implement this.
pub trait DelayModel: Send + Sync {
    fn base_delay(&self, graph: &NetworkGraph, owner: &NodeId) -> Option<SimTime>;
}

impl<F> DelayModel for F
where
    F: Fn(&NetworkGraph, &NodeId) -> Option<SimTime> + Send + Sync,
{
    fn base_delay(&self, graph: &NetworkGraph, owner: &NodeId) -> Option<SimTime> {
        self(graph, owner)
    }
}

/// What a single simulation step did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub time: SimTime,
    pub sweep: SweepStats,
    pub commands: TickReport,
}

/// Owns the connectivity scanner and the command queue and drives both once
/// per simulation step. Construct one per session and hand out references.
pub struct CommNetwork {
    config: CommNetConfig,
    scanner: ConnectivityScanner,
    queue: CommandQueue,
    delay_model: Box<dyn DelayModel>,
    clock: Arc<dyn Clock>,
}

impl CommNetwork {
    pub fn new(
        config: CommNetConfig,
        link_model: impl LinkModel + 'static,
        delay_model: impl DelayModel + 'static,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let scanner = ConnectivityScanner::new(&config, link_model)?;
        let queue = CommandQueue::new(Arc::clone(&clock));
        Ok(Self {
            config,
            scanner,
            queue,
            delay_model: Box::new(delay_model),
            clock,
        })
    }

    pub fn config(&self) -> &CommNetConfig {
        &self.config
    }

    pub fn scanner(&self) -> &ConnectivityScanner {
        &self.scanner
    }

    pub fn scanner_mut(&mut self) -> &mut ConnectivityScanner {
        &mut self.scanner
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut CommandQueue {
        &mut self.queue
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Current signal delay of `owner`, if it is reachable at all
    pub fn signal_delay(&self, owner: &NodeId) -> Option<SimTime> {
        self.delay_model.base_delay(self.scanner.graph(), owner)
    }

    /// Queue `kind` for `owner`, delayed by its current signal delay plus
    /// `extra_delay`
    pub fn submit(
        &mut self,
        owner: &NodeId,
        kind: CommandKind,
        priority: Priority,
        extra_delay: SimTime,
    ) -> Result<CommandId, CommandError> {
        let delay = match self.signal_delay(owner) {
            Some(delay) => delay,
            None => {
                warn!("Refusing {} command for {}: no signal path", kind.name(), owner);
                return Err(CommandError::NoSignalPath(owner.clone()));
            }
        };

        let command = Command::new(owner.clone(), kind)
            .with_priority(priority)
            .with_delay(delay)
            .with_extra_delay(extra_delay);
        self.queue.enqueue(command)
    }

    /// Run one simulation step: refresh part of the adjacency, then dispatch
    /// every command that has come due.
    pub fn step(&mut self, control: &mut dyn FlightControl) -> StepReport {
        let sweep = self.scanner.tick();
        let now = self.clock.now();
        let commands = self.queue.tick(now, control);

        debug!(
            "Step at {}: {} pairs judged, {} commands dispatched",
            now,
            sweep.pairs_evaluated,
            commands.dispatched()
        );
        StepReport {
            time: now,
            sweep,
            commands,
        }
    }
}
