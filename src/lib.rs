//! Communication-delay layer for a spaceflight simulation.
//!
//! Two cooperating parts, both driven once per simulation step:
//! - [`ConnectivityScanner`] keeps the link graph between vessels and ground
//!   stations current, spreading the pairwise re-check over many steps.
//! - [`CommandQueue`] holds deferred actions and fires each one only after its
//!   signal delay has elapsed.
//!
//! [`CommNetwork`] owns both and wires in the link predicate, the delay model
//! and the clock.

pub mod core;

// Re-export commonly used types
pub use crate::core::clock::{Clock, ManualClock};
pub use crate::core::commands::{
    AbortHandle, Command, CommandKind, CommandQueue, CommandState, CommandSummary, FlightControl,
    LoadReport, OwnerRecord, QueueEvent, QueueObserver, TickReport,
};
pub use crate::core::errors::{CommandError, ConfigError, NetworkError};
pub use crate::core::execution::{
    CommNetConfig, CommNetwork, ConcurrencyMode, DelayModel, StepReport,
};
pub use crate::core::network::{
    ConnectionEvent, ConnectionObserver, ConnectivityScanner, LinkModel, NetworkGraph, SweepStats,
};
pub use crate::core::types::{CommandId, Node, NodeId, NodeKind, Position, Priority, SimTime};
