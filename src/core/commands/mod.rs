pub mod command;
pub mod format;
pub mod kinds;
pub mod persistence;
pub mod queue;

pub use command::{AbortHandle, Command, CommandState, DEFAULT_PRIORITY};
pub use kinds::{CommandKind, FlightControl};
pub use persistence::{LoadReport, OwnerRecord, PersistedCommand, RECORD_VERSION};
pub use queue::{CommandQueue, CommandSummary, QueueEvent, QueueObserver, TickReport};
