pub mod comm_network;
pub mod config;

pub use comm_network::{CommNetwork, DelayModel, StepReport};
pub use config::{CommNetConfig, ConcurrencyMode, DEFAULT_SWEEP_PERIOD};
