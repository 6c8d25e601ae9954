use super::types::{CommandId, NodeId};

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    DuplicateNode(NodeId),
    NodeNotFound(NodeId),
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::DuplicateNode(id) => write!(f, "Node '{}' is already registered", id),
            NetworkError::NodeNotFound(id) => write!(f, "Node '{}' not found", id),
        }
    }
}

impl std::error::Error for NetworkError {}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// The owner has no route to a command station
    NoSignalPath(NodeId),
    CommandNotFound(CommandId),
    DuplicateCommand(CommandId),
    InvalidRecord(String),
    Serialization(String),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::NoSignalPath(owner) => write!(f, "No signal path to '{}'", owner),
            CommandError::CommandNotFound(id) => write!(f, "Command '{}' not found", id),
            CommandError::DuplicateCommand(id) => write!(f, "Command '{}' is already queued", id),
            CommandError::InvalidRecord(msg) => write!(f, "Invalid command record: {}", msg),
            CommandError::Serialization(msg) => write!(f, "Serialization failed: {}", msg),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        CommandError::Serialization(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidSweepPeriod(usize),
    InvalidThreadPoolSize(usize),
    ThreadPool(String),
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidSweepPeriod(r) => {
                write!(f, "Sweep period must be at least one step, got {}", r)
            }
            ConfigError::InvalidThreadPoolSize(n) => {
                write!(f, "Thread pool size must be at least one, got {}", n)
            }
            ConfigError::ThreadPool(msg) => write!(f, "Failed to build thread pool: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Failed to parse configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
