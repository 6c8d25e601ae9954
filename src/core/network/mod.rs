pub mod graph;
pub mod scanner;

pub use graph::NetworkGraph;
pub use scanner::{
    rows_for_step, ConnectionEvent, ConnectionObserver, ConnectivityScanner, LinkModel, SweepStats,
};
