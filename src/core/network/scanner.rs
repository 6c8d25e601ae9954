use super::graph::NetworkGraph;
use crate::core::errors::{ConfigError, NetworkError};
use crate::core::execution::config::{CommNetConfig, ConcurrencyMode};
use crate::core::types::{Node, NodeId, Position};
use log::debug;
use rayon::prelude::*;
use std::sync::mpsc::Sender;

/// Edge eligibility predicate (range, line of sight, ...).
///
/// The scanner only decides when a pair is re-judged; how it is judged is up
/// to the model. Closures `Fn(&Node, &Node) -> bool` implement this directly.
pub trait LinkModel: Send + Sync {
    fn can_connect(&self, a: &Node, b: &Node) -> bool;
}

impl<F> LinkModel for F
where
    F: Fn(&Node, &Node) -> bool + Send + Sync,
{
    fn can_connect(&self, a: &Node, b: &Node) -> bool {
        self(a, b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Connected(NodeId, NodeId),
    Disconnected(NodeId, NodeId),
}

/// Observer trait for edge transitions
pub trait ConnectionObserver {
    /// Called when a previously absent edge is established
    fn on_connect(&mut self, a: &NodeId, b: &NodeId);

    /// Called when an existing edge is dropped
    fn on_disconnect(&mut self, a: &NodeId, b: &NodeId);
}

impl ConnectionObserver for Sender<ConnectionEvent> {
    fn on_connect(&mut self, a: &NodeId, b: &NodeId) {
        let _ = self.send(ConnectionEvent::Connected(a.clone(), b.clone()));
    }

    fn on_disconnect(&mut self, a: &NodeId, b: &NodeId) {
        let _ = self.send(ConnectionEvent::Disconnected(a.clone(), b.clone()));
    }
}

/// Work done by a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub rows_visited: usize,
    pub pairs_evaluated: usize,
}

/// Number of rows a tick visits for `node_count` nodes and a sweep spread
/// over `sweep_period` steps.
///
/// Every tick visits `node_count / sweep_period` rows; the remainder is handed
/// out one extra row per tick to the first ticks of each period, so any
/// `sweep_period` consecutive ticks visit exactly `node_count` rows.
pub fn rows_for_step(node_count: usize, sweep_period: usize, step: u64) -> usize {
    if node_count == 0 || sweep_period == 0 {
        return 0;
    }
    let baseline = node_count / sweep_period;
    let remainder = node_count - baseline * sweep_period;
    let slot = (step % sweep_period as u64) as usize;
    if slot < remainder {
        baseline + 1
    } else {
        baseline
    }
}

/// Maintains the adjacency relation of a [`NetworkGraph`], spreading the
/// O(N²) pairwise re-evaluation over `sweep_period` ticks.
///
/// An edge may be stale for at most one full sweep period.
pub struct ConnectivityScanner {
    graph: NetworkGraph,
    link_model: Box<dyn LinkModel>,
    sweep_period: usize,
    concurrency_mode: ConcurrencyMode,
    pool: Option<rayon::ThreadPool>,
    /// Row the next tick starts from
    cursor: usize,
    step: u64,
    observers: Vec<Box<dyn ConnectionObserver>>,
}

impl ConnectivityScanner {
    pub fn new(config: &CommNetConfig, link_model: impl LinkModel + 'static) -> Result<Self, ConfigError> {
        config.validate()?;

        let pool = match (config.concurrency_mode, config.thread_pool_size) {
            (ConcurrencyMode::Rayon, Some(threads)) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| ConfigError::ThreadPool(e.to_string()))?,
            ),
            _ => None,
        };

        Ok(Self {
            graph: NetworkGraph::new(),
            link_model: Box::new(link_model),
            sweep_period: config.sweep_period,
            concurrency_mode: config.concurrency_mode,
            pool,
            cursor: 0,
            step: 0,
            observers: Vec::new(),
        })
    }

    /// Add an observer for edge transitions
    pub fn add_observer(&mut self, observer: Box<dyn ConnectionObserver>) {
        self.observers.push(observer);
    }

    /// Register a node. Its edges are judged when the sweep reaches it.
    pub fn add_node(&mut self, node: Node) -> Result<(), NetworkError> {
        debug!("Adding node {} ({:?})", node.id, node.kind);
        self.graph.add_node(node)
    }

    /// Remove a node, notifying a disconnect for every edge it had
    pub fn remove_node(&mut self, id: &NodeId) -> Result<(), NetworkError> {
        let row = self.graph.index_of(id);
        let former_neighbors = self.graph.remove_node(id)?;

        // Keep the cursor on the same logical row so the current sweep does not
        // skip the node that slid into the removed slot.
        if let Some(row) = row {
            if row < self.cursor {
                self.cursor -= 1;
            }
        }

        debug!("Removed node {} ({} edges dropped)", id, former_neighbors.len());
        for neighbor in &former_neighbors {
            self.notify(id, neighbor, false);
        }
        Ok(())
    }

    /// Move a node. Other edges are re-judged when the sweep comes round; an
    /// edge to a node now at the very same position goes down immediately.
    pub fn update_position(&mut self, id: &NodeId, position: Position) -> Result<(), NetworkError> {
        let collided = self.graph.update_position(id, position)?;
        for other in &collided {
            self.notify(id, other, false);
        }
        Ok(())
    }

    pub fn is_connected(&self, a: &NodeId, b: &NodeId) -> bool {
        self.graph.is_connected(a, b)
    }

    pub fn graph(&self) -> &NetworkGraph {
        &self.graph
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of ticks run so far
    pub fn step_count(&self) -> u64 {
        self.step
    }

    pub fn sweep_period(&self) -> usize {
        self.sweep_period
    }

    /// Advance the sweep by one simulation step
    pub fn tick(&mut self) -> SweepStats {
        let step = self.step;
        self.step += 1;

        let n = self.graph.len();
        if n == 0 {
            self.cursor = 0;
            return SweepStats::default();
        }

        let rows = rows_for_step(n, self.sweep_period, step);
        self.cursor %= n;

        let mut stats = SweepStats {
            rows_visited: rows,
            pairs_evaluated: 0,
        };
        for k in 0..rows {
            stats.pairs_evaluated += self.evaluate_row((self.cursor + k) % n);
        }
        self.cursor = (self.cursor + rows) % n;

        debug!(
            "Sweep step {}: {} rows, {} pairs, cursor now {}",
            step, stats.rows_visited, stats.pairs_evaluated, self.cursor
        );
        stats
    }

    /// Re-evaluate every pair right away. The amortized cursor is untouched.
    pub fn full_sweep(&mut self) -> SweepStats {
        let n = self.graph.len();
        let mut stats = SweepStats {
            rows_visited: n,
            pairs_evaluated: 0,
        };
        for i in 0..n {
            stats.pairs_evaluated += self.evaluate_row(i);
        }
        stats
    }

    /// Judge every pair `(i, j)` with `j > i` and apply the results.
    /// Returns the number of pairs judged.
    fn evaluate_row(&mut self, i: usize) -> usize {
        if i >= self.graph.len() {
            return 0;
        }

        let judgements = self.judge_row(i);
        let count = judgements.len();
        for (j, linked) in judgements {
            if let Some(connected) = self.graph.set_edge(i, j, linked) {
                let (a, b) = match (self.graph.node_at(i), self.graph.node_at(j)) {
                    (Some(a), Some(b)) => (a.id.clone(), b.id.clone()),
                    _ => continue,
                };
                self.notify(&a, &b, connected);
            }
        }
        count
    }

    fn judge_row(&self, i: usize) -> Vec<(usize, bool)> {
        let nodes = self.graph.nodes();
        let n = nodes.len();
        let a = &nodes[i];
        let model = self.link_model.as_ref();
        let judge = |j: usize| {
            let b = &nodes[j];
            let linked = !a.position.same_as(&b.position) && model.can_connect(a, b);
            (j, linked)
        };

        match self.concurrency_mode {
            ConcurrencyMode::Sequential => (i + 1..n).map(judge).collect(),
            ConcurrencyMode::Rayon => {
                let run = || -> Vec<(usize, bool)> { (i + 1..n).into_par_iter().map(judge).collect() };
                match &self.pool {
                    Some(pool) => pool.install(run),
                    None => run(),
                }
            }
        }
    }

    fn notify(&mut self, a: &NodeId, b: &NodeId, connected: bool) {
        if connected {
            debug!("Link up: {} <-> {}", a, b);
        } else {
            debug!("Link down: {} <-> {}", a, b);
        }
        for observer in &mut self.observers {
            if connected {
                observer.on_connect(a, b);
            } else {
                observer.on_disconnect(a, b);
            }
        }
    }
}
