use crate::core::errors::NetworkError;
use crate::core::types::{Node, NodeId, Position};
use std::collections::{HashMap, HashSet};

/// The set of communication nodes plus the symmetric adjacency relation.
///
/// Nodes keep insertion order so that a node's row index is stable until a
/// node before it is removed. Adjacency is keyed by node ID, so removing a
/// node never shifts edges onto the wrong pair.
#[derive(Debug, Default)]
pub struct NetworkGraph {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    adjacency: HashMap<NodeId, HashSet<NodeId>>,
}

impl NetworkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node. It starts with no edges.
    pub fn add_node(&mut self, node: Node) -> Result<(), NetworkError> {
        if self.index.contains_key(&node.id) {
            return Err(NetworkError::DuplicateNode(node.id));
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.adjacency.insert(node.id.clone(), HashSet::new());
        self.nodes.push(node);
        Ok(())
    }

    /// Remove a node and every edge touching it, returning its former neighbours
    pub fn remove_node(&mut self, id: &NodeId) -> Result<Vec<NodeId>, NetworkError> {
        let position = self
            .index
            .remove(id)
            .ok_or_else(|| NetworkError::NodeNotFound(id.clone()))?;
        self.nodes.remove(position);
        for (i, node) in self.nodes.iter().enumerate().skip(position) {
            self.index.insert(node.id.clone(), i);
        }

        let mut neighbors: Vec<NodeId> = self
            .adjacency
            .remove(id)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default();
        for neighbor in &neighbors {
            if let Some(set) = self.adjacency.get_mut(neighbor) {
                set.remove(id);
            }
        }
        neighbors.sort();
        Ok(neighbors)
    }

    /// Move a node. Edges to neighbours now sharing its exact position are
    /// dropped on the spot; those neighbours are returned, sorted.
    pub fn update_position(
        &mut self,
        id: &NodeId,
        position: Position,
    ) -> Result<Vec<NodeId>, NetworkError> {
        let i = *self
            .index
            .get(id)
            .ok_or_else(|| NetworkError::NodeNotFound(id.clone()))?;
        self.nodes[i].position = position;

        let mut collided: Vec<NodeId> = self
            .neighbors(id)
            .into_iter()
            .filter(|other| {
                self.node(other)
                    .map_or(false, |node| node.position.same_as(&position))
            })
            .collect();
        collided.sort();
        for other in &collided {
            if let Some(set) = self.adjacency.get_mut(id) {
                set.remove(other);
            }
            if let Some(set) = self.adjacency.get_mut(other) {
                set.remove(id);
            }
        }
        Ok(collided)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn node_at(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Current row index of a node
    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn is_connected(&self, a: &NodeId, b: &NodeId) -> bool {
        if a == b {
            return false;
        }
        self.adjacency.get(a).map_or(false, |set| set.contains(b))
    }

    /// Neighbours of `id`, sorted for deterministic iteration
    pub fn neighbors(&self, id: &NodeId) -> Vec<NodeId> {
        let mut neighbors: Vec<NodeId> = self
            .adjacency
            .get(id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        neighbors.sort();
        neighbors
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(HashSet::len).sum::<usize>() / 2
    }

    /// Set the edge between the nodes at rows `i` and `j`.
    ///
    /// Returns `Some(new_state)` when the edge changed, `None` when it was
    /// already in that state or either row no longer exists. Self-pairs and
    /// pairs at an identical position are always stored as disconnected.
    pub(crate) fn set_edge(&mut self, i: usize, j: usize, connected: bool) -> Option<bool> {
        if i == j {
            return None;
        }
        let (a, b) = match (self.nodes.get(i), self.nodes.get(j)) {
            (Some(a), Some(b)) => (a, b),
            _ => return None,
        };
        let connected = connected && !a.position.same_as(&b.position);
        let (a, b) = (a.id.clone(), b.id.clone());

        if self.is_connected(&a, &b) == connected {
            return None;
        }
        if connected {
            self.adjacency.entry(a.clone()).or_default().insert(b.clone());
            self.adjacency.entry(b).or_default().insert(a);
        } else {
            if let Some(set) = self.adjacency.get_mut(&a) {
                set.remove(&b);
            }
            if let Some(set) = self.adjacency.get_mut(&b) {
                set.remove(&a);
            }
        }
        Some(connected)
    }
}
