// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor state: the committed node and edge collections, plus the reducer
//! that applies [`Action`]s to them.

use crate::action::Action;
use crate::edge::{Edge, EdgeId};
use crate::node::{Node, NodeId};
use crate::port::{PortDirection, PortRef};
use crate::schema::Schema;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Committed editor state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorState {
    /// Nodes by ID, in creation order
    nodes: IndexMap<NodeId, Node>,
    /// Edges by ID, in creation order
    edges: IndexMap<EdgeId, Edge>,
    next_node: u32,
    next_edge: u32,
    /// Bumped on every committed change
    revision: u64,
}

/// What an applied action changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// A node was created
    NodeCreated(NodeId),
    /// A node was moved
    NodeMoved(NodeId),
    /// An edge was created
    EdgeCreated(EdgeId),
    /// A node was removed along with `edges_removed` edges
    NodeDeleted {
        /// Removed node
        id: NodeId,
        /// Number of cascaded edge removals
        edges_removed: usize,
    },
    /// An edge was removed
    EdgeDeleted(EdgeId),
}

impl EditorState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic revision, bumped on every committed change
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// All nodes keyed by ID
    pub fn nodes(&self) -> &IndexMap<NodeId, Node> {
        &self.nodes
    }

    /// All edges keyed by ID
    pub fn edges(&self) -> &IndexMap<EdgeId, Edge> {
        &self.edges
    }

    /// Get a node by ID
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Get an edge by ID
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Edge feeding an input port, if any
    pub fn edge_into(&self, target: PortRef) -> Option<&Edge> {
        self.edges.values().find(|e| e.target == target)
    }

    /// Insert a node as-is, without schema validation.
    ///
    /// Used by hosts that restore state from their own storage.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.next_node = self.next_node.max(id.0.saturating_add(1));
        self.nodes.insert(id, node);
        self.revision += 1;
        id
    }

    /// Insert an edge as-is. Endpoints are not checked.
    pub fn add_edge(&mut self, edge: Edge) -> EdgeId {
        let id = edge.id;
        self.next_edge = self.next_edge.max(id.0.saturating_add(1));
        self.edges.insert(id, edge);
        self.revision += 1;
        id
    }

    /// Apply an action, validating it against the schema
    pub fn apply(&mut self, schema: &Schema, action: Action) -> Result<Applied, StateError> {
        let applied = match action {
            Action::CreateNode { kind, position } => {
                if !schema.contains(&kind) {
                    return Err(StateError::UnknownKind(kind));
                }
                check_position(position)?;
                let id = NodeId(self.next_node);
                self.next_node += 1;
                self.nodes.insert(id, Node::new(id, kind, position));
                Applied::NodeCreated(id)
            }
            Action::MoveNode { id, position } => {
                check_position(position)?;
                let node = self.nodes.get_mut(&id).ok_or(StateError::NodeNotFound(id))?;
                node.position = position;
                Applied::NodeMoved(id)
            }
            Action::CreateEdge { source, target } => {
                self.validate_edge(schema, source, target)?;
                let id = EdgeId(self.next_edge);
                self.next_edge += 1;
                self.edges.insert(id, Edge::new(id, source, target));
                Applied::EdgeCreated(id)
            }
            Action::DeleteNode { id } => {
                if self.nodes.shift_remove(&id).is_none() {
                    return Err(StateError::NodeNotFound(id));
                }
                let before = self.edges.len();
                self.edges.retain(|_, e| !e.involves_node(id));
                Applied::NodeDeleted {
                    id,
                    edges_removed: before - self.edges.len(),
                }
            }
            Action::DeleteEdge { id } => {
                self.edges
                    .shift_remove(&id)
                    .ok_or(StateError::EdgeNotFound(id))?;
                Applied::EdgeDeleted(id)
            }
        };

        self.revision += 1;
        Ok(applied)
    }

    fn validate_edge(
        &self,
        schema: &Schema,
        source: PortRef,
        target: PortRef,
    ) -> Result<(), StateError> {
        let source_node = self
            .nodes
            .get(&source.node)
            .ok_or(StateError::NodeNotFound(source.node))?;
        let target_node = self
            .nodes
            .get(&target.node)
            .ok_or(StateError::NodeNotFound(target.node))?;

        if schema
            .port(&source_node.kind, PortDirection::Output, source.index)
            .is_none()
        {
            return Err(StateError::PortNotFound(source));
        }
        if schema
            .port(&target_node.kind, PortDirection::Input, target.index)
            .is_none()
        {
            return Err(StateError::PortNotFound(target));
        }

        if !schema.can_connect(source, &source_node.kind, target, &target_node.kind) {
            return Err(StateError::IncompatiblePorts);
        }

        // Inputs take a single edge
        if self.edge_into(target).is_some() {
            return Err(StateError::InputAlreadyConnected(target));
        }

        Ok(())
    }
}

fn check_position(position: [f32; 2]) -> Result<(), StateError> {
    if position.iter().all(|c| c.is_finite() && *c >= 0.0) {
        Ok(())
    } else {
        Err(StateError::InvalidPosition(position))
    }
}

/// Error when an action cannot be applied
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StateError {
    /// Kind is not in the schema
    #[error("Unknown block kind: {0}")]
    UnknownKind(String),

    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Edge not found
    #[error("Edge not found: {0}")]
    EdgeNotFound(EdgeId),

    /// Port index out of range for the node's block
    #[error("Port not found: {0:?}")]
    PortNotFound(PortRef),

    /// Rejected by the schema's connection rule
    #[error("Incompatible ports")]
    IncompatiblePorts,

    /// Input already has an edge
    #[error("Input already connected: {0:?}")]
    InputAlreadyConnected(PortRef),

    /// Negative or non-finite position
    #[error("Invalid position: {0:?}")]
    InvalidPosition([f32; 2]),
}
