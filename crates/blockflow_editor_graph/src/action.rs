// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor actions: the only way the canvas asks for state changes.

use crate::edge::EdgeId;
use crate::node::NodeId;
use crate::port::PortRef;
use serde::{Deserialize, Serialize};

/// A requested mutation of the editor state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Place a new block
    CreateNode {
        /// Block kind
        kind: String,
        /// Grid position
        position: [f32; 2],
    },
    /// Move an existing node
    MoveNode {
        /// Node to move
        id: NodeId,
        /// New grid position
        position: [f32; 2],
    },
    /// Connect an output to an input
    CreateEdge {
        /// Output port
        source: PortRef,
        /// Input port
        target: PortRef,
    },
    /// Remove a node and every edge touching it
    DeleteNode {
        /// Node to remove
        id: NodeId,
    },
    /// Remove a single edge
    DeleteEdge {
        /// Edge to remove
        id: EdgeId,
    },
}

impl Action {
    /// `CreateNode` action
    pub fn create_node(kind: impl Into<String>, position: [f32; 2]) -> Self {
        Self::CreateNode {
            kind: kind.into(),
            position,
        }
    }

    /// `MoveNode` action
    pub fn move_node(id: NodeId, position: [f32; 2]) -> Self {
        Self::MoveNode { id, position }
    }

    /// `CreateEdge` action
    pub fn create_edge(source: PortRef, target: PortRef) -> Self {
        Self::CreateEdge { source, target }
    }

    /// `DeleteNode` action
    pub fn delete_node(id: NodeId) -> Self {
        Self::DeleteNode { id }
    }

    /// `DeleteEdge` action
    pub fn delete_edge(id: EdgeId) -> Self {
        Self::DeleteEdge { id }
    }
}
