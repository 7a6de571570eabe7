// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node instances placed on the canvas.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A block instance on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Block kind, a key of the schema
    pub kind: String,
    /// Position in grid units
    pub position: [f32; 2],
}

impl Node {
    /// Create a node of `kind` at a grid position
    pub fn new(id: NodeId, kind: impl Into<String>, position: [f32; 2]) -> Self {
        Self {
            id,
            kind: kind.into(),
            position,
        }
    }
}
