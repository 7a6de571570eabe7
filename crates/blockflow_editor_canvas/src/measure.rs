// SPDX-License-Identifier: MIT OR Apache-2.0
//! Content measurement hook.
//!
//! A node's content box comes from the host's layout engine. The canvas asks
//! once when the node is created; later sizes arrive as resize notifications.

use blockflow_editor_graph::{Block, Node};
use egui::Vec2;

/// Measures a node's rendered content box
pub trait ContentMeasure {
    /// Content size, or `None` if the node has not been laid out yet
    fn measure(&self, node: &Node, block: &Block) -> Option<Vec2>;
}

impl<F> ContentMeasure for F
where
    F: Fn(&Node, &Block) -> Option<Vec2>,
{
    fn measure(&self, node: &Node, block: &Block) -> Option<Vec2> {
        self(node, block)
    }
}

/// Every node has the same content box
#[derive(Debug, Clone, Copy)]
pub struct FixedContent(pub Vec2);

impl ContentMeasure for FixedContent {
    fn measure(&self, _node: &Node, _block: &Block) -> Option<Vec2> {
        Some(self.0)
    }
}

/// No size is known up front; layout arrives through resize notifications
#[derive(Debug, Clone, Copy, Default)]
pub struct Unmeasured;

impl ContentMeasure for Unmeasured {
    fn measure(&self, _node: &Node, _block: &Block) -> Option<Vec2> {
        None
    }
}
