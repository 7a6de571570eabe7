// SPDX-License-Identifier: MIT OR Apache-2.0
//! Resize notification registry.
//!
//! Node views hold a [`ResizeSubscription`] for as long as they exist; dropping
//! it unregisters the node. Notifications are queued per node and coalesced so a
//! burst for one node yields a single update when the queue is drained.

use blockflow_editor_graph::NodeId;
use egui::Vec2;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};

#[derive(Debug, Default)]
struct Registry {
    observed: HashSet<NodeId>,
    pending: IndexMap<NodeId, Vec2>,
}

/// Per-canvas resize observer
#[derive(Debug, Clone, Default)]
pub struct ResizeObserver {
    inner: Rc<RefCell<Registry>>,
}

impl ResizeObserver {
    /// Create an observer with no subscriptions
    pub fn new() -> Self {
        Self::default()
    }

    /// Start observing a node
    pub fn observe(&self, node: NodeId) -> ResizeSubscription {
        self.inner.borrow_mut().observed.insert(node);
        ResizeSubscription {
            node,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Queue a content size for a node. Later notifications for the same node
    /// replace earlier ones. Returns `false` if the node is not observed.
    pub fn notify(&self, node: NodeId, size: Vec2) -> bool {
        let mut registry = self.inner.borrow_mut();
        if !registry.observed.contains(&node) {
            return false;
        }
        registry.pending.insert(node, size);
        true
    }

    /// Drain the queue
    pub fn take_pending(&self) -> Vec<(NodeId, Vec2)> {
        self.inner.borrow_mut().pending.drain(..).collect()
    }

    /// Check whether a node is observed
    pub fn is_observed(&self, node: NodeId) -> bool {
        self.inner.borrow().observed.contains(&node)
    }

    /// Number of observed nodes
    pub fn observed_count(&self) -> usize {
        self.inner.borrow().observed.len()
    }

    /// Number of nodes with a queued notification
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().pending.len()
    }
}

/// Scoped registration; unregisters the node when dropped
#[derive(Debug)]
pub struct ResizeSubscription {
    node: NodeId,
    registry: Weak<RefCell<Registry>>,
}

impl ResizeSubscription {
    /// Observed node
    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        if let Ok(mut registry) = registry.try_borrow_mut() {
            registry.observed.remove(&self.node);
            registry.pending.shift_remove(&self.node);
        };
    }
}
