// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer interaction state machine.
//!
//! The controller only decides; it never touches the scene or the store.
//! Each completed gesture yields the actions the canvas should dispatch.

use crate::canvas_ref::CanvasRef;
use crate::geometry::{clamp_to_grid, snap, to_pixels};
use blockflow_editor_graph::{Action, EdgeId, Node, NodeId, PortDirection, PortKey, PortRef};
use egui::{Pos2, Vec2};
use thiserror::Error;

/// Errors starting a drag
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DragError {
    /// Another gesture is in progress
    #[error("A drag session is already active")]
    SessionActive,
    /// The carried kind is not in the schema
    #[error("Unknown block kind: {0}")]
    UnknownKind(String),
    /// The pressed port does not exist
    #[error("No such port: {0:?}")]
    UnknownPort(PortKey),
}

/// Node being moved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeDrag {
    /// Dragged node
    pub id: NodeId,
    /// Committed grid position when the drag began
    pub origin: [f32; 2],
    /// Pointer offset from the node origin, in pixels
    pub grab: Vec2,
    /// Unsnapped grid position under the pointer
    pub live: [f32; 2],
}

/// Connector being drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeDrag {
    /// Fixed end of the preview
    pub anchor: PortKey,
    /// Last pointer offset
    pub pointer: Pos2,
    /// Existing edge picked up from its input, hidden while dragging
    pub detached: Option<EdgeId>,
}

/// Gesture in progress
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    /// No gesture
    #[default]
    Idle,
    /// Toolbox block carried over the canvas
    DraggingNewBlock {
        /// Block kind
        kind: String,
    },
    /// Node move
    DraggingNode(NodeDrag),
    /// Edge drawing or re-route
    DraggingEdge(EdgeDrag),
}

/// Turns pointer gestures into actions
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    /// Create an idle controller
    pub fn new() -> Self {
        Self::default()
    }

    /// Current gesture
    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Check whether no gesture is active
    pub fn is_idle(&self) -> bool {
        self.state == DragState::Idle
    }

    fn ensure_idle(&self) -> Result<(), DragError> {
        if self.is_idle() {
            Ok(())
        } else {
            Err(DragError::SessionActive)
        }
    }

    /// Toolbox pickup
    pub fn begin_block(&mut self, cref: &CanvasRef, kind: &str) -> Result<(), DragError> {
        self.ensure_idle()?;
        if !cref.schema.contains(kind) {
            return Err(DragError::UnknownKind(kind.to_string()));
        }
        self.state = DragState::DraggingNewBlock {
            kind: kind.to_string(),
        };
        Ok(())
    }

    /// Drop the carried block at a canvas pixel offset.
    ///
    /// Returns `None` outside the canvas or when no block is carried. The
    /// controller is idle afterwards either way.
    pub fn drop_block(&mut self, cref: &CanvasRef, offset: Pos2) -> Option<Action> {
        let DragState::DraggingNewBlock { kind } = std::mem::take(&mut self.state) else {
            return None;
        };
        if !cref.contains(offset) {
            tracing::debug!("Dropped {kind:?} outside the canvas at {offset:?}");
            return None;
        }
        let position = snap(offset, cref.unit, cref.dimensions);
        Some(Action::create_node(kind, position))
    }

    /// Pointer-down on a node body
    pub fn begin_node(&mut self, cref: &CanvasRef, node: &Node, pointer: Pos2) -> Result<(), DragError> {
        self.ensure_idle()?;
        self.state = DragState::DraggingNode(NodeDrag {
            id: node.id,
            origin: node.position,
            grab: pointer - to_pixels(node.position, cref.unit),
            live: node.position,
        });
        Ok(())
    }

    /// Pointer-down on a port.
    ///
    /// Grabbing a connected input picks up its edge: the preview is anchored at
    /// the edge's source output instead.
    pub fn begin_edge(&mut self, cref: &CanvasRef, port: PortKey, pointer: Pos2) -> Result<(), DragError> {
        self.ensure_idle()?;
        let exists = cref
            .nodes
            .get(&port.node())
            .and_then(|node| cref.schema.port(&node.kind, port.direction, port.index()))
            .is_some();
        if !exists {
            return Err(DragError::UnknownPort(port));
        }

        let connected = match port.direction {
            PortDirection::Input => cref.edges.values().find(|e| e.target == port.port),
            PortDirection::Output => None,
        };
        self.state = DragState::DraggingEdge(match connected {
            Some(edge) => EdgeDrag {
                anchor: PortKey::output(edge.source.node, edge.source.index),
                pointer,
                detached: Some(edge.id),
            },
            None => EdgeDrag {
                anchor: port,
                pointer,
                detached: None,
            },
        });
        Ok(())
    }

    /// Track the pointer. Returns `true` if the transient state changed.
    pub fn pointer_move(&mut self, pointer: Pos2, unit: f32, dimensions: [u32; 2]) -> bool {
        match &mut self.state {
            DragState::DraggingNode(drag) => {
                let origin = pointer - drag.grab;
                let live = clamp_to_grid([origin.x / unit, origin.y / unit], dimensions);
                let changed = live != drag.live;
                drag.live = live;
                changed
            }
            DragState::DraggingEdge(drag) => {
                let changed = drag.pointer != pointer;
                drag.pointer = pointer;
                changed
            }
            DragState::Idle | DragState::DraggingNewBlock { .. } => false,
        }
    }

    /// Finish the gesture. `target` is the port under the pointer, if any.
    pub fn pointer_up(&mut self, cref: &CanvasRef, pointer: Pos2, target: Option<PortKey>) -> Vec<Action> {
        match std::mem::take(&mut self.state) {
            DragState::DraggingNode(drag) => {
                let cell = snap(pointer - drag.grab, cref.unit, cref.dimensions);
                if cell == drag.origin {
                    Vec::new()
                } else {
                    vec![Action::move_node(drag.id, cell)]
                }
            }
            DragState::DraggingEdge(drag) => match target {
                Some(target) => connect(cref, drag, target),
                None => {
                    tracing::debug!("Edge drag from {:?} ended on empty space", drag.anchor);
                    Vec::new()
                }
            },
            DragState::Idle | DragState::DraggingNewBlock { .. } => Vec::new(),
        }
    }

    /// Abandon the gesture. Returns `true` if one was active.
    pub fn cancel(&mut self) -> bool {
        !matches!(std::mem::take(&mut self.state), DragState::Idle)
    }

    /// Node and its live position while a node drag is active
    pub fn live_node(&self) -> Option<(NodeId, [f32; 2])> {
        match &self.state {
            DragState::DraggingNode(drag) => Some((drag.id, drag.live)),
            _ => None,
        }
    }

    /// Active edge drag
    pub fn edge_drag(&self) -> Option<&EdgeDrag> {
        match &self.state {
            DragState::DraggingEdge(drag) => Some(drag),
            _ => None,
        }
    }

    /// Edge hidden by the active re-route
    pub fn detached_edge(&self) -> Option<EdgeId> {
        self.edge_drag().and_then(|d| d.detached)
    }
}

/// Actions for dropping an edge drag on `target`, orientation normalised to
/// output → input
fn connect(cref: &CanvasRef, drag: EdgeDrag, target: PortKey) -> Vec<Action> {
    if target.direction != drag.anchor.direction.opposite() {
        tracing::debug!("Ignoring drop on a port of the same direction");
        return Vec::new();
    }
    let (source, input) = match drag.anchor.direction {
        PortDirection::Output => (drag.anchor.port, target.port),
        PortDirection::Input => (target.port, drag.anchor.port),
    };
    if !compatible(cref, source, input) {
        tracing::debug!("Ports {source:?} and {input:?} cannot connect");
        return Vec::new();
    }

    let occupant = cref.edges.values().find(|e| e.target == input).map(|e| e.id);
    match (drag.detached, occupant) {
        (Some(detached), Some(occupant)) if detached == occupant => Vec::new(),
        (_, Some(occupant)) => {
            tracing::debug!("Input {input:?} already fed by edge {occupant}");
            Vec::new()
        }
        (Some(detached), None) => vec![
            Action::delete_edge(detached),
            Action::create_edge(source, input),
        ],
        (None, None) => vec![Action::create_edge(source, input)],
    }
}

fn compatible(cref: &CanvasRef, source: PortRef, target: PortRef) -> bool {
    let (Some(from), Some(to)) = (cref.nodes.get(&source.node), cref.nodes.get(&target.node)) else {
        return false;
    };
    cref.schema.can_connect(source, &from.kind, target, &to.kind)
}
