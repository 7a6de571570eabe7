// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canvas orchestrator.
//!
//! Owns the scene, the renderers, the drag controller and the resize
//! observer, and runs the render pass in a fixed order:
//! validate → nodes → edges → portals → preview.
//!
//! Pointer events take client coordinates; the canvas subtracts the origin
//! given to [`Canvas::attach`].

use crate::canvas_ref::CanvasRef;
use crate::config::{CanvasConfig, ConfigError};
use crate::drag::{DragController, DragError, DragState};
use crate::edges::EdgeRenderer;
use crate::measure::ContentMeasure;
use crate::nodes::{Hit, NodeRenderer};
use crate::observer::ResizeObserver;
use crate::portal::{self, Portal};
use crate::preview::PreviewRenderer;
use crate::scene::Scene;
use crate::style::{css_color, scene_css, StyleProvider};
use crate::svg;
use blockflow_editor_graph::{
    Action, Edge, EdgeId, EditorState, Node, NodeId, PortDirection, PortKey, Schema, Store,
};
use egui::{Pos2, Vec2};
use indexmap::IndexMap;
use std::sync::Arc;
use thiserror::Error;

/// Callback receiving the committed nodes and edges
pub type OnChange = Box<dyn FnMut(&IndexMap<NodeId, Node>, &IndexMap<EdgeId, Edge>)>;

/// Snapshot inconsistencies that abort a render pass
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    /// A node's kind is missing from the schema
    #[error("Node {node} has unknown kind {kind:?}")]
    UnknownKind {
        /// Offending node
        node: NodeId,
        /// Kind not found in the schema
        kind: String,
    },
    /// An edge endpoint node does not exist
    #[error("Edge {edge} references missing node {node}")]
    DanglingEdge {
        /// Offending edge
        edge: EdgeId,
        /// Missing endpoint node
        node: NodeId,
    },
    /// An edge endpoint index is beyond the block's ports
    #[error("Edge {edge} references missing port {port:?}")]
    PortOutOfRange {
        /// Offending edge
        edge: EdgeId,
        /// Endpoint with no matching port definition
        port: PortKey,
    },
}

/// Check a snapshot against the schema before anything is drawn
pub fn validate(schema: &Schema, state: &EditorState) -> Result<(), RenderError> {
    for node in state.nodes().values() {
        if !schema.contains(&node.kind) {
            return Err(RenderError::UnknownKind {
                node: node.id,
                kind: node.kind.clone(),
            });
        }
    }
    for edge in state.edges().values() {
        for (port, direction) in [
            (edge.source, PortDirection::Output),
            (edge.target, PortDirection::Input),
        ] {
            let node = state.node(port.node).ok_or(RenderError::DanglingEdge {
                edge: edge.id,
                node: port.node,
            })?;
            if schema.port(&node.kind, direction, port.index).is_none() {
                return Err(RenderError::PortOutOfRange {
                    edge: edge.id,
                    port: PortKey { port, direction },
                });
            }
        }
    }
    Ok(())
}

/// Node-and-edge editor surface
pub struct Canvas<S: Store> {
    cref: CanvasRef,
    store: S,
    style: Box<dyn StyleProvider>,
    observer: ResizeObserver,
    nodes: NodeRenderer,
    edges: EdgeRenderer,
    preview: PreviewRenderer,
    drag: DragController,
    portals: Vec<Portal>,
    selected: Option<NodeId>,
    origin: Pos2,
    rendered_revision: Option<u64>,
    on_change: Option<OnChange>,
    last_error: Option<RenderError>,
}

impl<S: Store> Canvas<S> {
    /// Create an unattached canvas. Fails if `config` is invalid.
    pub fn new(
        config: CanvasConfig,
        schema: Arc<Schema>,
        store: S,
        style: impl StyleProvider + 'static,
        measure: impl ContentMeasure + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let observer = ResizeObserver::new();
        Ok(Self {
            cref: CanvasRef::new(&config, schema),
            store,
            style: Box::new(style),
            nodes: NodeRenderer::new(observer.clone(), Box::new(measure)),
            observer,
            edges: EdgeRenderer::new(),
            preview: PreviewRenderer::new(),
            drag: DragController::new(),
            portals: Vec::new(),
            selected: None,
            origin: Pos2::ZERO,
            rendered_revision: None,
            on_change: None,
            last_error: None,
        })
    }

    /// Register the committed-change callback
    pub fn set_on_change(
        &mut self,
        callback: impl FnMut(&IndexMap<NodeId, Node>, &IndexMap<EdgeId, Edge>) + 'static,
    ) {
        self.on_change = Some(Box::new(callback));
    }

    /// Mount the canvas at `origin` with a surface width in pixels.
    ///
    /// The first call builds the scene and renders; later calls only move or
    /// resize the surface.
    pub fn attach(&mut self, origin: Pos2, width: f32) {
        self.origin = origin;
        self.cref.canvas_dimensions.x = width;
        let root = self.cref.scene.root();
        self.cref.scene.set_attr(root, "width", width.to_string());
        if self.cref.is_attached() {
            return;
        }

        let layers = self.cref.attach();
        let unit = self.cref.unit;
        let scene = &mut self.cref.scene;
        scene.set_text(layers.style, scene_css(self.style.border_color()));
        scene.set_attr(root, "height", (unit * self.cref.dimensions[1] as f32).to_string());
        scene.set_attr(root, "style", self.style.svg_style(unit));
        self.preview.attach(scene, layers.preview);
        tracing::info!("Canvas attached at {:?}, {}px wide", origin, width);

        self.refresh();
    }

    /// Pull the committed state from the store and render it.
    ///
    /// Hosts call this after changing the store outside the canvas; the canvas
    /// calls it after every dispatch.
    pub fn refresh(&mut self) {
        if !self.cref.is_attached() {
            return;
        }

        let state = self.store.state();
        let revision = state.revision();
        let committed = self.rendered_revision != Some(revision);
        if committed {
            if let Err(e) = validate(&self.cref.schema, state) {
                tracing::error!("Render pass aborted: {}", e);
                self.last_error = Some(e);
                return;
            }
            self.cref.nodes = state.nodes().clone();
            self.cref.edges = state.edges().clone();
            self.rendered_revision = Some(revision);
            self.last_error = None;
            if self.selected.is_some_and(|id| !self.cref.nodes.contains_key(&id)) {
                self.selected = None;
            }
        }

        self.render(false);

        if committed {
            if let Some(callback) = self.on_change.as_mut() {
                callback(&self.cref.nodes, &self.cref.edges);
            }
        }
    }

    fn render(&mut self, layout_changed: bool) {
        let node_changes = self
            .nodes
            .update(&mut self.cref, self.style.as_ref(), self.drag.live_node());
        self.nodes.set_selected(&mut self.cref.scene, self.selected);
        let anchor = self.drag.edge_drag().map(|d| d.anchor);
        self.nodes.set_dragging(&mut self.cref.scene, anchor);

        let edge_changes = self
            .edges
            .update(&mut self.cref, &self.nodes, self.drag.detached_edge());
        if !node_changes.is_empty() || !edge_changes.is_empty() {
            tracing::debug!(
                "Render: {} nodes added, {} moved, {} removed; {} edges added, {} updated, {} removed",
                node_changes.added.len(),
                node_changes.moved.len(),
                node_changes.removed.len(),
                edge_changes.added.len(),
                edge_changes.updated.len(),
                edge_changes.removed.len(),
            );
        }

        if layout_changed || !node_changes.is_empty() {
            self.portals = portal::collect(&self.cref, &self.nodes);
        }
        self.update_preview();
    }

    fn update_preview(&mut self) {
        let Some(drag) = self.drag.edge_drag() else {
            if self.preview.is_visible() {
                self.preview.hide(&mut self.cref.scene);
            }
            return;
        };
        let anchor = self
            .nodes
            .visual_layout(&self.cref, drag.anchor.node())
            .and_then(|layout| layout.port_center(drag.anchor.direction, drag.anchor.index()));
        match anchor {
            Some(anchor) => self.preview.show(
                &mut self.cref.scene,
                anchor,
                drag.pointer,
                drag.anchor.direction == PortDirection::Output,
            ),
            None => self.preview.hide(&mut self.cref.scene),
        }
    }

    fn offset(&self, client: Pos2) -> Pos2 {
        client - self.origin.to_vec2()
    }

    fn dispatch(&mut self, actions: impl IntoIterator<Item = Action>) {
        for action in actions {
            tracing::debug!("Dispatching {:?}", action);
            self.store.dispatch(action);
        }
    }

    /// Toolbox pickup of a block kind
    pub fn begin_block_drag(&mut self, kind: &str) -> Result<(), DragError> {
        if !self.cref.is_attached() {
            tracing::debug!("Ignoring block pickup before attach");
            return Ok(());
        }
        self.drag.begin_block(&self.cref, kind)
    }

    /// Drop the carried block at a client position
    pub fn drop_block(&mut self, client: Pos2) {
        let offset = self.offset(client);
        if let Some(action) = self.drag.drop_block(&self.cref, offset) {
            self.dispatch([action]);
            self.refresh();
        }
    }

    /// Press on the surface: ports start an edge drag, bodies select the
    /// node and start a move, empty space clears the selection.
    pub fn pointer_down(&mut self, client: Pos2) -> Option<Hit> {
        if !self.cref.is_attached() {
            return None;
        }
        let offset = self.offset(client);
        let hit = self.nodes.hit_test(&self.cref, offset);
        let started = match hit {
            Some(Hit::Port(port)) => {
                let started = self.drag.begin_edge(&self.cref, port, offset);
                if let Some(anchor) = self.drag.edge_drag().map(|d| d.anchor.node()) {
                    self.fill_preview(anchor);
                }
                started
            }
            Some(Hit::Node(id)) => {
                self.selected = Some(id);
                match self.cref.nodes.get(&id) {
                    Some(node) => self.drag.begin_node(&self.cref, node, offset),
                    None => Ok(()),
                }
            }
            None => {
                self.selected = None;
                Ok(())
            }
        };
        if let Err(e) = started {
            tracing::debug!("Pointer down ignored: {}", e);
        }
        self.render(false);
        hit
    }

    fn fill_preview(&mut self, node: NodeId) {
        let Some(node) = self.cref.nodes.get(&node) else {
            return;
        };
        if let Some(block) = self.cref.schema.get(&node.kind) {
            let fill = css_color(self.style.background_color(block));
            self.preview.set_fill(&mut self.cref.scene, fill);
        }
    }

    /// Pointer motion; re-renders only the transient drag state
    pub fn pointer_move(&mut self, client: Pos2) {
        let offset = self.offset(client);
        if self
            .drag
            .pointer_move(offset, self.cref.unit, self.cref.dimensions)
        {
            self.render(false);
        }
    }

    /// Release: commits the gesture, if any
    pub fn pointer_up(&mut self, client: Pos2) {
        if self.drag.is_idle() {
            return;
        }
        let offset = self.offset(client);
        let target = self.nodes.port_at(&self.cref, offset);
        let actions = self.drag.pointer_up(&self.cref, offset, target);
        self.dispatch(actions);
        self.refresh();
    }

    /// Abandon the active gesture without dispatching
    pub fn cancel_drag(&mut self) {
        if self.drag.cancel() {
            tracing::debug!("Drag cancelled");
            self.render(false);
        }
    }

    /// Pointer left the surface
    pub fn pointer_leave(&mut self) {
        self.cancel_drag();
    }

    /// Delete the selected node and its edges
    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected.take() {
            self.dispatch([Action::delete_node(id)]);
            self.refresh();
        }
    }

    /// Queue a content size reported by the host's layout engine
    pub fn notify_resize(&self, node: NodeId, size: Vec2) -> bool {
        self.observer.notify(node, size)
    }

    /// Apply queued resizes; edges are recomputed once for the whole batch.
    /// Returns the number of nodes whose layout changed.
    pub fn process_resizes(&mut self) -> usize {
        let resized = self
            .observer
            .take_pending()
            .into_iter()
            .filter(|(node, size)| self.nodes.handle_resize(&mut self.cref, *node, *size))
            .count();
        if resized > 0 {
            self.render(true);
        }
        resized
    }

    /// Select a node, or clear the selection
    pub fn select(&mut self, node: Option<NodeId>) {
        self.selected = node.filter(|id| self.cref.nodes.contains_key(id));
        self.nodes.set_selected(&mut self.cref.scene, self.selected);
    }

    /// Selected node
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Retained scene
    pub fn scene(&self) -> &Scene {
        &self.cref.scene
    }

    /// Scene, caches and committed snapshot
    pub fn canvas_ref(&self) -> &CanvasRef {
        &self.cref
    }

    /// Store the canvas dispatches into
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable store access. Call [`Canvas::refresh`] after changing it.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Host style
    pub fn style(&self) -> &dyn StyleProvider {
        self.style.as_ref()
    }

    /// Node views
    pub fn node_renderer(&self) -> &NodeRenderer {
        &self.nodes
    }

    /// Edge views
    pub fn edge_renderer(&self) -> &EdgeRenderer {
        &self.edges
    }

    /// Edge-drag preview
    pub fn preview(&self) -> &PreviewRenderer {
        &self.preview
    }

    /// Active gesture
    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    /// Content-box mount points, one per node
    pub fn portals(&self) -> &[Portal] {
        &self.portals
    }

    /// Resize observer shared with the node views
    pub fn observer(&self) -> &ResizeObserver {
        &self.observer
    }

    /// Client position of the canvas origin
    pub fn origin(&self) -> Pos2 {
        self.origin
    }

    /// Check whether [`Canvas::attach`] has run
    pub fn is_attached(&self) -> bool {
        self.cref.is_attached()
    }

    /// Error that aborted the latest render pass, cleared by the next good one
    pub fn last_error(&self) -> Option<&RenderError> {
        self.last_error.as_ref()
    }

    /// Serialise the scene as SVG markup
    pub fn to_svg(&self) -> String {
        svg::to_svg(&self.cref.scene)
    }
}
