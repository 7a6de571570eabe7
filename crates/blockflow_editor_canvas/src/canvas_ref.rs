// SPDX-License-Identifier: MIT OR Apache-2.0
//! Live canvas handle shared by the renderers during a pass.

use crate::config::CanvasConfig;
use crate::scene::{ElementId, Scene, Tag};
use blockflow_editor_graph::{Edge, EdgeId, Node, NodeId, Schema};
use egui::Vec2;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Top-level scene groups, created when the canvas is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layers {
    /// `<style>` sheet
    pub style: ElementId,
    /// `g.edges`, drawn below nodes
    pub edges: ElementId,
    /// `g.nodes`
    pub nodes: ElementId,
    /// `g.preview`, drawn on top
    pub preview: ElementId,
}

/// Scene plus the caches and snapshots the renderers read.
///
/// Owned by the canvas. Renderers borrow it for the duration of a pass and
/// write only the scene and the content-dimension cache.
#[derive(Debug)]
pub struct CanvasRef {
    /// Scene graph
    pub scene: Scene,
    /// Scene layers, `None` until attached
    pub layers: Option<Layers>,
    /// Measured content box per node
    pub content_dimensions: HashMap<NodeId, Vec2>,
    /// Surface size in pixels
    pub canvas_dimensions: Vec2,
    /// Pixel size of one grid cell
    pub unit: f32,
    /// Grid size in cells
    pub dimensions: [u32; 2],
    /// Block catalogue
    pub schema: Arc<Schema>,
    /// Nodes as of the last committed snapshot
    pub nodes: IndexMap<NodeId, Node>,
    /// Edges as of the last committed snapshot
    pub edges: IndexMap<EdgeId, Edge>,
}

impl CanvasRef {
    /// Create an unattached canvas ref
    pub fn new(config: &CanvasConfig, schema: Arc<Schema>) -> Self {
        Self {
            scene: Scene::new(),
            layers: None,
            content_dimensions: HashMap::new(),
            canvas_dimensions: Vec2::new(config.width(), config.height()),
            unit: config.unit,
            dimensions: config.dimensions,
            schema,
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
        }
    }

    /// Build the layer skeleton under the root on first call; later calls
    /// return the existing layers.
    pub fn attach(&mut self) -> Layers {
        if let Some(layers) = self.layers {
            return layers;
        }
        let root = self.scene.root();
        let layers = Layers {
            style: self.scene.append(root, Tag::Style),
            edges: self.scene.append_classed(root, Tag::Group, "edges"),
            nodes: self.scene.append_classed(root, Tag::Group, "nodes"),
            preview: self.scene.append_classed(root, Tag::Group, "preview"),
        };
        self.layers = Some(layers);
        layers
    }

    /// Check whether the scene skeleton exists
    pub fn is_attached(&self) -> bool {
        self.layers.is_some()
    }

    /// Check whether a pixel offset lies on the canvas surface
    pub fn contains(&self, offset: egui::Pos2) -> bool {
        offset.x >= 0.0
            && offset.y >= 0.0
            && offset.x < self.canvas_dimensions.x
            && offset.y < self.canvas_dimensions.y
    }
}
