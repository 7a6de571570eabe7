// SPDX-License-Identifier: MIT OR Apache-2.0
//! `BlockFlow` demo - drives a scripted editing session through the canvas.
//!
//! Usage:
//!
//! ```text
//! blockflow_demo [--schema blocks.ron] [--config canvas.ron] [--theme dark|light] [--json]
//! ```
//!
//! Without `--schema` the arithmetic preset is used. The session drops a few
//! blocks, wires them up by dragging between ports, resizes one node's
//! content and moves another, then prints the scene as SVG (or the committed
//! graph as JSON with `--json`).

mod theme;

use blockflow_editor_canvas::{Canvas, CanvasConfig, ConfigError, DragError};
use blockflow_editor_graph::presets::arithmetic_schema;
use blockflow_editor_graph::{
    Block, Edge, EditorStore, Node, NodeId, PortKey, Schema, SchemaError, Store,
};
use clap::Parser;
use egui::{Pos2, Vec2};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use theme::Theme;
use thiserror::Error;

/// Demo failures
#[derive(Debug, Error)]
enum DemoError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Drag error: {0}")]
    Drag(#[from] DragError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Session step failed: {0}")]
    Session(String),
}

/// Scripted `BlockFlow` editing session
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Block schema in RON; the arithmetic preset when omitted
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Canvas configuration in RON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Canvas theme
    #[arg(long, value_enum, default_value = "dark")]
    theme: Theme,

    /// Print the committed graph as JSON instead of the SVG
    #[arg(long)]
    json: bool,
}

/// Committed graph as last reported by the canvas
#[derive(Debug, Default, serde::Serialize)]
struct Snapshot {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

fn main() {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new("blockflow_editor_canvas=debug,blockflow_editor_graph=debug")
    });
    // Logs go to stderr so stdout stays clean for the SVG
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting BlockFlow demo v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli) {
        tracing::error!("Demo failed: {e}");
        std::process::exit(1);
    }
}

fn run(args: Cli) -> Result<(), DemoError> {
    let schema = match &args.schema {
        Some(path) => Schema::load(path)?,
        None => arithmetic_schema(),
    };
    let config = match &args.config {
        Some(path) => CanvasConfig::load(path)?,
        None => CanvasConfig::default(),
    };
    tracing::info!(
        "{} block kinds, {}x{} grid at {}px",
        schema.len(),
        config.dimensions[0],
        config.dimensions[1],
        config.unit
    );

    let schema = Arc::new(schema);
    let store = EditorStore::new(Arc::clone(&schema));
    // Content grows with the number of ports, as a form with one row per port would
    let measure = |_node: &Node, block: &Block| {
        let rows = block.inputs.len().max(block.outputs.len()).max(1);
        Some(Vec2::new(120.0, 20.0 * rows as f32))
    };
    let width = config.width();
    let mut canvas = Canvas::new(config, schema, store, args.theme, measure)?;

    let snapshot = Rc::new(RefCell::new(Snapshot::default()));
    let sink = Rc::clone(&snapshot);
    canvas.set_on_change(move |nodes, edges| {
        *sink.borrow_mut() = Snapshot {
            nodes: nodes.values().cloned().collect(),
            edges: edges.values().copied().collect(),
        };
    });

    let origin = Pos2::new(10.0, 10.0);
    canvas.attach(origin, width);
    session(&mut canvas, origin)?;

    if let Some(error) = canvas.last_error() {
        tracing::warn!("Last render pass failed: {error}");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&*snapshot.borrow())?);
    } else {
        println!("{}", canvas.to_svg());
    }
    Ok(())
}

/// Kinds dropped by the session, with drop offsets in canvas pixels
const DROPS: [(&str, [f32; 2]); 4] = [
    ("number", [40.0, 20.0]),
    ("number", [240.0, 20.0]),
    ("add", [120.0, 200.0]),
    ("display", [120.0, 360.0]),
];

fn session(canvas: &mut Canvas<EditorStore>, origin: Pos2) -> Result<(), DemoError> {
    let client = |offset: Pos2| offset + origin.to_vec2();

    for (kind, [x, y]) in DROPS {
        if !canvas.canvas_ref().schema.contains(kind) {
            tracing::warn!("Schema has no {kind:?} block, skipping drop");
            continue;
        }
        canvas.begin_block_drag(kind)?;
        canvas.drop_block(client(Pos2::new(x, y)));
    }

    let ids: Vec<NodeId> = canvas.store().state().nodes().keys().copied().collect();
    let [a, b, sum, display]: [NodeId; 4] = ids.try_into().map_err(|ids: Vec<NodeId>| {
        DemoError::Session(format!("expected four nodes, got {}", ids.len()))
    })?;

    connect(canvas, origin, PortKey::output(a, 0), PortKey::input(sum, 0))?;
    // Dragged from the input end; the canvas flips it to output → input
    connect(canvas, origin, PortKey::input(sum, 1), PortKey::output(b, 0))?;
    connect(canvas, origin, PortKey::output(sum, 0), PortKey::input(display, 0))?;

    // The display's content grew; a burst of notifications lands as one update
    for height in [30.0, 45.0, 60.0] {
        canvas.notify_resize(display, Vec2::new(160.0, height));
    }
    let resized = canvas.process_resizes();
    tracing::info!("{resized} node(s) resized");

    // Drag the sum node three cells to the right by its body
    let grip = canvas
        .node_renderer()
        .visual_layout(canvas.canvas_ref(), sum)
        .map(|layout| layout.frame().center())
        .ok_or_else(|| DemoError::Session(format!("node {sum} is not rendered")))?;
    let unit = canvas.canvas_ref().unit;
    canvas.pointer_down(client(grip));
    for step in 1..=3 {
        canvas.pointer_move(client(grip + Vec2::new(unit * step as f32, 0.0)));
    }
    canvas.pointer_up(client(grip + Vec2::new(unit * 3.0, 0.0)));

    canvas.select(Some(display));
    tracing::info!(
        "Session done: {} nodes, {} edges, {} portals",
        canvas.store().state().nodes().len(),
        canvas.store().state().edges().len(),
        canvas.portals().len()
    );
    Ok(())
}

/// Drag from one port to another
fn connect(
    canvas: &mut Canvas<EditorStore>,
    origin: Pos2,
    from: PortKey,
    to: PortKey,
) -> Result<(), DemoError> {
    let center = |canvas: &Canvas<EditorStore>, key: PortKey| {
        canvas
            .node_renderer()
            .port_center(canvas.canvas_ref(), key)
            .map(|p| p + origin.to_vec2())
            .ok_or_else(|| DemoError::Session(format!("port {key:?} has no position")))
    };
    let start = center(canvas, from)?;
    let end = center(canvas, to)?;

    let before = canvas.store().state().edges().len();
    canvas.pointer_down(start);
    canvas.pointer_move(start.lerp(end, 0.5));
    canvas.pointer_move(end);
    canvas.pointer_up(end);
    if canvas.store().state().edges().len() == before {
        tracing::warn!("Connecting {from:?} to {to:?} was rejected");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["blockflow_demo"]).unwrap();
        assert!(cli.schema.is_none());
        assert!(cli.config.is_none());
        assert_eq!(cli.theme, Theme::Dark);
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "blockflow_demo",
            "--schema",
            "blocks.ron",
            "--theme",
            "light",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.schema, Some(PathBuf::from("blocks.ron")));
        assert_eq!(cli.theme, Theme::Light);
        assert!(cli.json);
    }

    #[test]
    fn test_cli_rejects_unknown_theme() {
        assert!(Cli::try_parse_from(["blockflow_demo", "--theme", "neon"]).is_err());
    }
}
