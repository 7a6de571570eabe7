// SPDX-License-Identifier: MIT OR Apache-2.0
//! Block schema: the catalogue of node kinds a canvas can hold.

use crate::port::{PortDef, PortDirection, PortRef};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Block (node kind) definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Display name
    pub name: String,
    /// Header color (optional)
    #[serde(default)]
    pub color: Option<[u8; 3]>,
    /// Input ports, top edge
    #[serde(default)]
    pub inputs: Vec<PortDef>,
    /// Output ports, bottom edge
    #[serde(default)]
    pub outputs: Vec<PortDef>,
}

impl Block {
    /// Create a block with no ports
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Set the header color
    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = Some(color);
        self
    }

    /// Append an input port
    pub fn with_input(mut self, port: PortDef) -> Self {
        self.inputs.push(port);
        self
    }

    /// Append an output port
    pub fn with_output(mut self, port: PortDef) -> Self {
        self.outputs.push(port);
        self
    }

    /// Ports on one side of the block
    pub fn ports(&self, direction: PortDirection) -> &[PortDef] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }

    /// Get a port by direction and index
    pub fn port(&self, direction: PortDirection, index: usize) -> Option<&PortDef> {
        self.ports(direction).get(index)
    }
}

/// One side of a prospective edge, as seen by a [`ConnectionRule`].
#[derive(Debug, Clone, Copy)]
pub struct PortSpec<'a> {
    /// Node and port index
    pub port: PortRef,
    /// Block kind of the node
    pub kind: &'a str,
    /// Port definition from the schema
    pub def: &'a PortDef,
}

/// Decides whether an output port may feed an input port.
///
/// Direction is already checked by the caller: `source` is always an output and
/// `target` always an input.
pub trait ConnectionRule: Send + Sync {
    /// Check whether the connection is allowed
    fn can_connect(&self, source: PortSpec<'_>, target: PortSpec<'_>) -> bool;
}

impl<F> ConnectionRule for F
where
    F: Fn(PortSpec<'_>, PortSpec<'_>) -> bool + Send + Sync,
{
    fn can_connect(&self, source: PortSpec<'_>, target: PortSpec<'_>) -> bool {
        self(source, target)
    }
}

/// Default rule: port types must be compatible and a node may not feed itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedPorts {
    /// Allow edges whose source and target are the same node
    pub allow_self_loops: bool,
}

impl ConnectionRule for TypedPorts {
    fn can_connect(&self, source: PortSpec<'_>, target: PortSpec<'_>) -> bool {
        if !self.allow_self_loops && source.port.node == target.port.node {
            return false;
        }
        source.def.port_type.can_connect_to(&target.def.port_type)
    }
}

#[derive(Clone)]
struct Rule(Arc<dyn ConnectionRule>);

impl Default for Rule {
    fn default() -> Self {
        Self(Arc::new(TypedPorts::default()))
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConnectionRule")
    }
}

/// Immutable mapping from block kind to block definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Blocks by kind, in toolbox order
    blocks: IndexMap<String, Block>,
    #[serde(skip)]
    rule: Rule,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block kind
    pub fn with_block(mut self, kind: impl Into<String>, block: Block) -> Self {
        self.blocks.insert(kind.into(), block);
        self
    }

    /// Replace the connection rule
    pub fn with_rule(mut self, rule: impl ConnectionRule + 'static) -> Self {
        self.rule = Rule(Arc::new(rule));
        self
    }

    /// Get a block by kind
    pub fn get(&self, kind: &str) -> Option<&Block> {
        self.blocks.get(kind)
    }

    /// Check whether a kind exists
    pub fn contains(&self, kind: &str) -> bool {
        self.blocks.contains_key(kind)
    }

    /// All kinds in declaration order
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(String::as_str)
    }

    /// All blocks with their kinds
    pub fn blocks(&self) -> impl Iterator<Item = (&str, &Block)> {
        self.blocks.iter().map(|(k, b)| (k.as_str(), b))
    }

    /// Number of block kinds
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the schema declares no blocks
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Resolve a port definition
    pub fn port(&self, kind: &str, direction: PortDirection, index: usize) -> Option<&PortDef> {
        self.get(kind)?.port(direction, index)
    }

    /// Ask the connection rule whether `source` (an output of a `source_kind`
    /// node) may feed `target` (an input of a `target_kind` node).
    ///
    /// Returns `false` when either port does not exist.
    pub fn can_connect(
        &self,
        source: PortRef,
        source_kind: &str,
        target: PortRef,
        target_kind: &str,
    ) -> bool {
        let Some(source_def) = self.port(source_kind, PortDirection::Output, source.index) else {
            return false;
        };
        let Some(target_def) = self.port(target_kind, PortDirection::Input, target.index) else {
            return false;
        };

        self.rule.0.can_connect(
            PortSpec {
                port: source,
                kind: source_kind,
                def: source_def,
            },
            PortSpec {
                port: target,
                kind: target_kind,
                def: target_def,
            },
        )
    }

    /// Parse a schema from RON text
    pub fn from_ron(text: &str) -> Result<Self, SchemaError> {
        let schema: Schema = ron::from_str(text).map_err(|e| SchemaError::Parse(e.to_string()))?;
        if schema.is_empty() {
            return Err(SchemaError::Empty);
        }
        Ok(schema)
    }

    /// Load a schema from a RON file
    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }
}

/// Error when loading a schema
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// File could not be read
    #[error("Failed to read schema: {0}")]
    Io(#[from] std::io::Error),

    /// RON syntax or shape error
    #[error("Invalid schema: {0}")]
    Parse(String),

    /// The schema declares no blocks
    #[error("Schema declares no blocks")]
    Empty,
}
