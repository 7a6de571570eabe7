// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions and edge endpoints.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port (top edge of a block)
    Input,
    /// Output port (bottom edge of a block)
    Output,
}

impl PortDirection {
    /// The direction a compatible peer port must have
    pub fn opposite(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
        }
    }
}

/// Data type carried by a port
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PortType {
    /// Accepts anything
    #[default]
    Any,
    /// Boolean value
    Bool,
    /// Integer value
    Int,
    /// Floating point value
    Float,
    /// Numeric vector
    Vector,
    /// Color (RGBA)
    Color,
    /// String value
    String,
    /// Host-defined type, only compatible with itself
    Custom(String),
}

impl PortType {
    /// Check if a value of this type can flow into a port of `other` type
    pub fn can_connect_to(&self, other: &PortType) -> bool {
        if matches!(self, Self::Any) || matches!(other, Self::Any) {
            return true;
        }

        if self == other {
            return true;
        }

        matches!(
            (self, other),
            (Self::Int, Self::Float)
                | (Self::Float, Self::Int)
                | (Self::Bool, Self::Int)
                | (Self::Float, Self::Vector)
                | (Self::Color, Self::Vector)
                | (Self::Vector, Self::Color)
        )
    }
}

/// A port declared by a block in the schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortDef {
    /// Port label
    pub name: String,
    /// Data type
    #[serde(default)]
    pub port_type: PortType,
}

impl PortDef {
    /// Create a port definition
    pub fn new(name: impl Into<String>, port_type: PortType) -> Self {
        Self {
            name: name.into(),
            port_type,
        }
    }
}

/// An edge endpoint: a node and the index of one of its ports.
///
/// Whether the index addresses an input or an output is implied by the side of
/// the edge it is used on (sources are outputs, targets are inputs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    /// Owning node
    pub node: NodeId,
    /// Index into the block's input or output list
    pub index: usize,
}

impl PortRef {
    /// Create an endpoint
    pub fn new(node: NodeId, index: usize) -> Self {
        Self { node, index }
    }
}

/// A fully qualified port: endpoint plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortKey {
    /// Node and port index
    pub port: PortRef,
    /// Which list the index refers to
    pub direction: PortDirection,
}

impl PortKey {
    /// Input port `index` of `node`
    pub fn input(node: NodeId, index: usize) -> Self {
        Self {
            port: PortRef::new(node, index),
            direction: PortDirection::Input,
        }
    }

    /// Output port `index` of `node`
    pub fn output(node: NodeId, index: usize) -> Self {
        Self {
            port: PortRef::new(node, index),
            direction: PortDirection::Output,
        }
    }

    /// Owning node
    pub fn node(&self) -> NodeId {
        self.port.node
    }

    /// Port index
    pub fn index(&self) -> usize {
        self.port.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_connects_to_everything() {
        assert!(PortType::Any.can_connect_to(&PortType::Color));
        assert!(PortType::Custom("mesh".into()).can_connect_to(&PortType::Any));
    }

    #[test]
    fn test_implicit_conversions() {
        assert!(PortType::Int.can_connect_to(&PortType::Float));
        assert!(PortType::Float.can_connect_to(&PortType::Vector));
        assert!(!PortType::Vector.can_connect_to(&PortType::Float));
        assert!(!PortType::String.can_connect_to(&PortType::Bool));
    }

    #[test]
    fn test_custom_types_match_by_name() {
        let mesh = PortType::Custom("mesh".into());
        assert!(mesh.can_connect_to(&PortType::Custom("mesh".into())));
        assert!(!mesh.can_connect_to(&PortType::Custom("image".into())));
    }

    #[test]
    fn test_direction_opposite() {
        assert_eq!(PortDirection::Input.opposite(), PortDirection::Output);
        assert_eq!(PortDirection::Output.opposite(), PortDirection::Input);
    }
}
