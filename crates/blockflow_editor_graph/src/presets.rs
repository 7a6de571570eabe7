// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ready-made schemas.
//!
//! Hosts normally supply their own schema; these cover the common dataflow
//! demos and give tests a realistic block catalogue.

use crate::port::{PortDef, PortType};
use crate::schema::{Block, Schema};

/// Arithmetic dataflow: constants, binary operators and a display sink
pub fn arithmetic_schema() -> Schema {
    Schema::new()
        // Sources
        .with_block(
            "number",
            Block::new("Number")
                .with_color([90, 140, 200])
                .with_output(PortDef::new("value", PortType::Float)),
        )
        .with_block(
            "text",
            Block::new("Text")
                .with_color([150, 120, 190])
                .with_output(PortDef::new("value", PortType::String)),
        )
        // Operators
        .with_block(
            "add",
            Block::new("Add")
                .with_color([200, 150, 80])
                .with_input(PortDef::new("a", PortType::Float))
                .with_input(PortDef::new("b", PortType::Float))
                .with_output(PortDef::new("sum", PortType::Float)),
        )
        .with_block(
            "multiply",
            Block::new("Multiply")
                .with_color([200, 150, 80])
                .with_input(PortDef::new("a", PortType::Float))
                .with_input(PortDef::new("b", PortType::Float))
                .with_output(PortDef::new("product", PortType::Float)),
        )
        .with_block(
            "split",
            Block::new("Split")
                .with_color([120, 180, 120])
                .with_input(PortDef::new("value", PortType::Vector))
                .with_output(PortDef::new("x", PortType::Float))
                .with_output(PortDef::new("y", PortType::Float)),
        )
        // Sinks
        .with_block(
            "display",
            Block::new("Display")
                .with_color([180, 80, 80])
                .with_input(PortDef::new("value", PortType::Any)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_schema() {
        let schema = arithmetic_schema();
        assert_eq!(schema.len(), 6);
        assert_eq!(schema.get("add").unwrap().inputs.len(), 2);
        assert!(schema.get("display").unwrap().outputs.is_empty());
    }
}
