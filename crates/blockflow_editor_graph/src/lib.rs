// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph model for the `BlockFlow` editor.
//!
//! This crate holds everything the canvas reads and dispatches:
//! - Block schema with typed ports and a pluggable connection rule
//! - Node and edge entities keyed by integer IDs
//! - Editor actions and the [`Store`] interface
//! - A reference reducer with cascade delete
//!
//! The canvas itself never mutates this state; it only dispatches actions.

pub mod action;
pub mod edge;
pub mod node;
pub mod port;
pub mod presets;
pub mod schema;
pub mod state;
pub mod store;

pub use action::Action;
pub use edge::{Edge, EdgeId};
pub use node::{Node, NodeId};
pub use port::{PortDef, PortDirection, PortKey, PortRef, PortType};
pub use schema::{Block, ConnectionRule, PortSpec, Schema, SchemaError, TypedPorts};
pub use state::{Applied, EditorState, StateError};
pub use store::{EditorStore, Store};
