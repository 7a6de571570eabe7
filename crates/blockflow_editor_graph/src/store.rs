// SPDX-License-Identifier: MIT OR Apache-2.0
//! Dispatch interface consumed by the canvas, and a reference store.

use crate::action::Action;
use crate::state::{Applied, EditorState, StateError};
use crate::schema::Schema;
use std::sync::Arc;

/// State container the canvas dispatches into and reads committed state from
pub trait Store {
    /// Request a state change
    fn dispatch(&mut self, action: Action);

    /// Current committed state
    fn state(&self) -> &EditorState;
}

/// Reference store: applies actions with [`EditorState::apply`].
///
/// Rejected actions are logged and dropped, leaving the state untouched.
#[derive(Debug, Clone)]
pub struct EditorStore {
    schema: Arc<Schema>,
    state: EditorState,
}

impl EditorStore {
    /// Create an empty store for a schema
    pub fn new(schema: Arc<Schema>) -> Self {
        Self::with_state(schema, EditorState::new())
    }

    /// Create a store around existing state
    pub fn with_state(schema: Arc<Schema>, state: EditorState) -> Self {
        Self { schema, state }
    }

    /// Apply an action, returning the rejection reason on failure
    pub fn try_dispatch(&mut self, action: Action) -> Result<Applied, StateError> {
        self.state.apply(&self.schema, action)
    }

    /// Mutable access for hosts seeding the state directly
    pub fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }

    /// Schema the store validates against
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
}

impl Store for EditorStore {
    fn dispatch(&mut self, action: Action) {
        match self.try_dispatch(action) {
            Ok(applied) => tracing::debug!("Applied {:?}", applied),
            Err(e) => tracing::warn!("Rejected action: {}", e),
        }
    }

    fn state(&self) -> &EditorState {
        &self.state
    }
}
