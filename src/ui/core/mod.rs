//! Core UI functionality for sourcedeck.
//!
//! - [`actions`] - Action definitions and UI state transitions
//! - [`component`] - Base component trait and rendering abstractions
//! - [`event_handler`] - Terminal event polling
//! - [`task_manager`] - Background request tracking
//!
//! Components turn key presses into [`Action`]s. The app component resolves
//! the actions that need the backend into dispatcher calls and spawns them
//! through the [`TaskManager`]. Their results come back as API events that
//! are folded into the source store.

pub mod actions;
pub mod component;
pub mod event_handler;
pub mod task_manager;

pub use actions::{Action, DialogType, ViewMode};
pub use component::Component;
pub use event_handler::{EventHandler, EventType};
pub use task_manager::{TaskId, TaskManager};
