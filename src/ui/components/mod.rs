//! Reusable UI components

pub mod columns;

// Component architecture
pub mod dialog_component;
pub mod dialogs;
pub mod source_table_component;
pub mod status_bar;

// Component exports
pub use dialog_component::DialogComponent;
pub use source_table_component::SourceTableComponent;
pub use status_bar::StatusBar;
