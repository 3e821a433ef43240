//! Dialog rendering helpers and the filter form

pub mod common;
pub mod filter_form;
pub mod system_dialogs;

pub use filter_form::{FilterField, FilterFormDialog};
