//! Constants used throughout the application
//!
//! This module centralizes magic strings, UI text, and other constant values
//! to improve maintainability and consistency.

// Dispatcher notifications
pub const ERROR_INVALID_ACTION_TYPE: &str = "❌ Invalid action type for API request";
pub const ERROR_REQUEST_REJECTED: &str = "❌ Request rejected by the server";

// Success Messages
pub const SUCCESS_SAVE_REQUEST_ACCEPTED: &str = "✅ Save request accepted";
pub const SUCCESS_SAVE_REQUEST_DECLINED: &str = "✅ Save request declined";
pub const SUCCESS_FAVORITE_ADDED: &str = "✅ Added to favorites";
pub const SUCCESS_FAVORITE_REMOVED: &str = "✅ Removed from favorites";

// UI Messages
pub const CONFIG_GENERATED: &str = "✅ Generated default configuration file";
pub const ERROR_NO_API_TOKEN: &str = "❌ Error: API token environment variable not set";
pub const DIALOG_TITLE_DEBUG_LOGS: &str = "🔍 Debug Logs - Press 'Esc', 'G' or 'q' to close";
pub const TITLE_ALL_SOURCES: &str = "Sources";
pub const TITLE_PENDING_SOURCES: &str = "Pending save requests";
pub const TITLE_SAVED_SOURCES: &str = "Saved sources";
pub const NO_SOURCES: &str = "No sources match the current filters";
pub const LOADING_SOURCES: &str = "Loading sources…";

// Cell glyphs
pub const GLYPH_FAVORITE: &str = "★";
pub const GLYPH_NOT_FAVORITE: &str = "☆";
pub const GLYPH_EXISTS: &str = "✓";
pub const GLYPH_MISSING: &str = "—";
pub const GLYPH_FINDER: &str = "PDF";

// Table layout
/// Rows-per-page choices offered by the pagination footer
pub const ROWS_PER_PAGE_OPTIONS: [u32; 4] = [10, 25, 50, 100];
/// Rows per page used when nothing is configured
pub const DEFAULT_ROWS_PER_PAGE: u32 = 10;
/// First page number understood by the backend
pub const FIRST_PAGE: u32 = 1;

/// Name of the favorites listing on the backend
pub const FAVORITES_LIST_NAME: &str = "favorites";
