//! Sourcedeck - A terminal browser for astronomical source catalogs
//!
//! This library provides a terminal interface over a source catalog's web
//! API: a paginated, sortable and filterable table of sources, favorites,
//! and review of pending save requests for a group.
//!
//! # Modules
//!
//! * [`api`] - HTTP calls wrapped into request lifecycle events
//! * [`config`] - Application configuration management
//! * [`sources`] - Source records, backend actions, filters and the store
//! * [`ui`] - Terminal user interface components
//! * [`utils`] - Coordinate and date formatting helpers

/// Request dispatcher, transport and notifications
pub mod api;

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// Logging utilities for debugging and error tracking
pub mod logger;

/// Source records, the actions that fetch and change them, and the store
pub mod sources;

/// Terminal user interface components and rendering
pub mod ui;

/// Utility functions for coordinates and date/time handling
pub mod utils;
