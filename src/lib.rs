//! Theme library - light/dark color themes for the recovery-house dashboard.
//!
//! This library exposes the core functionality of the `rtheme` CLI for use in
//! tests and embedding applications.
//!
//! # Modules
//!
//! - `theme`: Palette, variant, and theme value types
//! - `store`: Backing-store port with SQLite and in-memory adapters
//! - `service`: Theme operations for one caller, with ownership policy
//! - `context`: Application-wide current theme and mode
//! - `editor`: Draft editing, categories, and the phone preview
//! - `error`: Error types with user-recoverable hints
//! - `output`: Output mode abstraction (robot/human)
//! - `config`: Configuration file handling
#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod context;
pub mod editor;
pub mod error;
pub mod logging;
pub mod output;
pub mod service;
pub mod store;
pub mod theme;
