//! discorder - terminal chat client UI
//!
//! This library provides the layout tree, widgets and application state.
//! The binary in `main.rs` wires them to a real terminal.

pub mod app;
pub mod config;
pub mod history;
pub mod paths;
pub mod terminal;
pub mod ui;
