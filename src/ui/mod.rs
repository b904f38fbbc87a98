//! Terminal User Interface module.
//!
//! This module provides the TUI for the note client, including:
//! - Main event loop (`run`)
//! - Input handling for list, tree, and editor screens plus overlays
//! - Rendering for categories, topics, the notes editor, and the audio bar
//! - Background task event processing
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard and paste input handling
//! - `events` - Background task event processing
//! - `render` - Screen rendering dispatch and overlays
//! - `helpers` - Background task spawning
//! - `categories` - Category list widget
//! - `topics` - Topic list widget
//! - `tree` - Navigation tree sidebar widget
//! - `editor` - Notes editor and audio bar widgets
//! - `status` - Status bar widget

mod categories;
mod editor;
mod events;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod render;
mod status;
mod topics;
mod tree;

// Re-export the public API
pub use loop_runner::{run, Action};
