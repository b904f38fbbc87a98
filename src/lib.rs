//! Terminal client for a hierarchical note-taking REST backend.
//!
//! Categories contain topics, topics contain plain-text notes (optionally
//! with an audio attachment). Create/update/delete operations are gated by
//! an admin session flag validated by the backend.

pub mod api;
pub mod app;
pub mod audio;
pub mod config;
pub mod editor;
pub mod session;
pub mod ui;
pub mod util;
