//! Utility functions for common operations.
//!
//! - **Text processing**: Unicode-aware width calculation and truncation for
//!   terminal rendering.
//! - **Paste sanitization**: normalizing clipboard payloads before they reach
//!   the notes buffer.

mod text;

pub use text::{display_width, sanitize_paste, truncate_to_width};

/// Maximum allowed length for single-line prompt inputs (names, titles, passwords).
pub const MAX_PROMPT_LENGTH: usize = 256;
