//! HTTP client for the note backend.
//!
//! The backend wraps every response in a `{ statusCode, message, data }`
//! envelope; [`client::ApiClient`] unwraps it and maps failures into
//! [`client::ApiError`] values carrying a status code and a user-facing
//! message for alert display.

pub mod client;
pub mod types;

pub use client::{Ack, ApiClient, ApiError};
pub use types::{Category, Topic, TopicNotes, TopicSummary};
