//! Wire types for the note backend.

use serde::{Deserialize, Serialize};

/// A category as returned by the list endpoint, with its topic summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub topics: Vec<TopicSummary>,
}

/// Minimal topic reference embedded in a [`Category`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSummary {
    pub id: String,
    pub title: String,
}

/// A full topic, including its notes content and optional audio attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
}

/// Back-reference from a topic to its owning category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub name: String,
}

/// Notes payload for a topic, with linear predecessor/successor links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicNotes {
    /// Previous topic in the category's ordering, if any.
    #[serde(default)]
    pub behavior: Option<Topic>,
    pub current: Topic,
    /// Next topic in the category's ordering, if any.
    #[serde(default)]
    pub next: Option<Topic>,
}
