//! Request payloads sent by the facades.
//!
//! Responses stay as `serde_json::Value`; only outgoing bodies are typed so
//! the wire field names (`userId`) live in one place.

use serde::{Deserialize, Serialize};

/// Payload for creating a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

/// Payload for replacing an existing post. Carries its own `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostUpdate {
    pub id: u64,
    pub title: String,
    pub body: String,
    #[serde(rename = "userId")]
    pub user_id: u64,
}
