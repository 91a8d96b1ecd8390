use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One record of the synchronized collection.
///
/// `id` is assigned by the remote system. A record created optimistically
/// carries a locally generated placeholder id until the remote write
/// confirms; `local_id` is `Some` exactly for that window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub id: String,
    pub content: String,
    pub author: Option<String>,
    pub url: Option<String>,
    pub votes: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_id: Option<String>,
}

impl EntityRecord {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            author: None,
            url: None,
            votes: 0,
            created_at: Utc::now(),
            local_id: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_votes(mut self, votes: u32) -> Self {
        self.votes = votes;
        self
    }

    /// Build the tentative record for an optimistic create. The placeholder
    /// id is replaced wholesale by the canonical record on confirmation.
    pub fn local_draft(draft: &EntityDraft) -> Self {
        let placeholder = uuid::Uuid::new_v4().to_string();
        Self {
            id: placeholder.clone(),
            content: draft.content.clone(),
            author: draft.author.clone(),
            url: draft.url.clone(),
            votes: 0,
            created_at: Utc::now(),
            local_id: Some(placeholder),
        }
    }

    /// Whether this record is still waiting for its canonical id.
    pub fn is_unconfirmed(&self) -> bool {
        self.local_id.is_some()
    }

    pub fn matches_draft(&self, draft: &EntityDraft) -> bool {
        self.content == draft.content && self.author == draft.author && self.url == draft.url
    }

    /// Stable key over the identity fields, used as the merge fallback when
    /// a record's id is still a placeholder.
    pub fn content_key(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.content.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.author.as_deref().unwrap_or("").as_bytes());
        hasher.update([0u8]);
        hasher.update(self.url.as_deref().unwrap_or("").as_bytes());
        hasher.finalize().into()
    }
}

/// Creation payload sent to the remote resource. Serializes without an id;
/// the remote assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDraft {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl EntityDraft {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author: None,
            url: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Push-channel payload: one "entity added" event, delivered at least once
/// and possibly back to the client that issued the create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionEvent {
    pub entity: EntityRecord,
}

impl SubscriptionEvent {
    /// Decode a raw push-channel payload.
    pub fn from_json(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}
