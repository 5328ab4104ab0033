//! Typed subset of Patreon's JSON:API comment documents.
//!
//! Only the fields the question list needs are modelled; everything else in
//! the payload is ignored by serde.

use serde::{Deserialize, Serialize};

/// One page of `/api/posts/{id}/comments2`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentsPage {
    #[serde(default)]
    pub data: Vec<Resource>,
    #[serde(default)]
    pub included: Vec<Resource>,
    #[serde(default)]
    pub links: Option<Links>,
}

impl CommentsPage {
    /// URL of the next page, if any.
    pub fn next_url(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|l| l.next.as_deref())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub next: Option<String>,
}

/// Generic JSON:API resource (`comment`, `user`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub relationships: Relationships,
}

impl Resource {
    pub fn is_comment(&self) -> bool {
        self.kind == "comment"
    }

    pub fn is_user(&self) -> bool {
        self.kind == "user"
    }

    /// A comment with a non-null `parent` relationship is a reply.
    pub fn is_reply(&self) -> bool {
        self.relationships
            .parent
            .as_ref()
            .is_some_and(|p| p.data.is_some())
    }

    pub fn commenter_id(&self) -> Option<&str> {
        self.relationships
            .commenter
            .as_ref()
            .and_then(|c| c.data.as_ref())
            .map(|d| d.id.as_str())
    }
}

/// Union of the attribute fields used from comments and users.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attributes {
    /// Comment text.
    #[serde(default)]
    pub body: Option<String>,
    /// User display name.
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Relationships {
    #[serde(default)]
    pub commenter: Option<Relationship>,
    #[serde(default)]
    pub parent: Option<Relationship>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<ResourceRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceRef {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Comment counts logged after a full fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentStats {
    pub total: usize,
    pub top_level: usize,
    pub replies: usize,
}
