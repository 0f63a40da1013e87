use serde::{Deserialize, Serialize};

/// Public profile row. Password hashes are queried separately by the auth
/// layer and never leave the database module.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub created_at: String,
    pub last_login_at: Option<String>,
    pub banned: bool,
    pub ban_reason: Option<String>,
    pub banned_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub token: String,
    pub expires_at: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub company: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub author_id: String,
    /// Day the entry was created, `YYYY-MM-DD`.
    pub date: String,
    pub likes: i64,
    pub dislikes: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: String,
    pub entry_id: String,
    pub content: String,
    pub author: String,
    pub author_id: String,
    pub date: String,
    pub likes: i64,
    pub dislikes: i64,
    pub created_at: String,
}

/// Day component of a `YYYY-MM-DD HH:MM:SS` timestamp.
pub fn date_of(created_at: &str) -> String {
    created_at.get(..10).unwrap_or(created_at).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Like,
    Dislike,
}

impl VoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteKind::Like => "like",
            VoteKind::Dislike => "dislike",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "like" => Some(VoteKind::Like),
            "dislike" => Some(VoteKind::Dislike),
            _ => None,
        }
    }

    /// Column on entries that this vote kind counts toward.
    pub fn counter_column(&self) -> &'static str {
        match self {
            VoteKind::Like => "likes",
            VoteKind::Dislike => "dislikes",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub user_id: String,
    pub entry_id: String,
    pub kind: VoteKind,
    pub created_at: String,
}
