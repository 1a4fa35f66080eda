use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ModerationStatus {
    Pending,
    Approved,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
        }
    }

    pub fn parse_status(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ModerationStatus::Pending),
            "approved" => Some(ModerationStatus::Approved),
            _ => None,
        }
    }
}

/// A stored quote. `quote` holds the body with newlines already rewritten to
/// the stored marker form (see [`crate::render`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub id: i64,
    pub quote: String,
    pub rating: i64,
    pub status: ModerationStatus,
    pub submitted: DateTime<Utc>,
    pub submitted_ip: String,
}

impl Quote {
    /// A fresh, unmoderated submission. The store assigns the real id.
    pub fn new_submission(body: String, submitted_ip: String) -> Self {
        Quote {
            id: 0,
            quote: body,
            rating: 0,
            status: ModerationStatus::Pending,
            submitted: Utc::now(),
            submitted_ip,
        }
    }
}
