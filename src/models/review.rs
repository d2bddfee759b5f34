use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

/// A reader review of one book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: Uuid,
    pub book_id: Uuid,
    pub reviewer_name: String,
    /// Always within `MIN_SCORE..=MAX_SCORE`
    pub score: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub book_id: Uuid,
    pub reviewer_name: String,
    pub score: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewUpdate {
    pub reviewer_name: Option<String>,
    pub score: Option<i64>,
    pub comment: Option<String>,
}

impl Review {
    pub fn new(book_id: Uuid, reviewer_name: impl Into<String>, score: u8) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id,
            reviewer_name: reviewer_name.into(),
            score,
            comment: None,
            created_at: Utc::now(),
        }
    }
}
