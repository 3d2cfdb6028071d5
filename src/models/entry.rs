use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Analysis;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
    pub content: String,
    pub productivity_score: Option<u8>,
    pub key_accomplishments: Option<Vec<String>>,
    pub areas_for_improvement: Option<Vec<String>>,
    pub actionable_tips: Option<Vec<String>>,
    pub analysis_version: Option<String>,
}

/// Fields supplied by the caller when an entry is created. Everything else is
/// assigned by the store.
#[derive(Debug, Clone, Default)]
pub struct NewEntry {
    pub user_id: String,
    pub content: String,
    pub productivity_score: Option<u8>,
    pub key_accomplishments: Option<Vec<String>>,
    pub areas_for_improvement: Option<Vec<String>>,
    pub actionable_tips: Option<Vec<String>>,
    pub analysis_version: Option<String>,
}

impl NewEntry {
    pub fn analyzed(user_id: &str, content: &str, analysis: &Analysis, version: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            content: content.to_string(),
            productivity_score: analysis.score,
            key_accomplishments: Some(analysis.accomplishments.clone()),
            areas_for_improvement: Some(analysis.improvements.clone()),
            actionable_tips: Some(analysis.tips.clone()),
            analysis_version: Some(version.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListEntriesQuery {
    pub limit: Option<u32>,
}
