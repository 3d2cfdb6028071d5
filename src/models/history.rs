use serde::{Deserialize, Serialize};

use super::Entry;

/// Average productivity score for one local calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorePoint {
    pub date: String,
    pub average_score: f64,
    pub entries: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    pub trend: Vec<ScorePoint>,
    pub recent: Vec<Entry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub count: usize,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct HistoryQuery {
    pub days: Option<u32>,
}
