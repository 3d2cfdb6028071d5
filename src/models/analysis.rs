use serde::{Deserialize, Serialize};

/// Structured feedback extracted from one model response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub score: Option<u8>,
    pub accomplishments: Vec<String>,
    pub improvements: Vec<String>,
    pub tips: Vec<String>,
}

/// Output of one analyzer run: the cleaned model text plus what was parsed out of it.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub analysis: String,
    pub parsed: Analysis,
    pub version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: String,
    pub score: Option<u8>,
    pub accomplishments: Vec<String>,
    pub improvements: Vec<String>,
    pub tips: Vec<String>,
}

impl From<AnalysisOutcome> for AnalyzeResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        Self {
            success: true,
            analysis: outcome.analysis,
            score: outcome.parsed.score,
            accomplishments: outcome.parsed.accomplishments,
            improvements: outcome.parsed.improvements,
            tips: outcome.parsed.tips,
        }
    }
}
