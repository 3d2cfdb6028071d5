use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;
use crate::models::{AISettings, AnalysisOutcome};
use crate::services::analysis_parser::{
    clean_response, parse_analysis, Section, ANALYSIS_TEMPLATE_VERSION,
};

const SERVICE: &str = "analysis API";

#[derive(Debug, Clone, Serialize)]
struct AnalysisChatRequest {
    model: String,
    messages: Vec<AnalysisChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
struct AnalysisChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct AnalysisChatResponse {
    choices: Vec<AnalysisChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct AnalysisChoice {
    message: AnalysisMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct AnalysisMessage {
    content: Option<String>,
}

fn example_items(section: Section) -> &'static [&'static str] {
    match section {
        Section::Score => &[],
        Section::Accomplishments => &[
            "Completed project presentation",
            "Attended team meetings",
            "Organized workspace",
        ],
        Section::Improvements => &[
            "Time management",
            "Task prioritization",
            "Meeting efficiency",
        ],
        Section::Tips => &[
            "Use time-blocking technique",
            "Create daily priority list",
            "Set specific goals for meetings",
        ],
    }
}

/// Example layout the model is asked to copy, rendered from the same section set the
/// parser recognizes.
fn response_template() -> String {
    Section::ALL
        .into_iter()
        .map(|section| match section {
            Section::Score => format!("{}: 75/100", section.title()),
            _ => {
                let items = example_items(section)
                    .iter()
                    .enumerate()
                    .map(|(i, item)| format!("{}. {}", i + 1, item))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!("{}:\n{}", section.title(), items)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(content: &str) -> String {
    format!(
        "Analyze this daily journal entry and provide productivity feedback:\n\
\"{}\"\n\n\
Format your response exactly like this example (replace with actual analysis), \
keeping the section titles and the blank line between sections:\n\n\
{}\n\n\
Keep responses concise and actionable. Do not use markdown.",
        content,
        response_template()
    )
}

/// Client for the hosted model that scores journal entries.
#[derive(Debug, Clone)]
pub struct Analyzer {
    client: reqwest::Client,
    settings: AISettings,
}

impl Analyzer {
    pub fn new(settings: AISettings) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|source| UpstreamError::Request { service: SERVICE, source })?;
        Ok(Self { client, settings })
    }

    pub fn is_configured(&self) -> bool {
        self.settings.enabled && !self.settings.api_key.trim().is_empty()
    }

    pub async fn analyze(&self, content: &str) -> Result<AnalysisOutcome, UpstreamError> {
        if !self.is_configured() {
            return Err(UpstreamError::NotConfigured(SERVICE));
        }

        let raw = self.complete(&build_prompt(content)).await?;
        let analysis = clean_response(&raw);
        let parsed = parse_analysis(&analysis);
        if parsed.score.is_none() {
            log::warn!("Analysis response carried no usable score");
        }

        Ok(AnalysisOutcome {
            analysis,
            parsed,
            version: ANALYSIS_TEMPLATE_VERSION,
        })
    }

    async fn complete(&self, prompt: &str) -> Result<String, UpstreamError> {
        let request = AnalysisChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                AnalysisChatMessage {
                    role: "system".to_string(),
                    content: "You are a productivity coach reviewing daily journal entries.".to_string(),
                },
                AnalysisChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let url = format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.settings.api_key.trim()))
            .json(&request)
            .send()
            .await
            .map_err(|source| UpstreamError::Request { service: SERVICE, source })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| UpstreamError::Request { service: SERVICE, source })?;
        if !status.is_success() {
            return Err(UpstreamError::Status {
                service: SERVICE,
                status,
                body: text,
            });
        }

        let parsed: AnalysisChatResponse = serde_json::from_str(&text)
            .map_err(|source| UpstreamError::Decode { service: SERVICE, source })?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(UpstreamError::Empty(SERVICE))
    }
}
