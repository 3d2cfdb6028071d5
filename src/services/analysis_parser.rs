//! Turns the free-form feedback text returned by the model into an [`Analysis`].
//!
//! The model is asked for four blank-line separated sections, each starting with
//! a fixed title line. Parsing is lenient: anything that does not look like one
//! of those sections is skipped, and nothing here ever fails.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::Analysis;

/// Version of the section layout shared by the prompt and the parser.
/// Stored on every analyzed entry.
pub const ANALYSIS_TEMPLATE_VERSION: &str = "v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Score,
    Accomplishments,
    Improvements,
    Tips,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Score,
        Section::Accomplishments,
        Section::Improvements,
        Section::Tips,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Score => "PRODUCTIVITY SCORE",
            Section::Accomplishments => "KEY ACCOMPLISHMENTS",
            Section::Improvements => "AREAS FOR IMPROVEMENT",
            Section::Tips => "ACTIONABLE TIPS",
        }
    }

    /// Matches a title line by prefix against the fixed title set.
    pub fn from_title_line(line: &str) -> Option<Section> {
        let normalized = strip_markup(line).to_ascii_uppercase();
        Section::ALL
            .into_iter()
            .find(|section| normalized.starts_with(section.title()))
    }
}

fn enumeration_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:\d+[.)]|[-*•])(?:\s+|$)").expect("valid enumeration regex"))
}

fn digit_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("valid digit regex"))
}

fn strip_markup(line: &str) -> &str {
    line.trim()
        .trim_start_matches(|c: char| c == '#' || c == '*' || c == '_' || c.is_whitespace())
}

fn parse_score(title_line: &str) -> Option<u8> {
    digit_run()
        .find(title_line)
        .and_then(|m| m.as_str().parse::<u8>().ok())
        .filter(|score| *score <= 100)
}

fn parse_items<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<String> {
    lines
        .map(|line| enumeration_prefix().replace(line, "").trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Splits on lines that are empty after trimming.
fn sections(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

pub fn parse_analysis(text: &str) -> Analysis {
    let mut analysis = Analysis::default();

    for block in sections(text) {
        let Some((title, body)) = block.split_first() else {
            continue;
        };
        let Some(section) = Section::from_title_line(title) else {
            continue;
        };

        match section {
            Section::Score => {
                if analysis.score.is_none() {
                    analysis.score = parse_score(title);
                }
            }
            Section::Accomplishments => analysis
                .accomplishments
                .extend(parse_items(body.iter().copied())),
            Section::Improvements => analysis
                .improvements
                .extend(parse_items(body.iter().copied())),
            Section::Tips => analysis.tips.extend(parse_items(body.iter().copied())),
        }
    }

    analysis
}

/// Removes the markdown emphasis and code markers models like to add.
pub fn clean_response(text: &str) -> String {
    text.replace("**", "").replace('`', "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RESPONSE: &str = "PRODUCTIVITY SCORE: 75/100

KEY ACCOMPLISHMENTS:
1. Completed project presentation
2. Attended team meetings
3. Organized workspace

AREAS FOR IMPROVEMENT:
1. Time management
2. Task prioritization

ACTIONABLE TIPS:
1. Use time-blocking technique
2. Create daily priority list";

    #[test]
    fn parses_score_and_first_list() {
        let analysis = parse_analysis(
            "PRODUCTIVITY SCORE: 82/100\n\nKEY ACCOMPLISHMENTS:\n1. Did X\n2. Did Y",
        );
        assert_eq!(analysis.score, Some(82));
        assert_eq!(analysis.accomplishments, vec!["Did X", "Did Y"]);
        assert!(analysis.improvements.is_empty());
        assert!(analysis.tips.is_empty());
    }

    #[test]
    fn parses_all_four_sections() {
        let analysis = parse_analysis(FULL_RESPONSE);
        assert_eq!(analysis.score, Some(75));
        assert_eq!(analysis.accomplishments.len(), 3);
        assert_eq!(
            analysis.improvements,
            vec!["Time management", "Task prioritization"]
        );
        assert_eq!(
            analysis.tips,
            vec!["Use time-blocking technique", "Create daily priority list"]
        );
    }

    #[test]
    fn unrecognized_text_yields_empty_analysis() {
        let analysis = parse_analysis("Great job today!\n\nKeep it up.");
        assert_eq!(analysis, Analysis::default());
        assert_eq!(parse_analysis(""), Analysis::default());
    }

    #[test]
    fn missing_digits_leave_score_absent() {
        let analysis = parse_analysis("PRODUCTIVITY SCORE: unknown\n\nACTIONABLE TIPS:\n- Sleep");
        assert_eq!(analysis.score, None);
        assert_eq!(analysis.tips, vec!["Sleep"]);
    }

    #[test]
    fn out_of_range_score_is_dropped() {
        assert_eq!(parse_analysis("PRODUCTIVITY SCORE: 250/100").score, None);
        assert_eq!(parse_analysis("PRODUCTIVITY SCORE: 100/100").score, Some(100));
        assert_eq!(parse_analysis("PRODUCTIVITY SCORE: 0/100").score, Some(0));
    }

    #[test]
    fn titles_match_by_prefix_not_substring() {
        // Mentions a tips keyword but is not a tips section.
        let text = "SUMMARY OF ACTIONABLE TIPS GIVEN BEFORE:\n1. Should be ignored\n\n\
                    ACTIONABLE TIPS (pick one):\n1. Walk at lunch";
        let analysis = parse_analysis(text);
        assert_eq!(analysis.tips, vec!["Walk at lunch"]);
    }

    #[test]
    fn tolerates_markdown_crlf_and_blank_items() {
        let text = "## **Productivity Score:** 64/100\r\n\r\n**Key Accomplishments:**\r\n1.   \r\n2) Fixed the build\r\n* Reviewed PRs  \r\n";
        let analysis = parse_analysis(text);
        assert_eq!(analysis.score, Some(64));
        assert_eq!(analysis.accomplishments, vec!["Fixed the build", "Reviewed PRs"]);
    }

    #[test]
    fn repeated_sections_append_and_first_score_wins() {
        let text = "PRODUCTIVITY SCORE: 40\n\nACTIONABLE TIPS:\n1. One\n\nPRODUCTIVITY SCORE: 90\n\nACTIONABLE TIPS:\n1. Two";
        let analysis = parse_analysis(text);
        assert_eq!(analysis.score, Some(40));
        assert_eq!(analysis.tips, vec!["One", "Two"]);
    }

    #[test]
    fn every_section_title_round_trips() {
        for section in Section::ALL {
            assert_eq!(Section::from_title_line(&format!("{}:", section.title())), Some(section));
        }
        assert_eq!(Section::from_title_line("Notes:"), None);
    }

    #[test]
    fn clean_response_strips_emphasis_and_code_marks() {
        assert_eq!(
            clean_response("  **PRODUCTIVITY SCORE:** `70`/100\n"),
            "PRODUCTIVITY SCORE: 70/100"
        );
    }
}
