//! Readiness score extraction from the closing message.
//!
//! The backend embeds `Interview Readiness Score: <n>/100` in its final
//! natural-language message. The number is lifted out and the phrase removed
//! from the feedback shown to the user.

use once_cell::sync::Lazy;
use regex::Regex;

static SCORE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Interview Readiness Score:\s*(\d+)/100").expect("valid score pattern")
});

/// Score and cleaned feedback extracted from a closing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessSummary {
    pub score: Option<u8>,
    pub feedback: String,
}

/// Parses the closing message. Scores above 100 are treated as unparseable.
pub fn extract_readiness(message: &str) -> ReadinessSummary {
    let score = SCORE_PATTERN
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|score| *score <= 100)
        .map(|score| score as u8);

    let feedback = SCORE_PATTERN.replace(message, "").trim().to_string();

    ReadinessSummary { score, feedback }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_score_and_strips_phrase() {
        let summary = extract_readiness("Great job! ... Interview Readiness Score: 82/100");
        assert_eq!(summary.score, Some(82));
        assert_eq!(summary.feedback, "Great job! ...");
    }

    #[test]
    fn test_case_insensitive_and_mid_text() {
        let summary =
            extract_readiness("Well done.\ninterview readiness score: 67/100\nKeep practicing.");
        assert_eq!(summary.score, Some(67));
        assert!(!summary.feedback.to_lowercase().contains("readiness score"));
        assert!(summary.feedback.contains("Keep practicing."));
    }

    #[test]
    fn test_missing_score() {
        let summary = extract_readiness("Thanks for your time.");
        assert_eq!(summary.score, None);
        assert_eq!(summary.feedback, "Thanks for your time.");
    }

    #[test]
    fn test_out_of_range_score_is_ignored() {
        let summary = extract_readiness("Interview Readiness Score: 182/100");
        assert_eq!(summary.score, None);
    }
}
