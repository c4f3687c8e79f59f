use serde::Serialize;

/// How an expected heading was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// A heading token with the same text already existed.
    ExistingHeading,
    /// The heading was carved out of a content block.
    ExtractedFromContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedHeading {
    pub expected: String,
    pub matched_text: String,
    pub extraction_method: ExtractionMethod,
    pub confidence: f64,
    pub line_number: usize,
    pub heading_signature: String,
    pub was_extracted: bool,
}

/// Outcome of matching a list of expected headings against a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchStatistics {
    /// Share of expected headings found, as a percentage rounded to two places.
    pub match_percentage: f64,
    pub missing_headings: Vec<String>,
    pub matched_headings: Vec<MatchedHeading>,
}

impl MatchStatistics {
    pub(crate) fn new(
        total_expected: usize,
        matched_headings: Vec<MatchedHeading>,
        missing_headings: Vec<String>,
    ) -> Self {
        let match_percentage = if total_expected == 0 {
            0.0
        } else {
            round2(matched_headings.len() as f64 / total_expected as f64 * 100.0)
        };
        Self {
            match_percentage,
            missing_headings,
            matched_headings,
        }
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_is_rounded() {
        let matched = MatchedHeading {
            expected: "Plan".into(),
            matched_text: "Plan".into(),
            extraction_method: ExtractionMethod::ExistingHeading,
            confidence: 100.0,
            line_number: 1,
            heading_signature: "#1".into(),
            was_extracted: false,
        };
        let stats = MatchStatistics::new(3, vec![matched], vec!["A".into(), "B".into()]);
        assert_eq!(stats.match_percentage, 33.33);
    }

    #[test]
    fn serializes_method_in_snake_case() {
        let json = serde_json::to_string(&ExtractionMethod::ExtractedFromContent).unwrap();
        assert_eq!(json, "\"extracted_from_content\"");
    }
}
