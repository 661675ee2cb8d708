//! Scoring engine: maps a [`SignalSet`] to a score and paired issue and
//! suggestion lists.
//!
//! Rules run in a fixed order and each emits at most one issue/suggestion
//! pair, so the output order never depends on which rules fired.

use seolens_core::{Assessment, Issue, IssueKind, Priority, SignalSet, Suggestion};

const TITLE_MIN: usize = 30;
const TITLE_MAX: usize = 60;
const DESCRIPTION_MIN: usize = 120;
const DESCRIPTION_MAX: usize = 160;
const MIN_WORDS: usize = 300;

const MISSING_ELEMENT_PENALTY: i32 = 20;
const LENGTH_PENALTY: i32 = 10;
const MISSING_H1_PENALTY: i32 = 15;
const ALT_PENALTY_PER_IMAGE: i32 = 3;
const ALT_PENALTY_CAP: i32 = 15;
const THIN_CONTENT_PENALTY: i32 = 10;

/// Accumulates findings in emission order.
struct Tally {
    score: i32,
    issues: Vec<Issue>,
    suggestions: Vec<Suggestion>,
}

impl Tally {
    fn new() -> Self {
        Self {
            score: 100,
            issues: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    fn flag(
        &mut self,
        kind: IssueKind,
        priority: Priority,
        message: impl Into<String>,
        action: &str,
        penalty: i32,
    ) {
        self.score -= penalty;
        self.issues.push(Issue {
            kind,
            message: message.into(),
            priority,
        });
        self.suggestions.push(Suggestion {
            action: action.to_string(),
            impact: priority,
        });
    }

    fn finish(self) -> Assessment {
        let score = u8::try_from(self.score.clamp(0, 100)).unwrap_or_default();
        Assessment {
            score,
            issues: self.issues,
            suggestions: self.suggestions,
        }
    }
}

/// Present and non-blank text, measured in characters.
fn filled_len(value: Option<&str>) -> Option<usize> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.chars().count())
}

/// Score a signal set.
pub fn score(signals: &SignalSet) -> Assessment {
    let mut tally = Tally::new();

    match filled_len(signals.title.as_deref()) {
        None => tally.flag(
            IssueKind::Error,
            Priority::High,
            "Missing title tag",
            "Add a descriptive title tag (50-60 characters)",
            MISSING_ELEMENT_PENALTY,
        ),
        Some(len) if len < TITLE_MIN => tally.flag(
            IssueKind::Warning,
            Priority::Medium,
            "Title too short",
            "Increase title length to 50-60 characters",
            LENGTH_PENALTY,
        ),
        Some(len) if len > TITLE_MAX => tally.flag(
            IssueKind::Warning,
            Priority::Medium,
            "Title too long",
            "Shorten title to under 60 characters",
            LENGTH_PENALTY,
        ),
        Some(_) => {}
    }

    match filled_len(signals.meta_description.as_deref()) {
        None => tally.flag(
            IssueKind::Error,
            Priority::High,
            "Missing meta description",
            "Add a meta description (150-160 characters)",
            MISSING_ELEMENT_PENALTY,
        ),
        Some(len) if len < DESCRIPTION_MIN => tally.flag(
            IssueKind::Warning,
            Priority::Medium,
            "Meta description too short",
            "Increase meta description to 150-160 characters",
            LENGTH_PENALTY,
        ),
        Some(len) if len > DESCRIPTION_MAX => tally.flag(
            IssueKind::Warning,
            Priority::Medium,
            "Meta description too long",
            "Shorten meta description to under 160 characters",
            LENGTH_PENALTY,
        ),
        Some(_) => {}
    }

    if filled_len(signals.h1.as_deref()).is_none() {
        tally.flag(
            IssueKind::Error,
            Priority::High,
            "Missing H1 heading",
            "Add a single H1 heading to the page",
            MISSING_H1_PENALTY,
        );
    }

    let without_alt = signals.images_without_alt();
    if without_alt > 0 {
        let penalty = i32::try_from(without_alt)
            .unwrap_or(i32::MAX)
            .saturating_mul(ALT_PENALTY_PER_IMAGE)
            .min(ALT_PENALTY_CAP);
        tally.flag(
            IssueKind::Warning,
            Priority::Medium,
            format!("{without_alt} images missing alt text"),
            "Add descriptive alt text to all images",
            penalty,
        );
    }

    if signals.word_count < MIN_WORDS {
        tally.flag(
            IssueKind::Warning,
            Priority::Medium,
            format!("Low word count ({} words)", signals.word_count),
            "Increase content to at least 300 words",
            THIN_CONTENT_PENALTY,
        );
    }

    tally.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use seolens_core::ImageRef;

    fn healthy() -> SignalSet {
        SignalSet {
            title: Some("A".repeat(55)),
            meta_description: Some("B".repeat(155)),
            h1: Some("Heading".to_string()),
            h2s: vec![],
            images: vec![ImageRef {
                src: "/a.png".to_string(),
                alt: Some("described".to_string()),
            }],
            word_count: 800,
            http_status: 200,
        }
    }

    fn image(alt: Option<&str>) -> ImageRef {
        ImageRef {
            src: "/img.png".to_string(),
            alt: alt.map(str::to_string),
        }
    }

    #[test]
    fn test_perfect_page() {
        let assessment = score(&healthy());
        assert_eq!(assessment.score, 100);
        assert!(assessment.issues.is_empty());
        assert!(assessment.suggestions.is_empty());
    }

    #[test]
    fn test_missing_core_elements_scores_45() {
        let signals = SignalSet {
            title: None,
            meta_description: None,
            h1: None,
            ..healthy()
        };
        let assessment = score(&signals);
        assert_eq!(assessment.score, 45);
        let messages: Vec<&str> = assessment.issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["Missing title tag", "Missing meta description", "Missing H1 heading"]
        );
        assert!(assessment
            .issues
            .iter()
            .all(|i| i.kind == IssueKind::Error && i.priority == Priority::High));
    }

    #[test]
    fn test_extracted_page_without_head_elements_scores_45() {
        let html = format!(
            "<html><body><img src=\"/a.png\" alt=\"logo\"><p>{}</p></body></html>",
            "word ".repeat(320)
        );
        let signals = crate::extractor::extract(&html, 200);
        assert_eq!(signals.word_count, 320);

        let assessment = score(&signals);
        assert_eq!(assessment.score, 45);
        assert_eq!(assessment.issues.len(), 3);
    }

    #[test]
    fn test_empty_strings_count_as_missing() {
        let signals = SignalSet {
            title: Some(String::new()),
            meta_description: Some("   ".to_string()),
            h1: Some(String::new()),
            ..healthy()
        };
        assert_eq!(score(&signals).score, 45);
    }

    #[test]
    fn test_length_rules_are_exclusive_per_field() {
        let short = SignalSet {
            title: Some("Short".to_string()),
            meta_description: Some("x".repeat(200)),
            ..healthy()
        };
        let assessment = score(&short);
        assert_eq!(assessment.score, 80);
        let messages: Vec<&str> = assessment.issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(messages, vec!["Title too short", "Meta description too long"]);
        assert_eq!(
            assessment.suggestions[0].action,
            "Increase title length to 50-60 characters"
        );
        assert_eq!(assessment.suggestions[0].impact, Priority::Medium);
    }

    #[test]
    fn test_length_boundaries() {
        let at_bounds = SignalSet {
            title: Some("t".repeat(30)),
            meta_description: Some("d".repeat(160)),
            ..healthy()
        };
        assert_eq!(score(&at_bounds).score, 100);

        let past_bounds = SignalSet {
            title: Some("t".repeat(61)),
            meta_description: Some("d".repeat(119)),
            ..healthy()
        };
        assert_eq!(score(&past_bounds).score, 80);
    }

    #[test]
    fn test_length_counts_characters() {
        // 30 multi-byte characters is long enough even though it is 60+ bytes.
        let signals = SignalSet {
            title: Some("é".repeat(30)),
            ..healthy()
        };
        assert_eq!(score(&signals).score, 100);
    }

    #[test]
    fn test_alt_penalty_scales_and_caps() {
        let two = SignalSet {
            images: vec![image(None), image(Some("")), image(Some("ok"))],
            ..healthy()
        };
        let assessment = score(&two);
        assert_eq!(assessment.score, 94);
        assert_eq!(assessment.issues[0].message, "2 images missing alt text");

        let many = SignalSet {
            images: (0..400).map(|_| image(None)).collect(),
            ..healthy()
        };
        assert_eq!(score(&many).score, 85);
    }

    #[test]
    fn test_low_word_count_message() {
        let signals = SignalSet {
            word_count: 42,
            ..healthy()
        };
        let assessment = score(&signals);
        assert_eq!(assessment.score, 90);
        assert_eq!(assessment.issues[0].message, "Low word count (42 words)");
        assert_eq!(
            assessment.suggestions[0].action,
            "Increase content to at least 300 words"
        );
    }

    #[test]
    fn test_worst_case_is_clamped() {
        let signals = SignalSet {
            images: (0..500).map(|_| image(None)).collect(),
            ..SignalSet::empty(200)
        };
        let assessment = score(&signals);
        // 100 - 20 - 20 - 15 - 15 - 10
        assert_eq!(assessment.score, 20);
        assert_eq!(assessment.issues.len(), 5);
        assert_eq!(assessment.issues.len(), assessment.suggestions.len());
    }

    #[test]
    fn test_pairs_follow_rule_order() {
        let signals = SignalSet {
            title: Some("t".repeat(80)),
            meta_description: None,
            h1: None,
            images: vec![image(None)],
            word_count: 10,
            ..healthy()
        };
        let assessment = score(&signals);
        let pairs: Vec<(&str, Priority)> = assessment
            .issues
            .iter()
            .zip(&assessment.suggestions)
            .map(|(issue, suggestion)| {
                assert_eq!(issue.priority, suggestion.impact);
                (issue.message.as_str(), suggestion.impact)
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("Title too long", Priority::Medium),
                ("Missing meta description", Priority::High),
                ("Missing H1 heading", Priority::High),
                ("1 images missing alt text", Priority::Medium),
                ("Low word count (10 words)", Priority::Medium),
            ]
        );
        assert_eq!(assessment.score, 100 - 10 - 20 - 15 - 3 - 10);
    }

    #[test]
    fn test_score_stays_in_range() {
        for images in [0usize, 1, 5, 6, 100, 1000] {
            for words in [0usize, 299, 300] {
                let signals = SignalSet {
                    images: (0..images).map(|_| image(None)).collect(),
                    word_count: words,
                    ..SignalSet::empty(200)
                };
                let assessment = score(&signals);
                assert!(assessment.score <= 100);
                assert_eq!(assessment.issues.len(), assessment.suggestions.len());
            }
        }
    }
}
