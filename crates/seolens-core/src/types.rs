//! Shared types used across SEOLens.
//!
//! The scan pipeline passes these values strictly downward: the extractor
//! produces a [`SignalSet`], the scorer turns it into an [`Assessment`], and
//! the coordinator combines both into a [`ScanResult`].

use crate::error::SeolensError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Newtype for a scan target: an absolute `http`/`https` URL with a host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetUrl(Url);

impl TargetUrl {
    /// Parse and validate a scan target.
    ///
    /// # Errors
    /// Returns `SeolensError::Validation` if the input is not an absolute
    /// `http`/`https` URL with a host.
    pub fn parse(input: &str) -> Result<Self, SeolensError> {
        let url = Url::parse(input.trim())
            .map_err(|e| SeolensError::Validation(format!("invalid URL '{input}': {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(SeolensError::Validation(format!(
                "invalid URL '{input}': scheme must be http or https"
            )));
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(SeolensError::Validation(format!(
                "invalid URL '{input}': missing host"
            )));
        }

        Ok(Self(url))
    }

    /// Host name of the target, used as the site's domain.
    #[must_use]
    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }

    /// The URL as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for TargetUrl {
    type Error = SeolensError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TargetUrl> for String {
    fn from(value: TargetUrl) -> Self {
        value.0.into()
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An `img` element as seen by the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// `src` attribute, empty when absent
    pub src: String,
    /// `alt` attribute; `None` when the attribute is absent
    pub alt: Option<String>,
}

impl ImageRef {
    /// Whether the image lacks usable alt text (absent or blank).
    #[must_use]
    pub fn missing_alt(&self) -> bool {
        self.alt.as_deref().map_or(true, |alt| alt.trim().is_empty())
    }
}

/// Structural SEO signals extracted from one page.
///
/// `None` means the element was absent; `Some("")` means it was present but
/// empty. The scorer treats both as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalSet {
    /// Text of the first `title` element, trimmed
    pub title: Option<String>,
    /// `content` of the first `meta[name=description]`, trimmed
    pub meta_description: Option<String>,
    /// Text of the first `h1`, trimmed
    pub h1: Option<String>,
    /// Text of every `h2`, in document order
    pub h2s: Vec<String>,
    /// Every `img`, in document order
    pub images: Vec<ImageRef>,
    /// Whitespace-delimited tokens in the body text
    pub word_count: usize,
    /// HTTP status of the fetch that produced the HTML
    pub http_status: u16,
}

impl SignalSet {
    /// An all-empty signal set carrying only the HTTP status.
    #[must_use]
    pub fn empty(http_status: u16) -> Self {
        Self {
            http_status,
            ..Self::default()
        }
    }

    /// Number of images with absent or blank alt text.
    #[must_use]
    pub fn images_without_alt(&self) -> usize {
        self.images.iter().filter(|img| img.missing_alt()).count()
    }
}

/// Severity of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// Required element missing
    Error,
    /// Element present but outside recommended bounds
    Warning,
}

/// Priority of an issue, and impact of its suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Fix first
    High,
    /// Fix soon
    Medium,
    /// Nice to have
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// A problem found by the scorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Error or warning
    #[serde(rename = "type")]
    pub kind: IssueKind,
    /// Human-readable description
    pub message: String,
    /// How urgent the fix is
    pub priority: Priority,
}

/// Remediation paired with the issue at the same position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// What to do
    pub action: String,
    /// Expected impact of doing it
    pub impact: Priority,
}

/// Scorer output: score plus positionally paired issues and suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    /// Score in `0..=100`
    pub score: u8,
    /// Issues in rule order
    pub issues: Vec<Issue>,
    /// Suggestions, one per issue, same order
    pub suggestions: Vec<Suggestion>,
}

/// Combined outcome of one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Extracted signals
    pub signals: SignalSet,
    /// Score in `0..=100`
    pub score: u8,
    /// Issues in rule order
    pub issues: Vec<Issue>,
    /// Suggestions paired with `issues`
    pub suggestions: Vec<Suggestion>,
}

impl ScanResult {
    /// Combine extracted signals with their assessment.
    #[must_use]
    pub fn new(signals: SignalSet, assessment: Assessment) -> Self {
        Self {
            signals,
            score: assessment.score,
            issues: assessment.issues,
            suggestions: assessment.suggestions,
        }
    }

    /// The scorer's half of the result.
    #[must_use]
    pub fn assessment(&self) -> Assessment {
        Assessment {
            score: self.score,
            issues: self.issues.clone(),
            suggestions: self.suggestions.clone(),
        }
    }
}
