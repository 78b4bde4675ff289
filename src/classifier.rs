//! Mood classification: the local rule engine and the capability remote
//! backends plug into.

use crate::config::Backend;
use crate::errors::{InputError, Notice, RemoteError};
use crate::lexicon;
use crate::models::MoodCategory;
use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassificationInput {
    Selection(MoodCategory),
    Text(String),
}

impl ClassificationInput {
    /// Builds an input from the optional fields of a request. Blank text
    /// counts as absent; exactly one of the two must remain.
    pub fn from_parts(mood: Option<&str>, text: Option<&str>) -> Result<Self, InputError> {
        let mood = mood.map(str::trim).filter(|value| !value.is_empty());
        let text = text.map(str::trim).filter(|value| !value.is_empty());
        match (mood, text) {
            (Some(_), Some(_)) => Err(InputError::Conflicting),
            (Some(mood), None) => Ok(Self::Selection(mood.parse()?)),
            (None, Some(text)) => Ok(Self::Text(text.to_string())),
            (None, None) => Err(InputError::Empty),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Selection(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    Selection,
    Local,
    Remote,
    LocalFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub category: MoodCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    pub source: ClassificationSource,
}

impl ClassificationResult {
    pub fn local(text: &str) -> Self {
        Self {
            category: classify_text(text),
            text: Some(text.to_string()),
            confidence: None,
            source: ClassificationSource::Local,
        }
    }
}

pub fn classify(input: &ClassificationInput) -> MoodCategory {
    match input {
        ClassificationInput::Selection(category) => *category,
        ClassificationInput::Text(text) => classify_text(text),
    }
}

/// First category in [`lexicon::PRIORITY`] with a keyword hit, or
/// [`MoodCategory::DEFAULT`]. A happy result is escalated to excited when
/// the text also carries an excited keyword.
pub fn classify_text(text: &str) -> MoodCategory {
    let hits = lexicon::lookup(text);
    let first = hits
        .iter()
        .find_map(|(category, hit)| hit.then_some(*category));

    match first {
        Some(MoodCategory::Happy) if matched(&hits, MoodCategory::Excited) => MoodCategory::Excited,
        Some(category) => category,
        None => MoodCategory::DEFAULT,
    }
}

fn matched(hits: &[(MoodCategory, bool)], category: MoodCategory) -> bool {
    hits.iter().any(|(c, hit)| *c == category && *hit)
}

/// A strategy for turning free text into a mood.
#[async_trait]
pub trait MoodClassifier: Send + Sync {
    fn backend(&self) -> Backend;

    async fn classify_text(&self, text: &str) -> Result<ClassificationResult, RemoteError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClassifier;

#[async_trait]
impl MoodClassifier for LocalClassifier {
    fn backend(&self) -> Backend {
        Backend::Local
    }

    async fn classify_text(&self, text: &str) -> Result<ClassificationResult, RemoteError> {
        Ok(ClassificationResult::local(text))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub result: ClassificationResult,
    pub notices: Vec<Notice>,
}

/// Runs one classification. Selections never reach the classifier. A remote
/// failure is reported as a notice and the text is classified locally.
pub async fn analyze(input: ClassificationInput, classifier: &dyn MoodClassifier) -> Analysis {
    let text = match input {
        ClassificationInput::Selection(category) => {
            return Analysis {
                result: ClassificationResult {
                    category,
                    text: None,
                    confidence: None,
                    source: ClassificationSource::Selection,
                },
                notices: Vec::new(),
            };
        }
        ClassificationInput::Text(text) => text,
    };

    match classifier.classify_text(&text).await {
        Ok(result) => Analysis {
            result,
            notices: Vec::new(),
        },
        Err(err) => {
            warn!(backend = %classifier.backend(), "remote classification failed: {err}");
            let mut result = ClassificationResult::local(&text);
            result.source = ClassificationSource::LocalFallback;
            Analysis {
                result,
                notices: vec![Notice::remote_failed(&err)],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NoticeKind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingClassifier {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MoodClassifier for FailingClassifier {
        fn backend(&self) -> Backend {
            Backend::HuggingFace
        }

        async fn classify_text(&self, _text: &str) -> Result<ClassificationResult, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(RemoteError::Status {
                status: 503,
                body: "model loading".to_string(),
            })
        }
    }

    #[test]
    fn selection_is_returned_unchanged() {
        for category in MoodCategory::ALL {
            assert_eq!(classify(&ClassificationInput::Selection(category)), category);
        }
    }

    #[test]
    fn unmatched_text_falls_back_to_calm() {
        assert_eq!(classify_text("the meeting moved to thursday"), MoodCategory::Calm);
        assert_eq!(classify_text(""), MoodCategory::Calm);
        assert_eq!(classify_text("   "), MoodCategory::Calm);
    }

    #[test]
    fn earlier_category_wins_ties() {
        assert_eq!(classify_text("I'm sad and angry"), MoodCategory::Sad);
        assert_eq!(classify_text("angry, sad"), MoodCategory::Sad);
        assert_eq!(classify_text("stressed but calm"), MoodCategory::Calm);
        for _ in 0..3 {
            assert_eq!(classify_text("furious and anxious"), MoodCategory::Angry);
        }
    }

    #[test]
    fn happy_with_excitement_escalates() {
        assert_eq!(classify_text("so happy and excited"), MoodCategory::Excited);
        assert_eq!(classify_text("so happy today"), MoodCategory::Happy);
    }

    #[test]
    fn escalation_only_applies_to_happy() {
        assert_eq!(classify_text("sad but excited"), MoodCategory::Sad);
    }

    #[test]
    fn tired_text_is_sad() {
        let input = ClassificationInput::Text("I feel really tired today".to_string());
        assert_eq!(classify(&input), MoodCategory::Sad);
    }

    #[test]
    fn excited_text_is_excited() {
        assert_eq!(
            classify_text("I'm feeling excited about my new project"),
            MoodCategory::Excited
        );
    }

    #[test]
    fn from_parts_rejects_empty_and_conflicting_input() {
        assert_eq!(ClassificationInput::from_parts(None, None), Err(InputError::Empty));
        assert_eq!(ClassificationInput::from_parts(None, Some("  ")), Err(InputError::Empty));
        assert_eq!(ClassificationInput::from_parts(Some(""), Some("")), Err(InputError::Empty));
        assert_eq!(
            ClassificationInput::from_parts(Some("sad"), Some("tired")),
            Err(InputError::Conflicting)
        );
        assert_eq!(
            ClassificationInput::from_parts(Some("meh"), None),
            Err(InputError::UnknownMood("meh".to_string()))
        );
        assert_eq!(
            ClassificationInput::from_parts(Some("Angry"), None),
            Ok(ClassificationInput::Selection(MoodCategory::Angry))
        );
        assert_eq!(
            ClassificationInput::from_parts(None, Some(" tired ")),
            Ok(ClassificationInput::Text("tired".to_string()))
        );
    }

    #[tokio::test]
    async fn selection_skips_the_classifier() {
        let classifier = FailingClassifier {
            calls: AtomicUsize::new(0),
        };
        let analysis = analyze(ClassificationInput::Selection(MoodCategory::Angry), &classifier).await;
        assert_eq!(analysis.result.category, MoodCategory::Angry);
        assert_eq!(analysis.result.source, ClassificationSource::Selection);
        assert!(analysis.notices.is_empty());
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn remote_failure_becomes_notice_and_local_result() {
        let classifier = FailingClassifier {
            calls: AtomicUsize::new(0),
        };
        let analysis = analyze(
            ClassificationInput::Text("I feel really tired today".to_string()),
            &classifier,
        )
        .await;
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
        assert_eq!(analysis.result.category, MoodCategory::Sad);
        assert_eq!(analysis.result.source, ClassificationSource::LocalFallback);
        assert_eq!(analysis.notices.len(), 1);
        assert_eq!(analysis.notices[0].kind, NoticeKind::RemoteRequestFailed);
        assert!(analysis.notices[0].message.starts_with("AI analysis failed"));
    }

    #[tokio::test]
    async fn local_classifier_never_fails() {
        let analysis = analyze(
            ClassificationInput::Text("nothing in particular".to_string()),
            &LocalClassifier,
        )
        .await;
        assert_eq!(analysis.result.category, MoodCategory::DEFAULT);
        assert_eq!(analysis.result.source, ClassificationSource::Local);
        assert_eq!(analysis.result.confidence, None);
    }
}
