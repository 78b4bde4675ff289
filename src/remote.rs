//! Remote sentiment adapters.
//!
//! Each provider speaks its own HTTP dialect and yields a [`RemoteOutput`];
//! [`reduce`] turns any of those shapes into one [`MoodCategory`] through a
//! fixed label table. Anything the table cannot place, or a winner below the
//! confidence floor, goes back through the local keyword rules.

use crate::classifier::{ClassificationResult, ClassificationSource, LocalClassifier, MoodClassifier};
use crate::config::{Backend, ClassifierSettings};
use crate::errors::{Notice, RemoteError};
use crate::models::MoodCategory;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::{collections::BTreeMap, time::Duration};
use tracing::{debug, warn};

const HUGGING_FACE_URL: &str =
    "https://api-inference.huggingface.co/models/cardiffnlp/twitter-roberta-base-sentiment-latest";
const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_MODEL: &str = "gpt-4o-mini";
const WATSON_VERSION: &str = "2022-04-07";

const OPENAI_PROMPT: &str = "Classify the mood of the user's message. Reply with exactly one word \
from this list: happy, sad, angry, excited, calm, anxious.";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

/// What a provider answered, before mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteOutput {
    Label(String),
    Distribution(Vec<LabelScore>),
    EmotionScores(BTreeMap<String, f32>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reduction {
    Mapped {
        category: MoodCategory,
        confidence: Option<f32>,
    },
    LowConfidence {
        label: String,
        score: f32,
    },
    Unmapped(String),
    Empty,
}

pub fn map_label(label: &str) -> Option<MoodCategory> {
    let category = match label.trim().to_lowercase().as_str() {
        "joy" | "happy" | "happiness" | "positive" | "love" | "label_2" => MoodCategory::Happy,
        "sadness" | "sad" | "negative" | "label_0" => MoodCategory::Sad,
        "anger" | "angry" | "disgust" | "annoyance" => MoodCategory::Angry,
        "surprise" | "excitement" | "excited" => MoodCategory::Excited,
        "neutral" | "calm" | "label_1" => MoodCategory::Calm,
        "fear" | "anxious" | "anxiety" | "nervousness" => MoodCategory::Anxious,
        _ => return None,
    };
    Some(category)
}

pub fn reduce(output: &RemoteOutput, min_confidence: f32) -> Reduction {
    match output {
        RemoteOutput::Label(label) => match map_label(label) {
            Some(category) => Reduction::Mapped {
                category,
                confidence: None,
            },
            None => Reduction::Unmapped(label.clone()),
        },
        RemoteOutput::Distribution(scores) => {
            reduce_scores(scores.iter().map(|s| (s.label.as_str(), s.score)), min_confidence)
        }
        RemoteOutput::EmotionScores(scores) => {
            reduce_scores(scores.iter().map(|(label, score)| (label.as_str(), *score)), min_confidence)
        }
    }
}

fn reduce_scores<'a>(scores: impl Iterator<Item = (&'a str, f32)>, min_confidence: f32) -> Reduction {
    let top = scores.fold(None::<(&str, f32)>, |best, (label, score)| match best {
        Some((_, best_score)) if best_score >= score => best,
        _ => Some((label, score)),
    });
    let Some((label, score)) = top else {
        return Reduction::Empty;
    };
    if score < min_confidence {
        return Reduction::LowConfidence {
            label: label.to_string(),
            score,
        };
    }
    match map_label(label) {
        Some(category) => Reduction::Mapped {
            category,
            confidence: Some(score),
        },
        None => Reduction::Unmapped(label.to_string()),
    }
}

#[async_trait]
pub trait SentimentProvider: Send + Sync {
    fn backend(&self) -> Backend;

    async fn analyze(&self, text: &str) -> Result<RemoteOutput, RemoteError>;
}

pub struct RemoteClassifier<P> {
    provider: P,
    min_confidence: f32,
}

impl<P: SentimentProvider> RemoteClassifier<P> {
    pub fn new(provider: P, min_confidence: f32) -> Self {
        Self {
            provider,
            min_confidence,
        }
    }
}

#[async_trait]
impl<P: SentimentProvider> MoodClassifier for RemoteClassifier<P> {
    fn backend(&self) -> Backend {
        self.provider.backend()
    }

    async fn classify_text(&self, text: &str) -> Result<ClassificationResult, RemoteError> {
        let output = self.provider.analyze(text).await?;
        match reduce(&output, self.min_confidence) {
            Reduction::Mapped {
                category,
                confidence,
            } => Ok(ClassificationResult {
                category,
                text: Some(text.to_string()),
                confidence,
                source: ClassificationSource::Remote,
            }),
            other => {
                debug!(backend = %self.backend(), ?other, "remote label not usable, using local rules");
                let mut result = ClassificationResult::local(text);
                result.source = ClassificationSource::LocalFallback;
                Ok(result)
            }
        }
    }
}

/// The classifier chosen for one request, with a notice when a remote
/// backend was configured but cannot be used.
pub struct Selected {
    pub classifier: Box<dyn MoodClassifier>,
    pub notice: Option<Notice>,
}

impl Selected {
    fn local(notice: Option<Notice>) -> Self {
        Self {
            classifier: Box::new(LocalClassifier),
            notice,
        }
    }
}

pub fn build_classifier(settings: &ClassifierSettings, http: &reqwest::Client) -> Selected {
    if settings.backend == Backend::Local {
        return Selected::local(None);
    }
    let Some(api_key) = settings.api_key.clone() else {
        return Selected::local(Some(Notice::remote_unavailable(
            settings.backend.as_str(),
            "an API key",
        )));
    };

    let classifier: Box<dyn MoodClassifier> = match settings.backend {
        Backend::Local => Box::new(LocalClassifier),
        Backend::HuggingFace => Box::new(RemoteClassifier::new(
            HuggingFaceProvider {
                http: http.clone(),
                url: settings.endpoint.clone().unwrap_or_else(|| HUGGING_FACE_URL.to_string()),
                api_key,
                timeout: settings.timeout,
            },
            settings.min_confidence,
        )),
        Backend::OpenAi => Box::new(RemoteClassifier::new(
            OpenAiProvider {
                http: http.clone(),
                url: settings.endpoint.clone().unwrap_or_else(|| OPENAI_URL.to_string()),
                model: settings.model.clone().unwrap_or_else(|| OPENAI_MODEL.to_string()),
                api_key,
                timeout: settings.timeout,
            },
            settings.min_confidence,
        )),
        Backend::Watson => {
            let Some(endpoint) = settings.endpoint.clone() else {
                warn!("watson backend selected without MOOD_API_URL");
                return Selected::local(Some(Notice::remote_unavailable(
                    settings.backend.as_str(),
                    "a service URL (MOOD_API_URL)",
                )));
            };
            Box::new(RemoteClassifier::new(
                WatsonProvider {
                    http: http.clone(),
                    endpoint,
                    api_key,
                    timeout: settings.timeout,
                },
                settings.min_confidence,
            ))
        }
    };

    Selected {
        classifier,
        notice: None,
    }
}

async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, RemoteError> {
    let response = request.send().await?;
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(RemoteError::from_response(response).await)
    }
}

/// Hosted sentiment model answering with `[[{label, score}, ...]]`.
pub struct HuggingFaceProvider {
    pub http: reqwest::Client,
    pub url: String,
    pub api_key: String,
    pub timeout: Duration,
}

#[async_trait]
impl SentimentProvider for HuggingFaceProvider {
    fn backend(&self) -> Backend {
        Backend::HuggingFace
    }

    async fn analyze(&self, text: &str) -> Result<RemoteOutput, RemoteError> {
        let request = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&json!({ "inputs": text }));
        let body: Value = send(request).await?.json().await?;

        let mut scores = Vec::new();
        collect_scores(&body, &mut scores);
        if scores.is_empty() {
            return Err(RemoteError::Malformed(format!("no label scores in {body}")));
        }
        Ok(RemoteOutput::Distribution(scores))
    }
}

fn collect_scores(value: &Value, out: &mut Vec<LabelScore>) {
    match value {
        Value::Array(items) => items.iter().for_each(|item| collect_scores(item, out)),
        Value::Object(_) => {
            if let Ok(score) = LabelScore::deserialize(value) {
                out.push(score);
            }
        }
        _ => {}
    }
}

/// Chat completion model prompted to answer with a single mood word.
pub struct OpenAiProvider {
    pub http: reqwest::Client,
    pub url: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl SentimentProvider for OpenAiProvider {
    fn backend(&self) -> Backend {
        Backend::OpenAi
    }

    async fn analyze(&self, text: &str) -> Result<RemoteOutput, RemoteError> {
        let request = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&json!({
                "model": self.model,
                "temperature": 0,
                "max_tokens": 5,
                "messages": [
                    { "role": "system", "content": OPENAI_PROMPT },
                    { "role": "user", "content": text },
                ],
            }));
        let completion: ChatCompletion = send(request).await?.json().await?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RemoteError::Malformed("completion has no content".to_string()))?;
        let label = content
            .trim()
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        Ok(RemoteOutput::Label(label))
    }
}

/// Natural Language Understanding emotion feature: a score per emotion.
pub struct WatsonProvider {
    pub http: reqwest::Client,
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct WatsonResponse {
    emotion: WatsonEmotion,
}

#[derive(Debug, Deserialize)]
struct WatsonEmotion {
    document: WatsonDocument,
}

#[derive(Debug, Deserialize)]
struct WatsonDocument {
    emotion: BTreeMap<String, f32>,
}

#[async_trait]
impl SentimentProvider for WatsonProvider {
    fn backend(&self) -> Backend {
        Backend::Watson
    }

    async fn analyze(&self, text: &str) -> Result<RemoteOutput, RemoteError> {
        let url = format!("{}/v1/analyze", self.endpoint.trim_end_matches('/'));
        let request = self
            .http
            .post(url)
            .query(&[("version", WATSON_VERSION)])
            .basic_auth("apikey", Some(&self.api_key))
            .timeout(self.timeout)
            .json(&json!({
                "text": text,
                "features": { "emotion": {} },
            }));
        let response: WatsonResponse = send(request).await?.json().await?;
        Ok(RemoteOutput::EmotionScores(response.emotion.document.emotion))
    }
}
