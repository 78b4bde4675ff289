use serde::Serialize;
use std::{env, fmt, path::PathBuf, str::FromStr, time::Duration};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/state.json";
const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_MAX_CONVERSATIONS: usize = 1_000;
const DEFAULT_CHAT_IDLE_SECS: u64 = 30 * 60;

/// Where free-text classification is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Local,
    HuggingFace,
    OpenAi,
    Watson,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Local => "local",
            Backend::HuggingFace => "huggingface",
            Backend::OpenAi => "openai",
            Backend::Watson => "watson",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "local" | "" => Ok(Backend::Local),
            "huggingface" | "hf" => Ok(Backend::HuggingFace),
            "openai" => Ok(Backend::OpenAi),
            "watson" | "ibm" => Ok(Backend::Watson),
            other => Err(format!("unknown classifier backend: {other}")),
        }
    }
}

/// Credentials and tuning for the remote classifier.
#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    pub backend: Backend,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub min_confidence: f32,
    pub timeout: Duration,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            backend: Backend::Local,
            api_key: None,
            endpoint: None,
            model: None,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClassifierSettings {
    /// Same settings with a caller-held key taking precedence.
    pub fn with_api_key(&self, api_key: Option<String>) -> Self {
        let mut settings = self.clone();
        if let Some(key) = api_key.filter(|key| !key.trim().is_empty()) {
            settings.api_key = Some(key);
        }
        settings
    }
}

#[derive(Debug, Clone)]
pub struct SupportSettings {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
    /// Open conversations kept in memory; the least recently used is
    /// dropped when a new one would exceed this.
    pub max_conversations: usize,
    /// Conversations untouched for this long are dropped.
    pub idle_ttl: Duration,
}

impl Default for SupportSettings {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_conversations: DEFAULT_MAX_CONVERSATIONS,
            idle_ttl: Duration::from_secs(DEFAULT_CHAT_IDLE_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub classifier: ClassifierSettings,
    pub support: SupportSettings,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = get("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let data_path = get("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        let timeout = Duration::from_secs(
            get("REMOTE_TIMEOUT_SECS")
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        let classifier = ClassifierSettings {
            backend: get("MOOD_CLASSIFIER")
                .and_then(|value| value.parse().ok())
                .unwrap_or_default(),
            api_key: get("MOOD_API_KEY"),
            endpoint: get("MOOD_API_URL"),
            model: get("MOOD_MODEL"),
            min_confidence: get("MOOD_MIN_CONFIDENCE")
                .and_then(|value| value.parse::<f32>().ok())
                .filter(|value| (0.0..=1.0).contains(value))
                .unwrap_or(DEFAULT_MIN_CONFIDENCE),
            timeout,
        };

        let support = SupportSettings {
            url: get("SUPPORT_CHAT_URL"),
            api_key: get("SUPPORT_CHAT_KEY"),
            timeout,
            max_conversations: get("SUPPORT_CHAT_MAX")
                .and_then(|value| value.parse::<usize>().ok())
                .filter(|max| *max > 0)
                .unwrap_or(DEFAULT_MAX_CONVERSATIONS),
            idle_ttl: Duration::from_secs(
                get("SUPPORT_CHAT_IDLE_SECS")
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_CHAT_IDLE_SECS),
            ),
        };

        Self {
            port,
            data_path,
            classifier,
            support,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_without_environment() {
        let config = config(&[]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_path, PathBuf::from("data/state.json"));
        assert_eq!(config.classifier.backend, Backend::Local);
        assert_eq!(config.classifier.api_key, None);
        assert_eq!(config.classifier.min_confidence, 0.5);
        assert_eq!(config.support.url, None);
        assert_eq!(config.support.timeout, Duration::from_secs(15));
        assert_eq!(config.support.max_conversations, 1_000);
        assert_eq!(config.support.idle_ttl, Duration::from_secs(1_800));
    }

    #[test]
    fn chat_limits_are_configurable() {
        let config = config(&[("SUPPORT_CHAT_MAX", "25"), ("SUPPORT_CHAT_IDLE_SECS", "60")]);
        assert_eq!(config.support.max_conversations, 25);
        assert_eq!(config.support.idle_ttl, Duration::from_secs(60));

        let uncapped = self::config(&[("SUPPORT_CHAT_MAX", "0")]);
        assert_eq!(uncapped.support.max_conversations, 1_000);
    }

    #[test]
    fn reads_remote_settings() {
        let config = config(&[
            ("PORT", "9000"),
            ("MOOD_CLASSIFIER", "HuggingFace"),
            ("MOOD_API_KEY", "hf_123"),
            ("MOOD_MIN_CONFIDENCE", "0.7"),
            ("SUPPORT_CHAT_URL", "http://localhost:54321/functions/v1/emotional-chat"),
        ]);
        assert_eq!(config.port, 9000);
        assert_eq!(config.classifier.backend, Backend::HuggingFace);
        assert_eq!(config.classifier.api_key.as_deref(), Some("hf_123"));
        assert_eq!(config.classifier.min_confidence, 0.7);
        assert!(config.support.url.is_some());
    }

    #[test]
    fn bad_values_fall_back_to_defaults() {
        let config = config(&[
            ("PORT", "http"),
            ("MOOD_CLASSIFIER", "tarot"),
            ("MOOD_MIN_CONFIDENCE", "4"),
            ("MOOD_API_KEY", "   "),
        ]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.classifier.backend, Backend::Local);
        assert_eq!(config.classifier.min_confidence, 0.5);
        assert_eq!(config.classifier.api_key, None);
    }

    #[test]
    fn request_key_overrides_configured_key() {
        let settings = ClassifierSettings {
            api_key: Some("server".to_string()),
            ..ClassifierSettings::default()
        };
        assert_eq!(
            settings.with_api_key(Some("client".to_string())).api_key.as_deref(),
            Some("client")
        );
        assert_eq!(settings.with_api_key(Some(" ".to_string())).api_key.as_deref(), Some("server"));
        assert_eq!(settings.with_api_key(None).api_key.as_deref(), Some("server"));
    }
}
