use crate::errors::{InputError, Notice};
use crate::journey::{DayRating, SleepQuality, Weather};
use crate::support::ChatTurn;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodCategory {
    Happy,
    Sad,
    Angry,
    Excited,
    Calm,
    Anxious,
}

impl MoodCategory {
    pub const ALL: [MoodCategory; 6] = [
        MoodCategory::Happy,
        MoodCategory::Sad,
        MoodCategory::Angry,
        MoodCategory::Excited,
        MoodCategory::Calm,
        MoodCategory::Anxious,
    ];

    /// Category used when free text matches no rule.
    pub const DEFAULT: MoodCategory = MoodCategory::Calm;

    pub fn as_str(self) -> &'static str {
        match self {
            MoodCategory::Happy => "happy",
            MoodCategory::Sad => "sad",
            MoodCategory::Angry => "angry",
            MoodCategory::Excited => "excited",
            MoodCategory::Calm => "calm",
            MoodCategory::Anxious => "anxious",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MoodCategory::Happy => "Happy",
            MoodCategory::Sad => "Sad",
            MoodCategory::Angry => "Angry",
            MoodCategory::Excited => "Excited",
            MoodCategory::Calm => "Calm",
            MoodCategory::Anxious => "Anxious",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            MoodCategory::Happy => "😊",
            MoodCategory::Sad => "😢",
            MoodCategory::Angry => "😠",
            MoodCategory::Excited => "🤩",
            MoodCategory::Calm => "😌",
            MoodCategory::Anxious => "😰",
        }
    }
}

impl fmt::Display for MoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MoodCategory {
    type Err = InputError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_lowercase();
        MoodCategory::ALL
            .into_iter()
            .find(|mood| mood.as_str() == normalized)
            .ok_or_else(|| InputError::UnknownMood(value.trim().to_string()))
    }
}

/// One saved mood check-in, shaped like the hosted `mood_entries` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoodEntry {
    pub user_id: String,
    pub mood: MoodCategory,
    pub emoji: String,
    #[serde(default)]
    pub feelings_text: Option<String>,
    #[serde(default)]
    pub weather: Option<Weather>,
    pub message: String,
    pub suggested_activities: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyEntry {
    pub user_id: String,
    pub rating: DayRating,
    pub weather: Weather,
    pub sleep: SleepQuality,
    pub day_quality: u8,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub entries: Vec<MoodEntry>,
    #[serde(default)]
    pub journeys: Vec<JourneyEntry>,
}

#[derive(Debug, Serialize)]
pub struct MoodOption {
    pub value: MoodCategory,
    pub label: &'static str,
    pub emoji: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub mood: MoodCategory,
    pub emoji: &'static str,
    pub source: crate::classifier::ClassificationSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub weather: Option<Weather>,
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub mood: MoodCategory,
    pub emoji: &'static str,
    pub source: crate::classifier::ClassificationSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    pub message: String,
    pub tips: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<&'static str>,
    pub notices: Vec<Notice>,
    pub saved: bool,
}

#[derive(Debug, Deserialize)]
pub struct JourneyRequest {
    #[serde(default)]
    pub rating: Option<DayRating>,
    #[serde(default)]
    pub weather: Option<Weather>,
    #[serde(default)]
    pub sleep: Option<SleepQuality>,
    /// Wider than the stored value so out-of-range input reaches validation.
    #[serde(default)]
    pub day_quality: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JourneyResponse {
    pub message: &'static str,
    pub day_quality: u8,
    pub saved: bool,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Deserialize, Default)]
pub struct StartChatRequest {
    #[serde(default)]
    pub mood: Option<MoodCategory>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<ChatTurn>,
    pub turns: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct DayMoodPoint {
    pub date: String,
    pub counts: Vec<MoodCount>,
    pub total: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant: Option<MoodCategory>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MoodCount {
    pub mood: MoodCategory,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct WeeklyMoodPoint {
    pub week: String,
    pub start_date: String,
    pub end_date: String,
    pub counts: Vec<MoodCount>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Serialize)]
pub struct JourneySummary {
    pub journeys: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_day_quality: Option<f64>,
    pub trend: Trend,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub last_7_days: Vec<DayMoodPoint>,
    pub weekly_totals: Vec<WeeklyMoodPoint>,
    pub journey: JourneySummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_names_parse_case_insensitively() {
        assert_eq!("Happy".parse::<MoodCategory>().unwrap(), MoodCategory::Happy);
        assert_eq!(" anxious ".parse::<MoodCategory>().unwrap(), MoodCategory::Anxious);
        assert!(matches!(
            "bored".parse::<MoodCategory>(),
            Err(InputError::UnknownMood(name)) if name == "bored"
        ));
    }

    #[test]
    fn mood_serializes_lowercase() {
        let value = serde_json::to_value(MoodCategory::Excited).unwrap();
        assert_eq!(value, serde_json::json!("excited"));
    }
}
