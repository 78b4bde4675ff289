use crate::errors::AppError;
use crate::models::AppData;
use std::path::Path;
use tokio::fs;
use tracing::error;

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

/// Writes to a sibling temp file first so a failed write leaves the previous
/// snapshot intact.
pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, payload).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MoodCategory, MoodEntry};
    use chrono::Utc;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("mood_journal_{name}_{}_{nanos}.json", std::process::id()));
        path
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let data = load_data(&temp_path("missing")).await;
        assert!(data.entries.is_empty());
        assert!(data.journeys.is_empty());
    }

    #[tokio::test]
    async fn persisted_entries_load_back() {
        let path = temp_path("roundtrip");
        let mut data = AppData::default();
        data.entries.push(MoodEntry {
            user_id: "ana".to_string(),
            mood: MoodCategory::Calm,
            emoji: MoodCategory::Calm.emoji().to_string(),
            feelings_text: Some("quiet morning".to_string()),
            weather: None,
            message: "Your inner peace is beautiful.".to_string(),
            suggested_activities: vec!["Practice meditation".to_string()],
            created_at: Utc::now(),
        });

        persist_data(&path, &data).await.unwrap();
        let loaded = load_data(&path).await;
        let _ = fs::remove_file(&path).await;

        assert_eq!(loaded.entries.len(), 1);
        assert_eq!(loaded.entries[0].mood, MoodCategory::Calm);
        assert_eq!(loaded.entries[0].feelings_text.as_deref(), Some("quiet morning"));
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty() {
        let path = temp_path("corrupt");
        fs::write(&path, b"{ not json").await.unwrap();
        let data = load_data(&path).await;
        let _ = fs::remove_file(&path).await;
        assert!(data.entries.is_empty());
    }
}
