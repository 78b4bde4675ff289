use crate::classifier::{Analysis, ClassificationInput, analyze as run_classifier};
use crate::errors::{AppError, Notice};
use crate::journey::{CheckIn, support_message};
use crate::models::{
    AnalyzeRequest, AnalyzeResponse, ChatMessageRequest, ChatResponse, ClassifyRequest,
    ClassifyResponse, JourneyEntry, JourneyRequest, JourneyResponse, MoodCategory, MoodEntry,
    MoodOption, StartChatRequest, StatsResponse,
};
use crate::response::generate_response;
use crate::state::{AppState, SharedConversation};
use crate::stats::build_stats;
use crate::storage::persist_data;
use crate::support::Conversation;
use crate::ui::{render_index, theme_color};
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Html,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};

/// Identity supplied by the auth layer in front of the service.
pub const USER_HEADER: &str = "x-user-id";
/// Client-held credential for the remote classifier.
pub const API_KEY_HEADER: &str = "x-mood-api-key";

pub async fn index() -> Html<String> {
    Html(render_index())
}

pub async fn list_moods() -> Json<Vec<MoodOption>> {
    Json(
        MoodCategory::ALL
            .into_iter()
            .map(|mood| MoodOption {
                value: mood,
                label: mood.label(),
                emoji: mood.emoji(),
                color: theme_color(mood),
            })
            .collect(),
    )
}

pub async fn classify(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, AppError> {
    let input = ClassificationInput::from_parts(payload.mood.as_deref(), payload.text.as_deref())?;
    let Analysis { result, notices } = classify_input(&state, &headers, input).await;

    Ok(Json(ClassifyResponse {
        mood: result.category,
        emoji: result.category.emoji(),
        source: result.source,
        confidence: result.confidence,
        notices,
    }))
}

pub async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let input = ClassificationInput::from_parts(payload.mood.as_deref(), payload.text.as_deref())?;
    let user_id = current_user(&headers);
    if payload.save && user_id.is_none() {
        return Err(AppError::unauthorized("sign in to save mood entries"));
    }

    let Analysis { result, mut notices } = classify_input(&state, &headers, input).await;
    let response = generate_response(result.category, result.text.as_deref());

    let mut saved = false;
    if let Some(user_id) = user_id.filter(|_| payload.save) {
        let entry = MoodEntry {
            user_id,
            mood: result.category,
            emoji: result.category.emoji().to_string(),
            feelings_text: result.text.clone(),
            weather: payload.weather,
            message: response.message.clone(),
            suggested_activities: response.tips.clone(),
            created_at: Utc::now(),
        };
        match save_entry(&state, entry).await {
            Ok(()) => saved = true,
            Err(err) => {
                error!("failed to save mood entry: {}", err.message);
                notices.push(Notice::persistence_failed(&err));
            }
        }
    }

    Ok(Json(AnalyzeResponse {
        mood: result.category,
        emoji: result.category.emoji(),
        source: result.source,
        confidence: result.confidence,
        message: response.message,
        tips: response.tips,
        variant: response.variant,
        notices,
        saved,
    }))
}

pub async fn list_entries(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<MoodEntry>>, AppError> {
    let user_id = require_user(&headers)?;
    let data = state.data.lock().await;
    let mut entries: Vec<MoodEntry> = data
        .entries
        .iter()
        .filter(|entry| entry.user_id == user_id)
        .cloned()
        .collect();
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(entries))
}

pub async fn get_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>, AppError> {
    let user_id = require_user(&headers)?;
    let data = state.data.lock().await;
    Ok(Json(build_stats(&data, &user_id)))
}

pub async fn record_journey(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<JourneyRequest>,
) -> Result<Json<JourneyResponse>, AppError> {
    let check_in = CheckIn::new(
        payload.rating,
        payload.weather,
        payload.sleep,
        payload.day_quality,
    )?;
    let message = support_message(check_in.rating);

    let mut notices = Vec::new();
    let mut saved = false;
    if let Some(user_id) = current_user(&headers) {
        let journey = JourneyEntry {
            user_id,
            rating: check_in.rating,
            weather: check_in.weather,
            sleep: check_in.sleep,
            day_quality: check_in.day_quality,
            notes: payload.notes.filter(|notes| !notes.trim().is_empty()),
            created_at: Utc::now(),
        };
        match save_journey(&state, journey).await {
            Ok(()) => saved = true,
            Err(err) => {
                error!("failed to save journey: {}", err.message);
                notices.push(Notice::persistence_failed(&err));
            }
        }
    }

    Ok(Json(JourneyResponse {
        message,
        day_quality: check_in.day_quality,
        saved,
        notices,
    }))
}

pub async fn start_chat(
    State(state): State<AppState>,
    Json(payload): Json<StartChatRequest>,
) -> Json<ChatResponse> {
    let conversation = Conversation::new(payload.mood, payload.context);
    let turns = conversation.turns().to_vec();
    let (id, _) = state.open_conversation(conversation).await;
    Json(ChatResponse {
        id,
        reply: None,
        turns,
    })
}

pub async fn get_chat(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ChatResponse>, AppError> {
    let shared = find_conversation(&state, id).await?;
    let turns = shared.lock().await.turns().to_vec();
    Ok(Json(ChatResponse {
        id,
        reply: None,
        turns,
    }))
}

pub async fn send_chat_message(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<ChatMessageRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let shared = find_conversation(&state, id).await?;
    let request = shared.lock().await.begin_turn(&payload.text)?;

    // The task owns its handles so the turn is closed even if this request
    // is dropped mid-reply.
    let support = Arc::clone(&state.support);
    let conversation = Arc::clone(&shared);
    let reply = tokio::spawn(async move {
        let outcome = support.reply(&request).await;
        let turn = conversation.lock().await.finish_turn(outcome);
        turn
    })
    .await
    .map_err(AppError::internal)?;

    let turns = shared.lock().await.turns().to_vec();
    Ok(Json(ChatResponse {
        id,
        reply: Some(reply),
        turns,
    }))
}

pub async fn close_chat(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    if !state.close_conversation(id).await {
        return Err(AppError::not_found("no such conversation"));
    }
    info!(id, "closed conversation");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_conversation(state: &AppState, id: u64) -> Result<SharedConversation, AppError> {
    state
        .conversation(id)
        .await
        .ok_or_else(|| AppError::not_found("no such conversation"))
}

async fn classify_input(state: &AppState, headers: &HeaderMap, input: ClassificationInput) -> Analysis {
    let is_text = matches!(input, ClassificationInput::Text(_));
    let selected = state.classifier(header_value(headers, API_KEY_HEADER));
    let mut analysis = run_classifier(input, selected.classifier.as_ref()).await;
    if let Some(notice) = selected.notice.filter(|_| is_text) {
        analysis.notices.insert(0, notice);
    }
    analysis
}

async fn save_entry(state: &AppState, entry: MoodEntry) -> Result<(), AppError> {
    let mut data = state.data.lock().await;
    let mood = entry.mood;
    data.entries.push(entry);
    if let Err(err) = persist_data(&state.data_path, &data).await {
        data.entries.pop();
        return Err(err);
    }
    info!(%mood, "saved mood entry");
    Ok(())
}

async fn save_journey(state: &AppState, journey: JourneyEntry) -> Result<(), AppError> {
    let mut data = state.data.lock().await;
    data.journeys.push(journey);
    if let Err(err) = persist_data(&state.data_path, &data).await {
        data.journeys.pop();
        return Err(err);
    }
    Ok(())
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn current_user(headers: &HeaderMap) -> Option<String> {
    header_value(headers, USER_HEADER)
}

fn require_user(headers: &HeaderMap) -> Result<String, AppError> {
    current_user(headers).ok_or_else(|| AppError::unauthorized("sign in to view your history"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::errors::{NoticeKind, RemoteError};
    use crate::models::AppData;
    use crate::support::{ReplyBackend, Role, SupportRequest};
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Holds every reply until the test releases it.
    #[derive(Default)]
    struct GatedBackend {
        calls: AtomicUsize,
        release: Notify,
    }

    #[async_trait]
    impl ReplyBackend for GatedBackend {
        async fn reply(&self, request: &SupportRequest) -> Result<String, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            Ok(format!("heard: {}", request.message))
        }
    }

    fn state_at(data_path: PathBuf) -> AppState {
        let mut config = Config::from_lookup(|_| None);
        config.data_path = data_path;
        AppState::new(config, AppData::default())
    }

    fn unwritable_path() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir()
            .join(format!("mood_journal_missing_{}_{nanos}", std::process::id()))
            .join("state.json")
    }

    fn signed_in(user: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static(user));
        headers
    }

    async fn open_chat(state: &AppState) -> u64 {
        let Json(started) = start_chat(State(state.clone()), Json(StartChatRequest::default())).await;
        started.id
    }

    fn message(text: &str) -> Json<ChatMessageRequest> {
        Json(ChatMessageRequest {
            text: text.to_string(),
        })
    }

    #[tokio::test]
    async fn failed_save_keeps_analysis_and_rolls_back() {
        let state = state_at(unwritable_path());

        let Json(response) = analyze(
            State(state.clone()),
            signed_in("ana"),
            Json(AnalyzeRequest {
                mood: None,
                text: Some("I feel really tired today".to_string()),
                weather: None,
                save: true,
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.mood, MoodCategory::Sad);
        assert!(!response.message.is_empty());
        assert!(!response.tips.is_empty());
        assert!(!response.saved);
        assert_eq!(response.notices.len(), 1);
        assert_eq!(response.notices[0].kind, NoticeKind::PersistenceFailed);
        assert!(state.data.lock().await.entries.is_empty());
    }

    #[tokio::test]
    async fn failed_journey_save_rolls_back() {
        let state = state_at(unwritable_path());

        let Json(response) = record_journey(
            State(state.clone()),
            signed_in("ana"),
            Json(JourneyRequest {
                rating: Some(crate::journey::DayRating::Good),
                weather: Some(crate::journey::Weather::Sunny),
                sleep: Some(crate::journey::SleepQuality::Fair),
                day_quality: Some(7),
                notes: None,
            }),
        )
        .await
        .unwrap();

        assert!(!response.saved);
        assert_eq!(response.day_quality, 7);
        assert_eq!(response.notices[0].kind, NoticeKind::PersistenceFailed);
        assert!(state.data.lock().await.journeys.is_empty());
    }

    #[tokio::test]
    async fn pending_reply_rejects_second_send_but_not_reads() {
        let mut state = state_at(unwritable_path());
        let backend = Arc::new(GatedBackend::default());
        state.support = backend.clone();
        let id = open_chat(&state).await;

        let first = tokio::spawn(send_chat_message(State(state.clone()), Path(id), message("hello")));
        tokio::time::timeout(Duration::from_secs(2), async {
            while backend.calls.load(Ordering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("reply never started");

        let Json(transcript) = tokio::time::timeout(
            Duration::from_millis(500),
            get_chat(State(state.clone()), Path(id)),
        )
        .await
        .expect("transcript read waited on the reply")
        .unwrap();
        assert_eq!(transcript.turns.len(), 2);
        assert_eq!(transcript.turns[1].role, Role::User);

        let err = send_chat_message(State(state.clone()), Path(id), message("again"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);

        backend.release.notify_one();
        let Json(chat) = first.await.unwrap().unwrap();
        assert_eq!(chat.reply.map(|turn| turn.text).as_deref(), Some("heard: hello"));
        assert_eq!(chat.turns.len(), 3);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn blank_chat_message_is_bad_request() {
        let state = state_at(unwritable_path());
        let id = open_chat(&state).await;

        let err = send_chat_message(State(state.clone()), Path(id), message("  "))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let Json(chat) = send_chat_message(State(state.clone()), Path(id), message("hi"))
            .await
            .unwrap();
        assert_eq!(chat.turns.len(), 3);
    }

    #[tokio::test]
    async fn closed_chat_is_not_found() {
        let state = state_at(unwritable_path());
        let id = open_chat(&state).await;

        let status = close_chat(State(state.clone()), Path(id)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = get_chat(State(state.clone()), Path(id)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        let err = close_chat(State(state), Path(id)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
