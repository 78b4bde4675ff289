use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<InputError> for AppError {
    fn from(err: InputError) -> Self {
        match err {
            InputError::ReplyPending => Self::conflict(err.to_string()),
            _ => Self::bad_request(err.to_string()),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Rejected before any classification or network call happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("select a mood or describe how you feel")]
    Empty,
    #[error("choose either a mood or a description, not both")]
    Conflicting,
    #[error("unknown mood: {0}")]
    UnknownMood(String),
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("rating, weather and sleep are required")]
    IncompleteJourney,
    #[error("day quality must be between 1 and 10, got {0}")]
    DayQualityOutOfRange(i64),
    #[error("a reply is still on its way")]
    ReplyPending,
}

/// Failure talking to a remote sentiment or chat endpoint.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote analysis is not configured")]
    Unavailable,
    #[error("credentials rejected ({0})")]
    Unauthorized(u16),
    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Longest slice of a remote error body that is kept; the rest only goes to
/// the debug log.
const MAX_ERROR_BODY: usize = 200;

impl RemoteError {
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Self::Unauthorized(status.as_u16());
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown".to_string());
        debug!(status = status.as_u16(), %body, "remote endpoint rejected request");
        Self::Status {
            status: status.as_u16(),
            body: clip(body.trim()),
        }
    }
}

fn clip(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    RemoteUnavailable,
    RemoteRequestFailed,
    PersistenceFailed,
}

/// User-visible, non-fatal notification attached to a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    /// `missing` names what the backend still needs, e.g. "an API key".
    pub fn remote_unavailable(backend: &str, missing: &str) -> Self {
        Self {
            kind: NoticeKind::RemoteUnavailable,
            message: format!("{backend} analysis is disabled without {missing}; using local rules"),
        }
    }

    pub fn remote_failed(err: &RemoteError) -> Self {
        Self {
            kind: NoticeKind::RemoteRequestFailed,
            message: format!("AI analysis failed: {err}"),
        }
    }

    pub fn persistence_failed(err: &AppError) -> Self {
        Self {
            kind: NoticeKind::PersistenceFailed,
            message: format!("could not save your entry: {}", err.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: String) -> reqwest::Response {
        let response = axum::http::Response::builder()
            .status(status)
            .body(body)
            .unwrap();
        reqwest::Response::from(response)
    }

    #[tokio::test]
    async fn long_error_bodies_are_clipped() {
        let err = RemoteError::from_response(response(502, "x".repeat(5_000))).await;
        let RemoteError::Status { status, body } = &err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(*status, 502);
        assert_eq!(body.chars().count(), MAX_ERROR_BODY + 3);
        assert!(Notice::remote_failed(&err).message.len() < 300);
    }

    #[tokio::test]
    async fn short_error_bodies_are_kept() {
        let err = RemoteError::from_response(response(503, "model is loading".to_string())).await;
        assert_eq!(err.to_string(), "endpoint returned 503: model is loading");

        let err = RemoteError::from_response(response(403, "nope".to_string())).await;
        assert!(matches!(err, RemoteError::Unauthorized(403)));
    }

    #[test]
    fn clip_respects_char_boundaries() {
        let body = "é".repeat(MAX_ERROR_BODY + 10);
        assert_eq!(clip(&body).chars().count(), MAX_ERROR_BODY + 3);
    }

    #[test]
    fn pending_reply_is_a_conflict() {
        assert_eq!(AppError::from(InputError::ReplyPending).status, StatusCode::CONFLICT);
        assert_eq!(AppError::from(InputError::Empty).status, StatusCode::BAD_REQUEST);
    }
}
