use serde_json::Value;
use thiserror::Error;

use crate::llm::UserProfile;
use crate::models::{ChatRequest, ResetRequest};

pub const DEFAULT_SESSION_ID: &str = "default";
pub const MAX_SESSION_ID_CHARS: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("request body is not valid JSON: {0}")]
    MalformedBody(String),
    #[error("message is required")]
    MissingMessage,
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("message exceeds {max_chars} characters")]
    MessageTooLong { max_chars: usize },
    #[error("sessionId exceeds {max_chars} characters")]
    SessionIdTooLong { max_chars: usize },
    #[error("sessionId contains control characters")]
    InvalidSessionId,
    #[error("userInfo must be a JSON object")]
    InvalidUserInfo,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedBody(_) => "malformed_body",
            Self::MissingMessage => "missing_message",
            Self::EmptyMessage => "empty_message",
            Self::MessageTooLong { .. } => "message_too_long",
            Self::SessionIdTooLong { .. } => "session_id_too_long",
            Self::InvalidSessionId => "invalid_session_id",
            Self::InvalidUserInfo => "invalid_user_info",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatInput {
    pub session_id: String,
    pub message: String,
    pub profile: UserProfile,
}

pub fn validate_chat_request(
    request: ChatRequest,
    max_message_chars: usize,
) -> Result<ChatInput, ValidationError> {
    let message = request.message.ok_or(ValidationError::MissingMessage)?;
    if message.trim().is_empty() {
        return Err(ValidationError::EmptyMessage);
    }
    if message.chars().count() > max_message_chars {
        return Err(ValidationError::MessageTooLong {
            max_chars: max_message_chars,
        });
    }

    let profile = match request.user_info {
        None | Some(Value::Null) => UserProfile::default(),
        Some(Value::Object(fields)) => UserProfile::new(fields),
        Some(_) => return Err(ValidationError::InvalidUserInfo),
    };

    Ok(ChatInput {
        session_id: resolve_session_id(request.session_id)?,
        message,
        profile,
    })
}

pub fn validate_reset_request(request: ResetRequest) -> Result<String, ValidationError> {
    resolve_session_id(request.session_id)
}

/// Falls back to the shared default session when the id is absent or blank.
pub fn resolve_session_id(raw: Option<String>) -> Result<String, ValidationError> {
    let Some(session_id) = raw.filter(|value| !value.trim().is_empty()) else {
        return Ok(DEFAULT_SESSION_ID.to_string());
    };

    if session_id.chars().count() > MAX_SESSION_ID_CHARS {
        return Err(ValidationError::SessionIdTooLong {
            max_chars: MAX_SESSION_ID_CHARS,
        });
    }
    if session_id.chars().any(char::is_control) {
        return Err(ValidationError::InvalidSessionId);
    }

    Ok(session_id)
}
