//! HTTP DTOs for the session endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing
//! independent evolution.

use serde::{Deserialize, Serialize};

use crate::application::handlers::{
    RecordStatus, SendMessageResult, SessionView, SetFieldResult, StartSessionResult,
};
use crate::domain::conversation::{MessageRecord, Phase};
use crate::domain::session::{ReferenceMetadata, RetrievedReference};

// ════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════

/// Request to process one user turn.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

/// Request to set a case-record field.
#[derive(Debug, Clone, Deserialize)]
pub struct SetFieldRequest {
    pub value: String,
}

// ════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════

/// Response for session creation.
#[derive(Debug, Clone, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
}

impl From<StartSessionResult> for StartSessionResponse {
    fn from(result: StartSessionResult) -> Self {
        Self {
            session_id: result.session_id.to_string(),
        }
    }
}

/// Response for a processed turn.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageResponse {
    pub response: String,
    pub phase: Phase,
    pub transitioned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<ReferenceDto>>,
    pub record_status: RecordStatus,
}

impl From<SendMessageResult> for SendMessageResponse {
    fn from(result: SendMessageResult) -> Self {
        Self {
            response: result.response,
            phase: result.phase,
            transitioned: result.transitioned,
            references: result
                .references
                .map(|refs| refs.iter().map(ReferenceDto::from).collect()),
            record_status: result.record_status,
        }
    }
}

/// Reference metadata exposed over the API. Reference text stays server
/// side: it is never quoted to the end user.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceDto {
    pub id: String,
    pub title: String,
    pub score: f32,
}

impl From<&RetrievedReference> for ReferenceDto {
    fn from(reference: &RetrievedReference) -> Self {
        Self {
            id: reference.id.clone(),
            title: reference.title.clone(),
            score: reference.score,
        }
    }
}

impl From<&ReferenceMetadata> for ReferenceDto {
    fn from(metadata: &ReferenceMetadata) -> Self {
        Self {
            id: metadata.id.clone(),
            title: metadata.title.clone(),
            score: metadata.score,
        }
    }
}

/// Response for a field update.
#[derive(Debug, Clone, Serialize)]
pub struct SetFieldResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_status: Option<RecordStatus>,
}

impl From<SetFieldResult> for SetFieldResponse {
    fn from(result: SetFieldResult) -> Self {
        Self {
            success: result.success,
            error: result.error,
            record_status: result.record_status,
        }
    }
}

/// Detailed session view.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub created_at: String,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_transition_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<MessageDto>,
    pub references: Vec<ReferenceDto>,
    pub record: std::collections::BTreeMap<String, String>,
    pub record_status: RecordStatus,
}

impl From<SessionView> for SessionResponse {
    fn from(view: SessionView) -> Self {
        Self {
            id: view.id.to_string(),
            created_at: view.created_at.as_datetime().to_rfc3339(),
            phase: view.phase,
            phase_transition_at: view
                .phase_transition_at
                .map(|ts| ts.as_datetime().to_rfc3339()),
            model: view.model_id,
            messages: view.messages.iter().map(MessageDto::from).collect(),
            references: view.references.iter().map(ReferenceDto::from).collect(),
            record: view.record,
            record_status: view.record_status,
        }
    }
}

/// A message log entry.
#[derive(Debug, Clone, Serialize)]
pub struct MessageDto {
    pub role: String,
    pub content: String,
}

impl From<&MessageRecord> for MessageDto {
    fn from(message: &MessageRecord) -> Self {
        use crate::domain::conversation::Role;
        let role = match message.role() {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        Self {
            role: role.to_string(),
            content: message.content().to_string(),
        }
    }
}

/// Error payload.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_dto_omits_content() {
        let reference = RetrievedReference {
            id: "case-1".to_string(),
            title: "School refusal".to_string(),
            content: "Never serialized".to_string(),
            score: 0.2,
        };

        let json = serde_json::to_value(ReferenceDto::from(&reference)).unwrap();
        assert!(json.get("content").is_none());
        assert_eq!(json["id"], "case-1");
    }

    #[test]
    fn send_message_response_skips_absent_references() {
        let response = SendMessageResponse {
            response: "Hi".to_string(),
            phase: Phase::Intake,
            transitioned: false,
            references: None,
            record_status: RecordStatus {
                filled: 0,
                critical_filled: 0,
                additional_filled: 0,
                should_transition: false,
                status_message: "Context gathering".to_string(),
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("references").is_none());
        assert_eq!(json["phase"], "INTAKE");
    }

    #[test]
    fn message_dto_renders_roles() {
        let message = MessageRecord::assistant("Hello").unwrap();
        let dto = MessageDto::from(&message);
        assert_eq!(dto.role, "assistant");
        assert_eq!(dto.content, "Hello");
    }
}
