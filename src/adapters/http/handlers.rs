//! HTTP handlers for the session endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;

use crate::application::handlers::{
    GetSessionError, GetSessionHandler, SendMessageCommand, SendMessageError, SendMessageHandler,
    SetFieldCommand, SetFieldError, SetFieldHandler, StartSessionError, StartSessionHandler,
};
use crate::domain::foundation::SessionId;
use crate::ports::CompletionError;

use super::dto::{
    ErrorResponse, SendMessageRequest, SendMessageResponse, SessionResponse, SetFieldRequest,
    SetFieldResponse, StartSessionResponse,
};

// ════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct MentorHandlers {
    start_handler: Arc<StartSessionHandler>,
    send_handler: Arc<SendMessageHandler>,
    set_field_handler: Arc<SetFieldHandler>,
    get_handler: Arc<GetSessionHandler>,
}

impl MentorHandlers {
    pub fn new(
        start_handler: Arc<StartSessionHandler>,
        send_handler: Arc<SendMessageHandler>,
        set_field_handler: Arc<SetFieldHandler>,
        get_handler: Arc<GetSessionHandler>,
    ) -> Self {
        Self {
            start_handler,
            send_handler,
            set_field_handler,
            get_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════

/// POST /api/sessions - Create a new session
pub async fn start_session(State(handlers): State<MentorHandlers>) -> Response {
    match handlers.start_handler.handle().await {
        Ok(result) => {
            let response: StartSessionResponse = result.into();
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(StartSessionError::Store(e)) => storage_error(e.to_string()),
    }
}

/// GET /api/sessions/:id - Get session state
pub async fn get_session(
    State(handlers): State<MentorHandlers>,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.get_handler.handle(session_id).await {
        Ok(view) => {
            let response: SessionResponse = view.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(GetSessionError::Store(e)) => storage_error(e.to_string()),
    }
}

/// POST /api/sessions/:id/messages - Process one user turn
pub async fn send_message(
    State(handlers): State<MentorHandlers>,
    Path(session_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cmd = SendMessageCommand {
        session_id,
        message: req.message,
    };

    match handlers.send_handler.handle(cmd).await {
        Ok(result) => {
            let response: SendMessageResponse = result.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => send_message_error(e),
    }
}

/// PUT /api/sessions/:id/record/:field - Set a case-record field
pub async fn set_field(
    State(handlers): State<MentorHandlers>,
    Path((session_id, field)): Path<(String, String)>,
    Json(req): Json<SetFieldRequest>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cmd = SetFieldCommand {
        session_id,
        field,
        value: req.value,
    };

    match handlers.set_field_handler.handle(cmd).await {
        Ok(result) => {
            let status = if result.success {
                StatusCode::OK
            } else {
                StatusCode::UNPROCESSABLE_ENTITY
            };
            let response: SetFieldResponse = result.into();
            (status, Json(response)).into_response()
        }
        Err(SetFieldError::Store(e)) => storage_error(e.to_string()),
    }
}

// ════════════════════════════════════════════════════════════════════════
// Error mapping
// ════════════════════════════════════════════════════════════════════════

fn parse_session_id(raw: &str) -> Result<SessionId, Response> {
    raw.parse::<SessionId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid session ID")),
        )
            .into_response()
    })
}

fn storage_error(message: String) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("STORAGE_ERROR", message)),
    )
        .into_response()
}

fn send_message_error(error: SendMessageError) -> Response {
    match error {
        SendMessageError::Completion(e) => {
            let status = match e {
                CompletionError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::BAD_GATEWAY,
            };
            (
                status,
                Json(ErrorResponse::new("COMPLETION_ERROR", e.to_string())),
            )
                .into_response()
        }
        SendMessageError::Store(e) => storage_error(e.to_string()),
        SendMessageError::Domain(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse::new(e.code.to_string(), e.message)),
        )
            .into_response(),
    }
}
