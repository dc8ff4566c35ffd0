use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

pub type ServiceResult<T> = Result<T, AppError>;
pub type ServiceResponse<T> = ServiceResult<Json<T>>;

#[track_caller]
pub fn unexpected<T, E: Into<anyhow::Error>>(e: E) -> ServiceResult<T> {
    let caller = std::panic::Location::caller();
    error!("An unexpected error has occurred at {caller}: {}", e.into());
    Err(AppError::Unexpected)
}

#[derive(Debug, PartialEq, Eq)]
pub enum AppError {
    Unexpected,
    Unauthorized,
    DecodingRequestFailed,

    ConversationsNotFound,
    ConversationsForbidden,
    ConversationsWithSelf,

    ListingsNotFound,

    MessagesInvalidLength,

    NotificationsNotFound,
    NotificationsForbidden,
    NotificationsUnknownKind,

    InternalInvalidKey,
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    #[track_caller]
    fn from(e: E) -> Self {
        unexpected::<(), E>(e).unwrap_err()
    }
}

impl AppError {
    pub const fn as_str(&self) -> &str {
        self.code()
    }

    pub const fn code(&self) -> &'static str {
        match self {
            AppError::Unexpected => "unexpected",
            AppError::Unauthorized => "unauthorized",
            AppError::DecodingRequestFailed => "decoding_request_failed",

            AppError::ConversationsNotFound => "conversations.not_found",
            AppError::ConversationsForbidden => "conversations.forbidden",
            AppError::ConversationsWithSelf => "conversations.with_self",

            AppError::ListingsNotFound => "listings.not_found",

            AppError::MessagesInvalidLength => "messages.invalid_length",

            AppError::NotificationsNotFound => "notifications.not_found",
            AppError::NotificationsForbidden => "notifications.forbidden",
            AppError::NotificationsUnknownKind => "notifications.unknown_kind",

            AppError::InternalInvalidKey => "internal.invalid_key",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            AppError::Unexpected => "An unexpected error has occurred.",
            AppError::Unauthorized => "You are not authorized to perform this action.",
            AppError::DecodingRequestFailed => "Failed to decode request",

            AppError::ConversationsNotFound => "The conversation could not be found.",
            AppError::ConversationsForbidden => {
                "You are not a participant of this conversation."
            }
            AppError::ConversationsWithSelf => {
                "You cannot start a conversation about your own listing."
            }

            AppError::ListingsNotFound => "The listing could not be found.",

            AppError::MessagesInvalidLength => {
                "Your message was empty or too long. It has not been sent."
            }

            AppError::NotificationsNotFound => "The notification could not be found.",
            AppError::NotificationsForbidden => {
                "You are not the recipient of this notification."
            }
            AppError::NotificationsUnknownKind => "Unknown notification kind",

            AppError::InternalInvalidKey => "Invalid internal api key",
        }
    }

    pub const fn http_status_code(&self) -> StatusCode {
        match self {
            AppError::DecodingRequestFailed
            | AppError::ConversationsWithSelf
            | AppError::MessagesInvalidLength
            | AppError::NotificationsUnknownKind => StatusCode::BAD_REQUEST,

            AppError::Unauthorized => StatusCode::UNAUTHORIZED,

            AppError::ConversationsForbidden
            | AppError::NotificationsForbidden
            | AppError::InternalInvalidKey => StatusCode::FORBIDDEN,

            AppError::ConversationsNotFound
            | AppError::ListingsNotFound
            | AppError::NotificationsNotFound => StatusCode::NOT_FOUND,

            AppError::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn response_parts(&self) -> (StatusCode, Json<ErrorResponse>) {
        let status = self.http_status_code();
        let response = ErrorResponse {
            code: self.code(),
            message: self.message(),
        };
        (status, Json(response))
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.response_parts().into_response()
    }
}
