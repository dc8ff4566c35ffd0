pub mod conversations;
pub mod notifications;
pub mod unread;

use crate::common::state::AppState;
use axum::Json;
use axum::Router;
use axum::routing::{get, post};
use serde::Serialize;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/conversations",
            post(conversations::create).get(conversations::list),
        )
        .route(
            "/conversations/{conversation_id}/messages",
            get(conversations::fetch_messages).post(conversations::send_message),
        )
        .route(
            "/conversations/{conversation_id}/read",
            post(conversations::mark_read),
        )
        .route(
            "/notifications",
            get(notifications::list).post(notifications::publish),
        )
        .route(
            "/notifications/{notification_id}/read",
            post(notifications::mark_read),
        )
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/unread", get(unread::unread_counts))
        .route("/status", get(status))
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse { status: "ok" })
}
