use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::db::models::{date_of, Reply};
use crate::db::{entries, replies};
use crate::error::{AppError, AppResult};
use crate::events::FeedEvent;
use crate::extractors::CurrentUser;
use crate::state::AppState;

const MAX_REPLY_CHARS: usize = 300;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/entries/{id}/replies",
            get(list_replies).post(create_reply),
        )
        .route("/api/replies/{id}", patch(update_reply).delete(delete_reply))
}

#[derive(Deserialize)]
pub struct ReplyRequest {
    pub content: String,
}

// -- Handlers --

/// GET /api/entries/{id}/replies — the thread under an entry, oldest first
pub async fn list_replies(
    State(state): State<AppState>,
    Path(entry_id): Path<String>,
) -> AppResult<Json<Vec<Reply>>> {
    let conn = state.db.get()?;
    Ok(Json(replies::list_for_entry(&conn, &entry_id)?))
}

/// POST /api/entries/{id}/replies — reply to an entry
pub async fn create_reply(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(entry_id): Path<String>,
    Json(req): Json<ReplyRequest>,
) -> AppResult<Response> {
    user.ensure_not_banned()?;
    let content = clean_content(&req.content)?;

    let reply = {
        let conn = state.db.get()?;
        // 404 before insert: replying to a deleted entry must not
        // resurrect its thread.
        entries::get(&conn, &entry_id)?;

        let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let reply = Reply {
            id: uuid::Uuid::now_v7().to_string(),
            entry_id,
            content,
            author: user.author_name(),
            author_id: user.id.clone(),
            date: date_of(&now),
            likes: 0,
            dislikes: 0,
            created_at: now,
        };
        replies::insert(&conn, &reply)?;
        reply
    };
    state.publish(FeedEvent::ReplyCreated(reply.clone()));

    Ok((StatusCode::CREATED, Json(reply)).into_response())
}

/// PATCH /api/replies/{id} — author or admin, content only
pub async fn update_reply(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<ReplyRequest>,
) -> AppResult<Json<Reply>> {
    user.ensure_not_banned()?;
    let content = clean_content(&req.content)?;

    let conn = state.db.get()?;
    let mut reply = replies::get(&conn, &id)?;
    if !user.can_edit(&reply.author_id) {
        return Err(AppError::Forbidden("Bu işlem için yetkiniz yok.".into()));
    }

    replies::update_content(&conn, &id, &content)?;
    reply.content = content;
    state.publish(FeedEvent::ReplyUpdated(reply.clone()));

    Ok(Json(reply))
}

/// DELETE /api/replies/{id} — author or admin
pub async fn delete_reply(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    user.ensure_not_banned()?;

    let conn = state.db.get()?;
    let reply = replies::get(&conn, &id)?;
    if !user.can_edit(&reply.author_id) {
        return Err(AppError::Forbidden("Bu işlem için yetkiniz yok.".into()));
    }

    replies::delete(&conn, &id)?;
    state.publish(FeedEvent::ReplyDeleted {
        id: reply.id,
        entry_id: reply.entry_id,
    });

    Ok(Json(json!({ "ok": true })))
}

fn clean_content(raw: &str) -> AppResult<String> {
    let content = raw.trim().to_string();
    if content.is_empty() {
        return Err(AppError::BadRequest("Yanıt boş olamaz".into()));
    }
    if content.chars().count() > MAX_REPLY_CHARS {
        return Err(AppError::BadRequest(
            "Yanıt en fazla 300 karakter olabilir".into(),
        ));
    }
    Ok(content)
}
