use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::db::models::{date_of, Entry, VoteKind};
use crate::db::{entries, votes};
use crate::error::{AppError, AppResult};
use crate::events::FeedEvent;
use crate::extractors::CurrentUser;
use crate::state::AppState;

const MAX_CONTENT_CHARS: usize = 500;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/entries", get(list_entries).post(create_entry))
        .route("/api/entries/{id}", patch(update_entry).delete(delete_entry))
        .route("/api/entries/{id}/vote", post(vote_entry))
        .route("/api/votes/me", get(my_votes))
}

// -- Request/response types --

#[derive(Deserialize)]
pub struct ListQuery {
    pub company: Option<String>,
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateEntryRequest {
    pub company: String,
    pub title: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct UpdateEntryRequest {
    pub company: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
}

#[derive(Deserialize)]
pub struct VoteRequest {
    pub kind: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub entry: Entry,
    pub my_vote: Option<VoteKind>,
}

// -- Handlers --

/// GET /api/entries — newest first; ?company= filters by exact spelling,
/// ?q= by case-insensitive substring over company/title/content
pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Entry>>> {
    let conn = state.db.get()?;
    let mut list = entries::list(&conn, query.company.as_deref())?;

    if let Some(q) = query.q.as_deref() {
        let q = q.trim().to_lowercase();
        if !q.is_empty() {
            list.retain(|entry| matches_query(entry, &q));
        }
    }

    Ok(Json(list))
}

/// POST /api/entries — publish a complaint
pub async fn create_entry(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateEntryRequest>,
) -> AppResult<Response> {
    user.ensure_not_banned()?;

    let company = req.company.trim().to_string();
    let title = req.title.trim().to_string();
    let content = req.content.trim().to_string();

    if company.is_empty() {
        return Err(AppError::BadRequest("Firma adı boş olamaz".into()));
    }
    if title.is_empty() {
        return Err(AppError::BadRequest("Başlık boş olamaz".into()));
    }
    if content.is_empty() {
        return Err(AppError::BadRequest("İçerik boş olamaz".into()));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::BadRequest(
            "İçerik en fazla 500 karakter olabilir".into(),
        ));
    }

    let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let entry = Entry {
        id: uuid::Uuid::now_v7().to_string(),
        company,
        title,
        content,
        author: user.author_name(),
        author_id: user.id.clone(),
        date: date_of(&now),
        likes: 0,
        dislikes: 0,
        created_at: now,
    };

    {
        let conn = state.db.get()?;
        entries::insert(&conn, &entry)?;
    }
    state.publish(FeedEvent::EntryCreated(entry.clone()));

    Ok((StatusCode::CREATED, Json(entry)).into_response())
}

/// PATCH /api/entries/{id} — author edits title/content, admin may also
/// change company and author
pub async fn update_entry(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateEntryRequest>,
) -> AppResult<Json<Entry>> {
    user.ensure_not_banned()?;

    let conn = state.db.get()?;
    let mut entry = entries::get(&conn, &id)?;
    if !user.can_edit(&entry.author_id) {
        return Err(AppError::Forbidden("Bu işlem için yetkiniz yok.".into()));
    }
    if (req.company.is_some() || req.author.is_some()) && !user.is_admin {
        return Err(AppError::Forbidden("Bu işlem için yetkiniz yok.".into()));
    }

    let previous_company = entry.company.clone();
    if let Some(company) = req.company {
        let company = company.trim().to_string();
        if company.is_empty() {
            return Err(AppError::BadRequest("Firma adı boş olamaz".into()));
        }
        entry.company = company;
    }
    if let Some(title) = req.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::BadRequest("Başlık boş olamaz".into()));
        }
        entry.title = title;
    }
    if let Some(content) = req.content {
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(AppError::BadRequest("İçerik boş olamaz".into()));
        }
        if content.chars().count() > MAX_CONTENT_CHARS {
            return Err(AppError::BadRequest(
                "İçerik en fazla 500 karakter olabilir".into(),
            ));
        }
        entry.content = content;
    }
    if let Some(author) = req.author {
        let author = author.trim().to_string();
        if author.is_empty() {
            return Err(AppError::BadRequest("Yazar adı boş olamaz".into()));
        }
        entry.author = author;
    }

    entries::update(&conn, &entry)?;
    state.publish(FeedEvent::EntryUpdated {
        entry: entry.clone(),
        previous_company,
    });

    Ok(Json(entry))
}

/// DELETE /api/entries/{id} — author or admin; replies and votes go with it
pub async fn delete_entry(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    user.ensure_not_banned()?;

    let conn = state.db.get()?;
    let entry = entries::get(&conn, &id)?;
    if !user.can_edit(&entry.author_id) {
        return Err(AppError::Forbidden("Bu işlem için yetkiniz yok.".into()));
    }

    let deleted = entries::delete_cascade(&conn, &id)?;
    state.publish(FeedEvent::EntryDeleted {
        id: deleted.id,
        company: deleted.company,
    });

    Ok(Json(json!({ "ok": true })))
}

/// POST /api/entries/{id}/vote — toggle a like/dislike press
pub async fn vote_entry(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> AppResult<Json<VoteResponse>> {
    user.ensure_not_banned()?;

    let kind = VoteKind::parse(req.kind.trim())
        .ok_or_else(|| AppError::BadRequest("Geçersiz oy türü".into()))?;

    let conn = state.db.get()?;
    let (entry, my_vote) = votes::toggle(&conn, &user.id, &id, kind)?;
    state.publish(FeedEvent::EntryUpdated {
        entry: entry.clone(),
        previous_company: entry.company.clone(),
    });

    Ok(Json(VoteResponse { entry, my_vote }))
}

/// GET /api/votes/me — the caller's active votes keyed by entry id
pub async fn my_votes(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<BTreeMap<String, VoteKind>>> {
    let conn = state.db.get()?;
    let mine = votes::for_user(&conn, &user.id)?;
    Ok(Json(mine.into_iter().collect()))
}

fn matches_query(entry: &Entry, q: &str) -> bool {
    entry.company.to_lowercase().contains(q)
        || entry.title.to_lowercase().contains(q)
        || entry.content.to_lowercase().contains(q)
}
