use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::db::models::{Entry, Reply};
use crate::db::{entries, replies, users};
use crate::error::AppResult;
use crate::extractors::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/profile", get(profile))
        .route("/api/profile/entries", get(my_entries))
        .route("/api/profile/replies", get(my_replies))
}

/// GET /api/profile — the caller's profile with activity counts
pub async fn profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;
    let me = users::get(&conn, &user.id)?;
    let entry_count = entries::count_by_author(&conn, &user.id)?;
    let reply_count = replies::count_by_author(&conn, &user.id)?;

    Ok(Json(json!({
        "id": me.id,
        "displayName": me.display_name,
        "email": me.email,
        "createdAt": me.created_at,
        "lastLoginAt": me.last_login_at,
        "isAdmin": user.is_admin,
        "entryCount": entry_count,
        "replyCount": reply_count,
    })))
}

/// GET /api/profile/entries — the caller's entries, newest first
pub async fn my_entries(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Entry>>> {
    let conn = state.db.get()?;
    Ok(Json(entries::list_by_author(&conn, &user.id)?))
}

/// GET /api/profile/replies — the caller's replies, newest first
pub async fn my_replies(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Reply>>> {
    let conn = state.db.get()?;
    Ok(Json(replies::list_by_author(&conn, &user.id)?))
}
