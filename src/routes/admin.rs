use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::auth::session;
use crate::company;
use crate::db::models::{Entry, Reply, UserProfile};
use crate::db::{entries, replies, users, votes};
use crate::error::AppResult;
use crate::events::FeedEvent;
use crate::extractors::AdminUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/entries", get(list_entries))
        .route("/api/admin/entries/delete", post(bulk_delete_entries))
        .route("/api/admin/replies", get(list_replies))
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/{id}/ban", post(ban_user))
        .route("/api/admin/users/{id}/unban", post(unban_user))
        .route("/api/admin/stats", get(stats))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<String>,
}

#[derive(Deserialize)]
pub struct BanRequest {
    pub reason: Option<String>,
}

// -- Handlers --

/// GET /api/admin/entries — all entries; ?q= also searches the author name
pub async fn list_entries(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Entry>>> {
    let conn = state.db.get()?;
    let mut list = entries::list(&conn, None)?;

    if let Some(q) = normalized(&query) {
        list.retain(|entry| entry_matches(entry, &q));
    }

    Ok(Json(list))
}

/// POST /api/admin/entries/delete — cascade-delete a batch of entries
pub async fn bulk_delete_entries(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(req): Json<BulkDeleteRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let deleted = {
        let conn = state.db.get()?;
        entries::delete_many_cascade(&conn, &req.ids)?
    };

    let count = deleted.len();
    for entry in deleted {
        state.publish(FeedEvent::EntryDeleted {
            id: entry.id,
            company: entry.company,
        });
    }

    Ok(Json(json!({ "deleted": count })))
}

/// GET /api/admin/replies — all replies; ?q= searches content/author
pub async fn list_replies(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Reply>>> {
    let conn = state.db.get()?;
    let mut list = replies::list_all(&conn)?;

    if let Some(q) = normalized(&query) {
        list.retain(|reply| reply_matches(reply, &q));
    }

    Ok(Json(list))
}

/// GET /api/admin/users — all profiles with ban state; ?q= searches
/// display name/email
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<UserProfile>>> {
    let conn = state.db.get()?;
    let mut list = users::list(&conn)?;

    if let Some(q) = normalized(&query) {
        list.retain(|user| user_matches(user, &q));
    }

    Ok(Json(list))
}

/// POST /api/admin/users/{id}/ban — suspend an account and revoke its
/// sessions
pub async fn ban_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
    Json(req): Json<BanRequest>,
) -> AppResult<Json<UserProfile>> {
    let reason = req
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty());

    let profile = {
        let conn = state.db.get()?;
        users::ban(&conn, &id, reason)?
    };
    session::delete_user_sessions(&state.db, &id)?;
    state.publish(FeedEvent::UserUpdated(profile.clone()));

    Ok(Json(profile))
}

/// POST /api/admin/users/{id}/unban — lift a suspension
pub async fn unban_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<String>,
) -> AppResult<Json<UserProfile>> {
    let profile = {
        let conn = state.db.get()?;
        users::unban(&conn, &id)?
    };
    state.publish(FeedEvent::UserUpdated(profile.clone()));

    Ok(Json(profile))
}

/// GET /api/admin/stats — site totals and recent-activity windows
pub async fn stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<serde_json::Value>> {
    let conn = state.db.get()?;

    let total_entries = entries::count(&conn)?;
    let total_replies = replies::count(&conn)?;
    let total_votes = votes::count(&conn)?;
    let total_users = users::count(&conn)?;
    let banned_users = users::count_banned(&conn)?;
    let total_companies = company::group_by_company(&entries::company_names(&conn)?).len() as i64;
    let (today, week, month) = entries::counts_by_window(&conn)?;

    Ok(Json(json!({
        "totalEntries": total_entries,
        "totalCompanies": total_companies,
        "totalReplies": total_replies,
        "totalVotes": total_votes,
        "totalUsers": total_users,
        "bannedUsers": banned_users,
        "activeUsers": total_users - banned_users,
        "entriesToday": today,
        "entriesLast7Days": week,
        "entriesLast30Days": month,
    })))
}

// -- Search filters --

fn normalized(query: &SearchQuery) -> Option<String> {
    let q = query.q.as_deref()?.trim().to_lowercase();
    if q.is_empty() {
        None
    } else {
        Some(q)
    }
}

fn entry_matches(entry: &Entry, q: &str) -> bool {
    entry.company.to_lowercase().contains(q)
        || entry.title.to_lowercase().contains(q)
        || entry.content.to_lowercase().contains(q)
        || entry.author.to_lowercase().contains(q)
}

fn reply_matches(reply: &Reply, q: &str) -> bool {
    reply.content.to_lowercase().contains(q) || reply.author.to_lowercase().contains(q)
}

fn user_matches(user: &UserProfile, q: &str) -> bool {
    user.display_name.to_lowercase().contains(q) || user.email.to_lowercase().contains(q)
}
