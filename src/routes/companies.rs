use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::company;
use crate::db::entries;
use crate::db::models::Entry;
use crate::error::AppResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/companies/stats", get(company_stats))
        .route("/api/companies/{slug}", get(company_info))
        .route("/api/companies/{slug}/entries", get(company_entries))
}

#[derive(Deserialize)]
pub struct FeedQuery {
    pub q: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyStats {
    pub name: String,
    pub total_complaints: i64,
}

// -- Handlers --

/// GET /api/companies/stats — the ten most complained-about companies,
/// spellings reconciled into one bucket each
pub async fn company_stats(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CompanyStats>>> {
    let conn = state.db.get()?;
    let names = entries::company_names(&conn)?;

    let stats = company::group_by_company(&names)
        .into_iter()
        .take(10)
        .map(|(name, total_complaints)| CompanyStats {
            name,
            total_complaints,
        })
        .collect();

    Ok(Json(stats))
}

/// GET /api/companies/{slug} — display name, description, reconciled
/// complaint count
pub async fn company_info(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let name = company::display_name(&slug);
    let description = company::description(&slug);

    let conn = state.db.get()?;
    let matcher = company::Matcher::new(&name);
    let total: i64 = entries::company_names(&conn)?
        .iter()
        .filter(|candidate| matcher.matches(candidate))
        .count() as i64;

    Ok(Json(json!({
        "slug": slug,
        "name": name,
        "description": description,
        "totalComplaints": total,
    })))
}

/// GET /api/companies/{slug}/entries — every entry reconciled to this
/// company, newest first; ?q= searches title/content within the feed
pub async fn company_entries(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<Vec<Entry>>> {
    let name = company::display_name(&slug);
    let matcher = company::Matcher::new(&name);

    let conn = state.db.get()?;
    let mut feed = entries::list(&conn, None)?;
    feed.retain(|entry| matcher.matches(&entry.company));

    if let Some(q) = query.q.as_deref() {
        let q = q.trim().to_lowercase();
        if !q.is_empty() {
            feed.retain(|entry| matches_feed_query(entry, &q));
        }
    }

    Ok(Json(feed))
}

fn matches_feed_query(entry: &Entry, q: &str) -> bool {
    entry.title.to_lowercase().contains(q) || entry.content.to_lowercase().contains(q)
}
