// Live feeds over Server-Sent Events. Every stream opens with a
// `snapshot` event carrying the full current list, then forwards
// incremental `created` / `updated` / `deleted` events from the broadcast
// channel. A subscriber that lags far enough to drop events gets a fresh
// snapshot instead of the gap. An update that reassigns an entry's company
// reaches feeds scoped to the old spelling as a `deleted` event.

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::Router;
use futures::stream::{self, Stream};
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;

use crate::db::{entries, replies, users};
use crate::error::{AppError, AppResult};
use crate::events::FeedEvent;
use crate::extractors::AdminUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stream/entries", get(entry_events))
        .route("/api/stream/replies", get(reply_events))
        .route("/api/stream/users", get(user_events))
}

#[derive(Deserialize)]
pub struct EntryStreamQuery {
    pub company: Option<String>,
}

#[derive(Deserialize)]
pub struct ReplyStreamQuery {
    pub entry: String,
}

// -- Handlers --

/// GET /api/stream/entries — the entry feed, optionally scoped to one
/// exact company spelling
async fn entry_events(
    State(state): State<AppState>,
    Query(query): Query<EntryStreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let rx = state.events.subscribe();
    let snapshot = entry_snapshot(&state, query.company.as_deref())?;
    let company = query.company;

    let live = BroadcastStream::new(rx).filter_map(move |received| {
        let event = match received {
            Ok(event) => entry_event(&event, company.as_deref()),
            Err(BroadcastStreamRecvError::Lagged(_)) => {
                entry_snapshot(&state, company.as_deref()).ok()
            }
        };
        event.map(Ok::<Event, Infallible>)
    });

    let stream = stream::once(async move { Ok::<Event, Infallible>(snapshot) }).chain(live);
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// GET /api/stream/replies?entry= — one entry's thread
async fn reply_events(
    State(state): State<AppState>,
    Query(query): Query<ReplyStreamQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let rx = state.events.subscribe();
    let snapshot = reply_snapshot(&state, &query.entry)?;
    let entry = query.entry;

    let live = BroadcastStream::new(rx).filter_map(move |received| {
        let event = match received {
            Ok(event) => reply_event(&event, &entry).or_else(|| match &event {
                // Cascade delete empties the thread without per-reply
                // events; resync with a snapshot.
                FeedEvent::EntryDeleted { id, .. } if *id == entry => {
                    reply_snapshot(&state, &entry).ok()
                }
                _ => None,
            }),
            Err(BroadcastStreamRecvError::Lagged(_)) => reply_snapshot(&state, &entry).ok(),
        };
        event.map(Ok::<Event, Infallible>)
    });

    let stream = stream::once(async move { Ok::<Event, Infallible>(snapshot) }).chain(live);
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// GET /api/stream/users — profile feed for the admin panel
async fn user_events(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let rx = state.events.subscribe();
    let snapshot = user_snapshot(&state)?;

    let live = BroadcastStream::new(rx).filter_map(move |received| {
        let event = match received {
            Ok(event) => user_event(&event),
            Err(BroadcastStreamRecvError::Lagged(_)) => user_snapshot(&state).ok(),
        };
        event.map(Ok::<Event, Infallible>)
    });

    let stream = stream::once(async move { Ok::<Event, Infallible>(snapshot) }).chain(live);
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

// -- Snapshots --

fn entry_snapshot(state: &AppState, company: Option<&str>) -> AppResult<Event> {
    let conn = state.db.get()?;
    let list = entries::list(&conn, company)?;
    Ok(Event::default()
        .event("snapshot")
        .data(serde_json::to_string(&list)?))
}

fn reply_snapshot(state: &AppState, entry_id: &str) -> AppResult<Event> {
    let conn = state.db.get()?;
    let list = replies::list_for_entry(&conn, entry_id)?;
    Ok(Event::default()
        .event("snapshot")
        .data(serde_json::to_string(&list)?))
}

fn user_snapshot(state: &AppState) -> AppResult<Event> {
    let conn = state.db.get()?;
    let list = users::list(&conn)?;
    Ok(Event::default()
        .event("snapshot")
        .data(serde_json::to_string(&list)?))
}

// -- Event filters --

fn entry_event(event: &FeedEvent, company: Option<&str>) -> Option<Event> {
    let wanted = |c: &str| company.map_or(true, |want| want == c);
    match event {
        FeedEvent::EntryCreated(e) if wanted(&e.company) => data_event("created", e),
        FeedEvent::EntryUpdated { entry: e, .. } if wanted(&e.company) => {
            data_event("updated", e)
        }
        // Moved to another company; the old scope sees a delete.
        FeedEvent::EntryUpdated {
            entry: e,
            previous_company,
        } if wanted(previous_company) => data_event("deleted", &json!({ "id": e.id })),
        FeedEvent::EntryDeleted { id, company: c } if wanted(c) => {
            data_event("deleted", &json!({ "id": id }))
        }
        _ => None,
    }
}

fn reply_event(event: &FeedEvent, entry_id: &str) -> Option<Event> {
    match event {
        FeedEvent::ReplyCreated(r) if r.entry_id == entry_id => data_event("created", r),
        FeedEvent::ReplyUpdated(r) if r.entry_id == entry_id => data_event("updated", r),
        FeedEvent::ReplyDeleted { id, entry_id: e } if e == entry_id => {
            data_event("deleted", &json!({ "id": id }))
        }
        _ => None,
    }
}

fn user_event(event: &FeedEvent) -> Option<Event> {
    match event {
        FeedEvent::UserCreated(u) => data_event("created", u),
        FeedEvent::UserUpdated(u) => data_event("updated", u),
        _ => None,
    }
}

fn data_event<T: serde::Serialize>(name: &'static str, value: &T) -> Option<Event> {
    serde_json::to_string(value)
        .ok()
        .map(|data| Event::default().event(name).data(data))
}
