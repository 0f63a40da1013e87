use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tokio::sync::broadcast;

use crate::config::Config;
use crate::events::FeedEvent;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub events: broadcast::Sender<FeedEvent>,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        let (events, _) = broadcast::channel(256);
        Self { db, config, events }
    }

    /// Publish a feed event to all live subscribers. A send error only
    /// means nobody is currently subscribed.
    pub fn publish(&self, event: FeedEvent) {
        let _ = self.events.send(event);
    }
}
