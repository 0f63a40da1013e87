// Feed events fanned out to SSE subscribers after each successful write.

use crate::db::models::{Entry, Reply, UserProfile};

#[derive(Debug, Clone)]
pub enum FeedEvent {
    EntryCreated(Entry),
    EntryUpdated {
        entry: Entry,
        /// Company spelling before the write.
        previous_company: String,
    },
    EntryDeleted { id: String, company: String },
    ReplyCreated(Reply),
    ReplyUpdated(Reply),
    ReplyDeleted { id: String, entry_id: String },
    UserCreated(UserProfile),
    UserUpdated(UserProfile),
}
