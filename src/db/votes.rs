use rusqlite::{params, Connection};

use crate::db::entries;
use crate::db::models::{Entry, VoteKind};
use crate::error::{AppError, AppResult};

/// One toggle press for a (user, entry, kind). Pressing the kind already
/// recorded removes the vote, pressing the other kind overwrites it, and
/// pressing with no vote on record creates one. The vote row and the
/// denormalized counters on the entry move in the same transaction, so
/// the counters always equal the live vote rows.
///
/// Returns the entry with fresh counters and the user's vote state after
/// the press (`None` when the press removed it).
pub fn toggle(
    conn: &Connection,
    user_id: &str,
    entry_id: &str,
    kind: VoteKind,
) -> AppResult<(Entry, Option<VoteKind>)> {
    conn.execute("BEGIN IMMEDIATE", [])?;
    let result: AppResult<(Entry, Option<VoteKind>)> = (|| {
        // Entry existence decides 404 before anything is written.
        entries::get(conn, entry_id)?;

        let current = match conn.query_row(
            "SELECT kind FROM votes WHERE user_id = ?1 AND entry_id = ?2",
            params![user_id, entry_id],
            |row| row.get::<_, String>(0),
        ) {
            Ok(stored) => Some(VoteKind::parse(&stored).ok_or_else(|| {
                AppError::Internal(format!("unknown vote kind in database: {}", stored))
            })?),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };

        let my_vote = match current {
            Some(prev) if prev == kind => {
                conn.execute(
                    "DELETE FROM votes WHERE user_id = ?1 AND entry_id = ?2",
                    params![user_id, entry_id],
                )?;
                conn.execute(
                    &format!(
                        "UPDATE entries SET {col} = MAX({col} - 1, 0) WHERE id = ?1",
                        col = kind.counter_column(),
                    ),
                    params![entry_id],
                )?;
                None
            }
            Some(prev) => {
                conn.execute(
                    "UPDATE votes SET kind = ?3, created_at = datetime('now') \
                     WHERE user_id = ?1 AND entry_id = ?2",
                    params![user_id, entry_id, kind.as_str()],
                )?;
                conn.execute(
                    &format!(
                        "UPDATE entries SET {new} = {new} + 1, {old} = MAX({old} - 1, 0) WHERE id = ?1",
                        new = kind.counter_column(),
                        old = prev.counter_column(),
                    ),
                    params![entry_id],
                )?;
                Some(kind)
            }
            None => {
                conn.execute(
                    "INSERT INTO votes (user_id, entry_id, kind) VALUES (?1, ?2, ?3)",
                    params![user_id, entry_id, kind.as_str()],
                )?;
                conn.execute(
                    &format!(
                        "UPDATE entries SET {col} = {col} + 1 WHERE id = ?1",
                        col = kind.counter_column(),
                    ),
                    params![entry_id],
                )?;
                Some(kind)
            }
        };

        let entry = entries::get(conn, entry_id)?;
        Ok((entry, my_vote))
    })();
    match result {
        Ok(value) => {
            conn.execute("COMMIT", [])?;
            Ok(value)
        }
        Err(e) => {
            conn.execute("ROLLBACK", [])?;
            Err(e)
        }
    }
}

/// Every vote a user currently holds, as (entry id, kind) pairs.
pub fn for_user(conn: &Connection, user_id: &str) -> AppResult<Vec<(String, VoteKind)>> {
    let mut stmt = conn.prepare("SELECT entry_id, kind FROM votes WHERE user_id = ?1")?;
    let rows = stmt.query_map(params![user_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (entry_id, stored) = row?;
        if let Some(kind) = VoteKind::parse(&stored) {
            out.push((entry_id, kind));
        }
    }
    Ok(out)
}

pub fn count(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM votes", [], |row| row.get(0))?)
}
