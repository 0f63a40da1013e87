use rusqlite::{params, Connection, Row};

use crate::db::models::{date_of, Entry};
use crate::error::{AppError, AppResult};

pub(crate) fn map_entry(row: &Row) -> rusqlite::Result<Entry> {
    let created_at: String = row.get(8)?;
    Ok(Entry {
        id: row.get(0)?,
        company: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        author: row.get(4)?,
        author_id: row.get(5)?,
        likes: row.get(6)?,
        dislikes: row.get(7)?,
        date: date_of(&created_at),
        created_at,
    })
}

/// All entries, newest first, optionally restricted to one exact
/// company spelling.
pub fn list(conn: &Connection, company: Option<&str>) -> AppResult<Vec<Entry>> {
    match company {
        Some(company) => {
            let mut stmt = conn.prepare(
                "SELECT id, company, title, content, author, author_id, likes, dislikes, created_at \
                 FROM entries WHERE company = ?1 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt.query_map(params![company], map_entry)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT id, company, title, content, author, author_id, likes, dislikes, created_at \
                 FROM entries ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt.query_map([], map_entry)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        }
    }
}

pub fn get(conn: &Connection, id: &str) -> AppResult<Entry> {
    conn.query_row(
        "SELECT id, company, title, content, author, author_id, likes, dislikes, created_at \
         FROM entries WHERE id = ?1",
        params![id],
        map_entry,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound,
        other => other.into(),
    })
}

pub fn insert(conn: &Connection, entry: &Entry) -> AppResult<()> {
    conn.execute(
        "INSERT INTO entries (id, company, title, content, author, author_id, likes, dislikes, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            entry.id,
            entry.company,
            entry.title,
            entry.content,
            entry.author,
            entry.author_id,
            entry.likes,
            entry.dislikes,
            entry.created_at,
        ],
    )?;
    Ok(())
}

/// Write back the editable fields of an entry.
pub fn update(conn: &Connection, entry: &Entry) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE entries SET company = ?2, title = ?3, content = ?4, author = ?5 WHERE id = ?1",
        params![
            entry.id,
            entry.company,
            entry.title,
            entry.content,
            entry.author,
        ],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Delete an entry together with its replies and votes, atomically.
/// Returns the entry as it was before deletion.
pub fn delete_cascade(conn: &Connection, id: &str) -> AppResult<Entry> {
    conn.execute("BEGIN IMMEDIATE", [])?;
    let result: AppResult<Entry> = (|| {
        let entry = get(conn, id)?;
        conn.execute("DELETE FROM votes WHERE entry_id = ?1", params![id])?;
        conn.execute("DELETE FROM replies WHERE entry_id = ?1", params![id])?;
        conn.execute("DELETE FROM entries WHERE id = ?1", params![id])?;
        Ok(entry)
    })();
    match result {
        Ok(entry) => {
            conn.execute("COMMIT", [])?;
            Ok(entry)
        }
        Err(e) => {
            conn.execute("ROLLBACK", [])?;
            Err(e)
        }
    }
}

/// Bulk variant of [`delete_cascade`]. Ids that no longer exist are
/// skipped; the whole batch commits or rolls back as one.
pub fn delete_many_cascade(conn: &Connection, ids: &[String]) -> AppResult<Vec<Entry>> {
    conn.execute("BEGIN IMMEDIATE", [])?;
    let result: AppResult<Vec<Entry>> = (|| {
        let mut deleted = Vec::new();
        for id in ids {
            let entry = match conn.query_row(
                "SELECT id, company, title, content, author, author_id, likes, dislikes, created_at \
                 FROM entries WHERE id = ?1",
                params![id],
                map_entry,
            ) {
                Ok(entry) => entry,
                Err(rusqlite::Error::QueryReturnedNoRows) => continue,
                Err(e) => return Err(e.into()),
            };
            conn.execute("DELETE FROM votes WHERE entry_id = ?1", params![id])?;
            conn.execute("DELETE FROM replies WHERE entry_id = ?1", params![id])?;
            conn.execute("DELETE FROM entries WHERE id = ?1", params![id])?;
            deleted.push(entry);
        }
        Ok(deleted)
    })();
    match result {
        Ok(deleted) => {
            conn.execute("COMMIT", [])?;
            Ok(deleted)
        }
        Err(e) => {
            conn.execute("ROLLBACK", [])?;
            Err(e)
        }
    }
}

pub fn list_by_author(conn: &Connection, author_id: &str) -> AppResult<Vec<Entry>> {
    let mut stmt = conn.prepare(
        "SELECT id, company, title, content, author, author_id, likes, dislikes, created_at \
         FROM entries WHERE author_id = ?1 ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![author_id], map_entry)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Raw company spellings of every entry, oldest first so the earliest
/// spelling names its reconciliation group.
pub fn company_names(conn: &Connection) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare("SELECT company FROM entries ORDER BY created_at ASC, id ASC")?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn count(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?)
}

pub fn count_by_author(conn: &Connection, author_id: &str) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM entries WHERE author_id = ?1",
        params![author_id],
        |row| row.get(0),
    )?)
}

/// Entry counts for the admin dashboard: today, last 7 days, last 30 days.
pub fn counts_by_window(conn: &Connection) -> AppResult<(i64, i64, i64)> {
    let today = conn.query_row(
        "SELECT COUNT(*) FROM entries WHERE created_at >= date('now')",
        [],
        |row| row.get(0),
    )?;
    let week = conn.query_row(
        "SELECT COUNT(*) FROM entries WHERE created_at >= datetime('now', '-7 days')",
        [],
        |row| row.get(0),
    )?;
    let month = conn.query_row(
        "SELECT COUNT(*) FROM entries WHERE created_at >= datetime('now', '-30 days')",
        [],
        |row| row.get(0),
    )?;
    Ok((today, week, month))
}
