use rusqlite::{params, Connection, Row};

use crate::db::models::{date_of, Reply};
use crate::error::{AppError, AppResult};

fn map_reply(row: &Row) -> rusqlite::Result<Reply> {
    let created_at: String = row.get(7)?;
    Ok(Reply {
        id: row.get(0)?,
        entry_id: row.get(1)?,
        content: row.get(2)?,
        author: row.get(3)?,
        author_id: row.get(4)?,
        likes: row.get(5)?,
        dislikes: row.get(6)?,
        date: date_of(&created_at),
        created_at,
    })
}

/// Replies under one entry, oldest first so a thread reads top to bottom.
pub fn list_for_entry(conn: &Connection, entry_id: &str) -> AppResult<Vec<Reply>> {
    let mut stmt = conn.prepare(
        "SELECT id, entry_id, content, author, author_id, likes, dislikes, created_at \
         FROM replies WHERE entry_id = ?1 ORDER BY created_at ASC, id ASC",
    )?;
    let rows = stmt.query_map(params![entry_id], map_reply)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn get(conn: &Connection, id: &str) -> AppResult<Reply> {
    conn.query_row(
        "SELECT id, entry_id, content, author, author_id, likes, dislikes, created_at \
         FROM replies WHERE id = ?1",
        params![id],
        map_reply,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound,
        other => other.into(),
    })
}

pub fn insert(conn: &Connection, reply: &Reply) -> AppResult<()> {
    conn.execute(
        "INSERT INTO replies (id, entry_id, content, author, author_id, likes, dislikes, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            reply.id,
            reply.entry_id,
            reply.content,
            reply.author,
            reply.author_id,
            reply.likes,
            reply.dislikes,
            reply.created_at,
        ],
    )?;
    Ok(())
}

pub fn update_content(conn: &Connection, id: &str, content: &str) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE replies SET content = ?2 WHERE id = ?1",
        params![id, content],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub fn delete(conn: &Connection, id: &str) -> AppResult<()> {
    let changed = conn.execute("DELETE FROM replies WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

pub fn list_by_author(conn: &Connection, author_id: &str) -> AppResult<Vec<Reply>> {
    let mut stmt = conn.prepare(
        "SELECT id, entry_id, content, author, author_id, likes, dislikes, created_at \
         FROM replies WHERE author_id = ?1 ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![author_id], map_reply)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Every reply on the site, newest first, for the admin panel.
pub fn list_all(conn: &Connection) -> AppResult<Vec<Reply>> {
    let mut stmt = conn.prepare(
        "SELECT id, entry_id, content, author, author_id, likes, dislikes, created_at \
         FROM replies ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map([], map_reply)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn count(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM replies", [], |row| row.get(0))?)
}

pub fn count_by_author(conn: &Connection, author_id: &str) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM replies WHERE author_id = ?1",
        params![author_id],
        |row| row.get(0),
    )?)
}
