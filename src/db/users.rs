use rusqlite::{params, Connection, Row};

use crate::db::models::UserProfile;
use crate::error::{AppError, AppResult, AuthError};

/// Login-time credential row. The password hash stays inside the auth
/// layer; everything else ships profiles without it.
pub struct Credentials {
    pub id: String,
    pub password_hash: String,
    pub banned: bool,
    pub ban_reason: Option<String>,
}

fn map_profile(row: &Row) -> rusqlite::Result<UserProfile> {
    Ok(UserProfile {
        id: row.get(0)?,
        display_name: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
        last_login_at: row.get(4)?,
        banned: row.get(5)?,
        ban_reason: row.get(6)?,
        banned_at: row.get(7)?,
    })
}

pub fn create(
    conn: &Connection,
    id: &str,
    display_name: &str,
    email: &str,
    password_hash: &str,
) -> AppResult<UserProfile> {
    let result = conn.execute(
        "INSERT INTO users (id, display_name, email, password_hash) VALUES (?1, ?2, ?3, ?4)",
        params![id, display_name, email, password_hash],
    );
    match result {
        Ok(_) => get(conn, id),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(AuthError::EmailInUse.into())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn get(conn: &Connection, id: &str) -> AppResult<UserProfile> {
    conn.query_row(
        "SELECT id, display_name, email, created_at, last_login_at, banned, ban_reason, banned_at \
         FROM users WHERE id = ?1",
        params![id],
        map_profile,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => AppError::NotFound,
        other => other.into(),
    })
}

pub fn credentials_by_email(conn: &Connection, email: &str) -> AppResult<Option<Credentials>> {
    let result = conn.query_row(
        "SELECT id, password_hash, banned, ban_reason FROM users WHERE email = ?1",
        params![email],
        |row| {
            Ok(Credentials {
                id: row.get(0)?,
                password_hash: row.get(1)?,
                banned: row.get(2)?,
                ban_reason: row.get(3)?,
            })
        },
    );
    match result {
        Ok(c) => Ok(Some(c)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn touch_last_login(conn: &Connection, id: &str) -> AppResult<()> {
    conn.execute(
        "UPDATE users SET last_login_at = datetime('now') WHERE id = ?1",
        params![id],
    )?;
    Ok(())
}

/// All profiles, newest registration first.
pub fn list(conn: &Connection) -> AppResult<Vec<UserProfile>> {
    let mut stmt = conn.prepare(
        "SELECT id, display_name, email, created_at, last_login_at, banned, ban_reason, banned_at \
         FROM users ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map([], map_profile)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

pub fn ban(conn: &Connection, id: &str, reason: Option<&str>) -> AppResult<UserProfile> {
    let changed = conn.execute(
        "UPDATE users SET banned = 1, ban_reason = ?2, banned_at = datetime('now') WHERE id = ?1",
        params![id, reason],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound);
    }
    get(conn, id)
}

pub fn unban(conn: &Connection, id: &str) -> AppResult<UserProfile> {
    let changed = conn.execute(
        "UPDATE users SET banned = 0, ban_reason = NULL, banned_at = NULL WHERE id = ?1",
        params![id],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound);
    }
    get(conn, id)
}

pub fn count(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
}

pub fn count_banned(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM users WHERE banned = 1", [], |row| {
        row.get(0)
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::test_pool;

    #[test]
    fn create_and_get_round_trip() {
        let pool = test_pool();
        let conn = pool.get().unwrap();

        let profile = create(&conn, "u1", "Ayşe", "ayse@example.com", "hash").unwrap();
        assert_eq!(profile.id, "u1");
        assert_eq!(profile.display_name, "Ayşe");
        assert_eq!(profile.email, "ayse@example.com");
        assert!(!profile.banned);
        assert!(profile.last_login_at.is_none());

        let fetched = get(&conn, "u1").unwrap();
        assert_eq!(fetched.email, "ayse@example.com");
    }

    #[test]
    fn duplicate_email_is_rejected_in_turkish() {
        let pool = test_pool();
        let conn = pool.get().unwrap();

        create(&conn, "u1", "Ayşe", "ayse@example.com", "hash").unwrap();
        let err = create(&conn, "u2", "Diğer", "ayse@example.com", "hash").unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::EmailInUse)));
        assert_eq!(err.to_string(), "Bu e-posta adresi zaten kullanımda");
    }

    #[test]
    fn get_missing_user_is_not_found() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        assert!(matches!(get(&conn, "nope"), Err(AppError::NotFound)));
    }

    #[test]
    fn credentials_lookup_by_email() {
        let pool = test_pool();
        let conn = pool.get().unwrap();

        create(&conn, "u1", "Ayşe", "ayse@example.com", "secret-hash").unwrap();
        let creds = credentials_by_email(&conn, "ayse@example.com")
            .unwrap()
            .unwrap();
        assert_eq!(creds.id, "u1");
        assert_eq!(creds.password_hash, "secret-hash");
        assert!(!creds.banned);

        assert!(credentials_by_email(&conn, "yok@example.com")
            .unwrap()
            .is_none());
    }

    #[test]
    fn touch_last_login_sets_timestamp() {
        let pool = test_pool();
        let conn = pool.get().unwrap();

        create(&conn, "u1", "Ayşe", "ayse@example.com", "hash").unwrap();
        touch_last_login(&conn, "u1").unwrap();
        let profile = get(&conn, "u1").unwrap();
        assert!(profile.last_login_at.is_some());
    }

    #[test]
    fn ban_sets_flag_reason_and_timestamp() {
        let pool = test_pool();
        let conn = pool.get().unwrap();

        create(&conn, "u1", "Ayşe", "ayse@example.com", "hash").unwrap();
        let banned = ban(&conn, "u1", Some("spam")).unwrap();
        assert!(banned.banned);
        assert_eq!(banned.ban_reason.as_deref(), Some("spam"));
        assert!(banned.banned_at.is_some());

        let unbanned = unban(&conn, "u1").unwrap();
        assert!(!unbanned.banned);
        assert!(unbanned.ban_reason.is_none());
        assert!(unbanned.banned_at.is_none());
    }

    #[test]
    fn ban_missing_user_is_not_found() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        assert!(matches!(ban(&conn, "nope", None), Err(AppError::NotFound)));
        assert!(matches!(unban(&conn, "nope"), Err(AppError::NotFound)));
    }

    #[test]
    fn counts_track_banned_users() {
        let pool = test_pool();
        let conn = pool.get().unwrap();

        create(&conn, "u1", "Ayşe", "ayse@example.com", "hash").unwrap();
        create(&conn, "u2", "Ali", "ali@example.com", "hash").unwrap();
        assert_eq!(count(&conn).unwrap(), 2);
        assert_eq!(count_banned(&conn).unwrap(), 0);

        ban(&conn, "u2", Some("spam")).unwrap();
        assert_eq!(count_banned(&conn).unwrap(), 1);

        let listed = list(&conn).unwrap();
        assert_eq!(listed.len(), 2);
    }
}
