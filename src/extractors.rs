use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use rusqlite::params;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Represents the currently authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub is_admin: bool,
    pub banned: bool,
    pub ban_reason: Option<String>,
}

impl CurrentUser {
    /// Display name shown on entries and replies: the profile name, the
    /// email local part when the name is blank, "Anonim" as a last resort.
    pub fn author_name(&self) -> String {
        let name = self.display_name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
        let local = self.email.split('@').next().unwrap_or("").trim();
        if !local.is_empty() {
            return local.to_string();
        }
        "Anonim".to_string()
    }

    /// Banned accounts keep read access but may not write.
    pub fn ensure_not_banned(&self) -> AppResult<()> {
        if self.banned {
            return Err(crate::error::AuthError::Banned(self.ban_reason.clone()).into());
        }
        Ok(())
    }

    pub fn can_edit(&self, author_id: &str) -> bool {
        self.id == author_id || self.is_admin
    }
}

/// Extractor that requires authentication.
/// Returns 401 if no valid session found.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_session_token(parts, &state.config.auth.cookie_name)
            .ok_or(AppError::Unauthorized)?;

        let conn = state.db.get()?;
        let user = conn
            .query_row(
                "SELECT u.id, u.display_name, u.email, u.banned, u.ban_reason FROM sessions s \
                 JOIN users u ON u.id = s.user_id \
                 WHERE s.token = ?1 AND s.expires_at > datetime('now')",
                params![token],
                |row| {
                    Ok(CurrentUser {
                        id: row.get(0)?,
                        display_name: row.get(1)?,
                        email: row.get(2)?,
                        is_admin: false,
                        banned: row.get(3)?,
                        ban_reason: row.get(4)?,
                    })
                },
            )
            .map_err(|_| AppError::Unauthorized)?;

        Ok(CurrentUser {
            is_admin: state.config.is_admin_email(&user.email),
            ..user
        })
    }
}

/// Extractor that additionally requires moderation rights.
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(AppError::Forbidden("Bu sayfaya erişim izniniz yok.".into()));
        }
        Ok(AdminUser(user))
    }
}

fn extract_session_token<'a>(parts: &'a Parts, cookie_name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == cookie_name {
                Some(val)
            } else {
                None
            }
        })
}
