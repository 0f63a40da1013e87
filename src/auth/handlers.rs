use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::session;
use crate::db::models::UserProfile;
use crate::db::users;
use crate::error::{AppError, AppResult, AuthError};
use crate::events::FeedEvent;
use crate::extractors::CurrentUser;
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// -- Cookie helpers --

fn session_cookie(name: &str, token: &str, max_age_hours: u64) -> String {
    let max_age_secs = max_age_hours * 3600;
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        name, token, max_age_secs
    )
}

fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0", name)
}

fn get_cookie_value<'a>(parts: &'a axum::http::request::Parts, name: &str) -> Option<&'a str> {
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
            if key == name {
                Some(val)
            } else {
                None
            }
        })
}

// -- Validation --

fn validate_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !email.contains(' ')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.len() >= 3
}

fn account_json(profile: &UserProfile, is_admin: bool) -> serde_json::Value {
    json!({
        "id": profile.id,
        "displayName": profile.display_name,
        "email": profile.email,
        "isAdmin": is_admin,
    })
}

// -- Handlers --

/// POST /api/auth/register — create an account and log it in
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Response> {
    let username = req.username.trim().to_string();
    let email = req.email.trim().to_lowercase();

    if username.is_empty() {
        return Err(AppError::BadRequest("Kullanıcı adı boş olamaz".into()));
    }
    if !validate_email(&email) {
        return Err(AuthError::InvalidEmail.into());
    }
    if req.password.chars().count() < 6 {
        return Err(AuthError::WeakPassword.into());
    }

    let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

    let id = uuid::Uuid::now_v7().to_string();
    let profile = {
        let conn = state.db.get()?;
        users::create(&conn, &id, &username, &email, &password_hash)?
    };

    let token = session::create_session(&state.db, &profile.id, state.config.auth.session_hours)?;
    let is_admin = state.config.is_admin_email(&profile.email);
    let body = account_json(&profile, is_admin);
    state.publish(FeedEvent::UserCreated(profile));

    Ok((
        StatusCode::CREATED,
        [(
            header::SET_COOKIE,
            session_cookie(
                &state.config.auth.cookie_name,
                &token,
                state.config.auth.session_hours,
            ),
        )],
        Json(body),
    )
        .into_response())
}

/// POST /api/auth/login — verify credentials and start a session
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Response> {
    let email = req.email.trim().to_lowercase();

    let creds = {
        let conn = state.db.get()?;
        users::credentials_by_email(&conn, &email)?
    }
    .ok_or(AuthError::UserNotFound)?;

    let verified = bcrypt::verify(&req.password, &creds.password_hash)
        .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))?;
    if !verified {
        return Err(AuthError::WrongPassword.into());
    }
    // Ban state is only disclosed after the password checks out.
    if creds.banned {
        return Err(AuthError::Banned(creds.ban_reason).into());
    }

    let profile = {
        let conn = state.db.get()?;
        users::touch_last_login(&conn, &creds.id)?;
        users::get(&conn, &creds.id)?
    };

    let token = session::create_session(&state.db, &profile.id, state.config.auth.session_hours)?;
    let is_admin = state.config.is_admin_email(&profile.email);
    let body = account_json(&profile, is_admin);
    state.publish(FeedEvent::UserUpdated(profile));

    Ok((
        StatusCode::OK,
        [(
            header::SET_COOKIE,
            session_cookie(
                &state.config.auth.cookie_name,
                &token,
                state.config.auth.session_hours,
            ),
        )],
        Json(body),
    )
        .into_response())
}

/// POST /api/auth/logout — delete the session and clear the cookie
pub async fn logout(
    State(state): State<AppState>,
    request: axum::http::Request<axum::body::Body>,
) -> AppResult<Response> {
    let (parts, _body) = request.into_parts();

    if let Some(token) = get_cookie_value(&parts, &state.config.auth.cookie_name) {
        let _ = session::delete_session(&state.db, token);
    }

    Ok((
        StatusCode::OK,
        [(
            header::SET_COOKIE,
            clear_session_cookie(&state.config.auth.cookie_name),
        )],
        Json(json!({ "status": "ok" })),
    )
        .into_response())
}

/// GET /api/auth/me — account behind the current session
pub async fn me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<serde_json::Value>> {
    let profile = {
        let conn = state.db.get()?;
        users::get(&conn, &user.id)?
    };
    Ok(Json(account_json(&profile, user.is_admin)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_accepts_normal_addresses() {
        assert!(validate_email("ayse@example.com"));
        assert!(validate_email("a.b+c@mail.example.org"));
    }

    #[test]
    fn email_validation_rejects_malformed_addresses() {
        assert!(!validate_email("ayse"));
        assert!(!validate_email("ayse@"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("ayse@example"));
        assert!(!validate_email("ayse@.com"));
        assert!(!validate_email("ayse@example.com."));
        assert!(!validate_email("ayse @example.com"));
    }

    #[test]
    fn session_cookie_is_http_only_and_scoped() {
        let cookie = session_cookie("dertlio_session", "tok123", 2);
        assert_eq!(
            cookie,
            "dertlio_session=tok123; HttpOnly; SameSite=Strict; Path=/; Max-Age=7200"
        );
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie("dertlio_session");
        assert!(cookie.starts_with("dertlio_session=;"));
        assert!(cookie.ends_with("Max-Age=0"));
    }

    #[test]
    fn account_json_uses_camel_case_keys() {
        let profile = UserProfile {
            id: "u1".into(),
            display_name: "Ayşe".into(),
            email: "ayse@example.com".into(),
            created_at: "2024-03-01 10:00:00".into(),
            last_login_at: None,
            banned: false,
            ban_reason: None,
            banned_at: None,
        };
        let body = account_json(&profile, true);
        assert_eq!(body["displayName"], "Ayşe");
        assert_eq!(body["isAdmin"], true);
    }
}
