// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::Json;
use axum::extract::Path;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::response::Response;
use fibocards_core::error::ErrorReport;
use fibocards_core::error::Fallible;
use fibocards_core::types::timestamp::Timestamp;
use fibocards_core::types::user::User;
use fibocards_core::validate::FieldErrors;
use fibocards_core::validate::UserForm;
use fibocards_core::validate::normalize_username;
use fibocards_core::validate::validate_user;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;
use tokio::task::spawn_blocking;

use crate::auth::clear_cookie;
use crate::auth::password::DUMMY_HASH;
use crate::auth::password::hash_password;
use crate::auth::password::verify_password;
use crate::auth::session_cookie;
use crate::cmd::serve::extract::AuthUser;
use crate::cmd::serve::extract::MaybeAuthUser;
use crate::cmd::serve::response::ApiError;
use crate::cmd::serve::response::ApiResult;
use crate::cmd::serve::response::envelope;
use crate::cmd::serve::state::ServerState;

const FIELD_ERRORS: &str = "Registration fields have errors.";
const INVALID_CREDENTIALS: &str = "Invalid username and/or password";

#[derive(Deserialize)]
pub struct LoginForm {
    username: Option<String>,
    password: Option<String>,
}

pub async fn create_handler(
    State(state): State<ServerState>,
    payload: Result<Json<UserForm>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(form) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let new_user = validate_user(form).map_err(|errors| ApiError::Validation {
        message: FIELD_ERRORS,
        errors,
    })?;
    if state.db()?.find_user(&new_user.username)?.is_some() {
        return Err(username_taken(&new_user.username));
    }

    let password = new_user.password;
    let password_hash = blocking(move || hash_password(&password)).await?;
    let user = User {
        username: new_user.username,
        password_hash,
        created_at: Timestamp::now(),
    };
    // The lookup above is only for a friendly error; the insert is what
    // enforces uniqueness.
    if !state.db()?.insert_user(&user)? {
        return Err(username_taken(&user.username));
    }
    log::info!("Registered user '{}'", user.username);
    Ok(envelope(
        StatusCode::CREATED,
        "User has registered successfully.",
        json!({}),
    ))
}

pub async fn get_handler(
    State(state): State<ServerState>,
    Path(username): Path<String>,
) -> ApiResult<Response> {
    let username = normalize_username(&username);
    let user = state.db()?.find_user(&username)?;
    match user {
        Some(user) => Ok(envelope(
            StatusCode::OK,
            "User found.",
            json!({
                "user": {
                    "username": user.username,
                    "createdAt": user.created_at,
                }
            }),
        )),
        None => Err(ApiError::NotFound(format!("User '{username}' not found."))),
    }
}

pub async fn login_status_handler(MaybeAuthUser(username): MaybeAuthUser) -> Response {
    match username {
        Some(username) => already_logged_in(&username),
        None => envelope(
            StatusCode::OK,
            "User is not logged in.",
            json!({ "user": Value::Null }),
        ),
    }
}

pub async fn login_handler(
    State(state): State<ServerState>,
    MaybeAuthUser(current): MaybeAuthUser,
    payload: Result<Json<LoginForm>, JsonRejection>,
) -> ApiResult<Response> {
    if let Some(username) = current {
        return Ok(already_logged_in(&username));
    }
    let Json(form) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let username = normalize_username(form.username.as_deref().unwrap_or_default());
    let password = form.password.unwrap_or_default();

    let user = state.db()?.find_user(&username)?;
    let Some(user) = user else {
        log::debug!("Login for unknown user '{username}'");
        blocking(move || Ok(verify_password(&password, DUMMY_HASH))).await?;
        return Err(ApiError::Forbidden(INVALID_CREDENTIALS));
    };
    let hash = user.password_hash;
    let valid = blocking(move || Ok(verify_password(&password, &hash))).await?;
    if !valid {
        log::debug!("Wrong password for '{username}'");
        return Err(ApiError::Forbidden(INVALID_CREDENTIALS));
    }

    let token = state.tokens.issue(&user.username)?;
    let cookie = session_cookie(&token, state.tokens.ttl().num_seconds());
    log::info!("User '{}' logged in", user.username);
    let mut response = envelope(
        StatusCode::OK,
        "User logged in successfully!",
        json!({
            "user": { "username": user.username },
            "token": token,
        }),
    );
    set_cookie(&mut response, &cookie)?;
    Ok(response)
}

pub async fn logout_handler(AuthUser(username): AuthUser) -> ApiResult<Response> {
    log::info!("User '{username}' logged out");
    let mut response = envelope(
        StatusCode::OK,
        "User logged out successfully",
        json!({ "user": Value::Null }),
    );
    set_cookie(&mut response, &clear_cookie())?;
    Ok(response)
}

fn already_logged_in(username: &str) -> Response {
    envelope(
        StatusCode::OK,
        "User is already logged in!",
        json!({ "user": { "username": username } }),
    )
}

fn username_taken(username: &str) -> ApiError {
    ApiError::Validation {
        message: FIELD_ERRORS,
        errors: FieldErrors::single("username", "Username already taken", username),
    }
}

fn set_cookie(response: &mut Response, cookie: &str) -> Fallible<()> {
    let value = HeaderValue::from_str(cookie)
        .map_err(|e| ErrorReport::new(format!("Invalid cookie header: {e}")))?;
    response.headers_mut().insert(SET_COOKIE, value);
    Ok(())
}

/// Runs password hashing off the async workers.
async fn blocking<T, F>(f: F) -> Fallible<T>
where
    F: FnOnce() -> Fallible<T> + Send + 'static,
    T: Send + 'static,
{
    spawn_blocking(f)
        .await
        .map_err(|e| ErrorReport::new(format!("Blocking task failed: {e}")))?
}
