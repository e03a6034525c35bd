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

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::token_from_headers;
use crate::cmd::serve::response::ApiError;
use crate::cmd::serve::state::ServerState;

/// The username of an authenticated caller. Rejects the request with 401
/// when the token is missing, invalid or expired.
pub struct AuthUser(pub String);

impl FromRequestParts<ServerState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = token_from_headers(&parts.headers) else {
            return Err(ApiError::Unauthorized("You need to be logged in first"));
        };
        match state.tokens.verify(&token) {
            Ok(claims) => Ok(AuthUser(claims.username)),
            Err(e) => {
                log::debug!("Rejected access token: {e}");
                Err(ApiError::Unauthorized("Invalid access token"))
            }
        }
    }
}

/// Like [`AuthUser`], but never rejects: a missing or bad token just means
/// nobody is logged in.
pub struct MaybeAuthUser(pub Option<String>);

impl FromRequestParts<ServerState> for MaybeAuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let username = token_from_headers(&parts.headers)
            .and_then(|token| state.tokens.verify(&token).ok())
            .map(|claims| claims.username);
        Ok(MaybeAuthUser(username))
    }
}
