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

pub mod password;
pub mod token;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::header::COOKIE;

/// Name of the cookie that carries the access token.
pub const COOKIE_NAME: &str = "accessToken";

/// Finds the access token in a request: the `accessToken` cookie first, then
/// an `Authorization: Bearer` header.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    cookie_token(headers).or_else(|| bearer_token(headers))
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == COOKIE_NAME && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token.to_string())
    } else {
        None
    }
}

/// A `Set-Cookie` value that stores `token` for `max_age` seconds.
pub fn session_cookie(token: &str, max_age: i64) -> String {
    format!("{COOKIE_NAME}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age}")
}

/// A `Set-Cookie` value that removes the access token.
pub fn clear_cookie() -> String {
    format!("{COOKIE_NAME}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_cookie() {
        let map = headers(&[("cookie", "theme=dark; accessToken=abc.def.ghi; lang=ja")]);
        assert_eq!(token_from_headers(&map), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_empty_cookie_is_ignored() {
        let map = headers(&[("cookie", "accessToken=")]);
        assert_eq!(token_from_headers(&map), None);
    }

    #[test]
    fn test_bearer() {
        let map = headers(&[("authorization", "Bearer abc.def.ghi")]);
        assert_eq!(token_from_headers(&map), Some("abc.def.ghi".to_string()));
        let map = headers(&[("authorization", "Basic dXNlcjpwYXNz")]);
        assert_eq!(token_from_headers(&map), None);
    }

    #[test]
    fn test_cookie_wins_over_header() {
        let map = headers(&[
            ("authorization", "Bearer from-header"),
            ("cookie", "accessToken=from-cookie"),
        ]);
        assert_eq!(token_from_headers(&map), Some("from-cookie".to_string()));
    }

    #[test]
    fn test_no_token() {
        assert_eq!(token_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_cookie_strings() {
        assert_eq!(
            session_cookie("t", 60),
            "accessToken=t; HttpOnly; Path=/; SameSite=Lax; Max-Age=60"
        );
        assert!(clear_cookie().starts_with("accessToken=;"));
    }
}
