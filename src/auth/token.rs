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

//! Compact HS256 JSON Web Tokens.

use std::fmt::Display;
use std::fmt::Formatter;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Duration;
use chrono::Utc;
use fibocards_core::error::ErrorReport;
use fibocards_core::error::Fallible;
use hmac::Hmac;
use hmac::Mac;
use serde::Deserialize;
use serde::Serialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    /// Issued at, in Unix seconds.
    pub iat: i64,
    /// Expiry, in Unix seconds.
    pub exp: i64,
}

#[derive(Debug, PartialEq)]
pub enum TokenError {
    Malformed,
    BadSignature,
    Expired,
}

impl Display for TokenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Malformed => write!(f, "malformed token"),
            TokenError::BadSignature => write!(f, "bad token signature"),
            TokenError::Expired => write!(f, "token expired"),
        }
    }
}

/// Issues and checks signed, time-limited tokens bound to a username.
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, username: &str) -> Fallible<String> {
        self.issue_at(username, Utc::now().timestamp())
    }

    fn issue_at(&self, username: &str, now: i64) -> Fallible<String> {
        let claims = Claims {
            username: username.to_string(),
            iat: now,
            exp: now + self.ttl.num_seconds(),
        };
        let header = URL_SAFE_NO_PAD.encode(HEADER);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let signing_input = format!("{header}.{payload}");
        let mut mac = self
            .mac()
            .map_err(|_| ErrorReport::new("Invalid token secret"))?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{signing_input}.{signature}"))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    fn verify_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header_json = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|_| TokenError::Malformed)?;
        let header_json: serde_json::Value =
            serde_json::from_slice(&header_json).map_err(|_| TokenError::Malformed)?;
        if header_json.get("alg").and_then(|alg| alg.as_str()) != Some("HS256") {
            return Err(TokenError::Malformed);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac().map_err(|_| TokenError::Malformed)?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;
        if claims.exp <= now {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn mac(&self) -> Result<HmacSha256, hmac::digest::InvalidLength> {
        HmacSha256::new_from_slice(&self.secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn signer() -> TokenSigner {
        TokenSigner::new("test-secret", Duration::hours(48))
    }

    #[test]
    fn test_issue_and_verify() -> Fallible<()> {
        let token = signer().issue_at("alice", NOW)?;
        let claims = signer().verify_at(&token, NOW + 60).unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.iat, NOW);
        assert_eq!(claims.exp, NOW + 48 * 3600);
        Ok(())
    }

    #[test]
    fn test_verify_against_clock() -> Fallible<()> {
        let token = signer().issue("alice")?;
        assert_eq!(signer().verify(&token).unwrap().username, "alice");
        Ok(())
    }

    #[test]
    fn test_expired() -> Fallible<()> {
        let token = signer().issue_at("alice", NOW)?;
        assert_eq!(
            signer().verify_at(&token, NOW + 48 * 3600),
            Err(TokenError::Expired)
        );
        Ok(())
    }

    #[test]
    fn test_wrong_secret() -> Fallible<()> {
        let token = signer().issue_at("alice", NOW)?;
        let other = TokenSigner::new("other-secret", Duration::hours(48));
        assert_eq!(other.verify_at(&token, NOW), Err(TokenError::BadSignature));
        Ok(())
    }

    #[test]
    fn test_tampered_payload() -> Fallible<()> {
        let token = signer().issue_at("alice", NOW)?;
        let parts: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&Claims {
                username: "mallory".to_string(),
                iat: NOW,
                exp: NOW + 1_000_000,
            })
            .unwrap(),
        );
        let token = format!("{}.{}.{}", parts[0], forged, parts[2]);
        assert_eq!(signer().verify_at(&token, NOW), Err(TokenError::BadSignature));
        Ok(())
    }

    #[test]
    fn test_malformed() {
        for token in ["", "abc", "a.b", "a.b.c.d", "!!.!!.!!"] {
            assert_eq!(signer().verify_at(token, NOW), Err(TokenError::Malformed));
        }
    }

    #[test]
    fn test_rejects_other_algorithms() -> Fallible<()> {
        let token = signer().issue_at("alice", NOW)?;
        let parts: Vec<&str> = token.split('.').collect();
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let token = format!("{}.{}.{}", header, parts[1], parts[2]);
        assert_eq!(signer().verify_at(&token, NOW), Err(TokenError::Malformed));
        Ok(())
    }
}
