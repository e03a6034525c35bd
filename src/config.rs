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

use std::path::Path;

use chrono::Duration;
use fibocards_core::error::ErrorReport;
use fibocards_core::error::Fallible;
use serde::Deserialize;

use crate::cmd::serve::server::ServerConfig;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE: &str = "fibocards.db";
pub const DEFAULT_JWT_SECRET: &str = "jwt-access-secret";
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 48;

/// Server options. Used both for the `serve` flags and for the optional
/// TOML config file; flags win over the file, and the file wins over the
/// defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ServeOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub jwt_secret: Option<String>,
    pub token_ttl_hours: Option<i64>,
}

impl ServeOptions {
    pub fn load(path: &Path) -> Fallible<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> Fallible<Self> {
        toml::from_str(content).map_err(|e| ErrorReport::new(format!("Invalid config file: {e}")))
    }

    /// Fills every unset option from `fallback`.
    pub fn or(self, fallback: ServeOptions) -> Self {
        Self {
            host: self.host.or(fallback.host),
            port: self.port.or(fallback.port),
            database: self.database.or(fallback.database),
            jwt_secret: self.jwt_secret.or(fallback.jwt_secret),
            token_ttl_hours: self.token_ttl_hours.or(fallback.token_ttl_hours),
        }
    }

    pub fn into_server_config(self) -> Fallible<ServerConfig> {
        let token_ttl_hours = self.token_ttl_hours.unwrap_or(DEFAULT_TOKEN_TTL_HOURS);
        if token_ttl_hours <= 0 {
            return Err(ErrorReport::new("token-ttl-hours must be positive."));
        }
        let jwt_secret = match self.jwt_secret {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                log::warn!("No JWT secret configured, using the built-in default.");
                DEFAULT_JWT_SECRET.to_string()
            }
        };
        Ok(ServerConfig {
            host: self.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            database: self.database.unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            jwt_secret,
            token_ttl: Duration::hours(token_ttl_hours),
        })
    }
}
