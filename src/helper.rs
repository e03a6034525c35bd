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

use std::time::Duration;

use chrono::NaiveDateTime;
use fibocards_core::error::ErrorReport;
use fibocards_core::error::Fallible;
use fibocards_core::types::card::Card;
use fibocards_core::types::timestamp::Timestamp;
use portpicker::pick_unused_port;
use tempfile::TempDir;
use tempfile::tempdir;
use tokio::net::TcpStream;
use tokio::spawn;
use tokio::time::sleep;
use tokio::time::timeout;

use crate::cmd::serve::server::ServerConfig;
use crate::cmd::serve::server::start_server;

pub const TEST_HOST: &str = "127.0.0.1";
pub const TEST_SECRET: &str = "test-secret";
const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

pub fn timestamp() -> Timestamp {
    let ndt = NaiveDateTime::parse_from_str("2024-01-01T12:00:00.000", "%Y-%m-%dT%H:%M:%S%.3f")
        .unwrap();
    Timestamp::new(ndt)
}

pub fn card(japanese: &str, kana: &str, romaji: &str, english: &str, level: i32) -> Card {
    Card {
        japanese: japanese.to_string(),
        kana: kana.to_string(),
        romaji: romaji.to_string(),
        english: english.to_string(),
        level,
        created_at: timestamp(),
    }
}

pub async fn wait_for_server(host: &str, port: u16) -> Fallible<()> {
    loop {
        if let Ok(stream) = TcpStream::connect(format!("{host}:{port}")).await {
            drop(stream);
            break;
        }
        sleep(Duration::from_millis(1)).await;
    }
    Ok(())
}

/// A running server on a fresh database. The server lives as long as the
/// test's runtime; the database lives as long as the returned directory.
pub struct TestServer {
    pub port: u16,
    _dir: TempDir,
}

impl TestServer {
    pub async fn start() -> Fallible<Self> {
        let dir = tempdir()?;
        let database = dir.path().join("test.db").display().to_string();
        Self::start_with(database, dir).await
    }

    /// Starts a server on a free port over `database`. Fails if the server
    /// exits or does not accept connections within [`STARTUP_TIMEOUT`].
    pub async fn start_with(database: String, dir: TempDir) -> Fallible<Self> {
        let port = pick_unused_port().unwrap();
        let config = ServerConfig {
            host: TEST_HOST.to_string(),
            port,
            database,
            jwt_secret: TEST_SECRET.to_string(),
            token_ttl: chrono::Duration::hours(48),
        };
        let mut server = spawn(async move { start_server(config).await });
        tokio::select! {
            result = &mut server => {
                return Err(match result {
                    Ok(Err(e)) => e,
                    Ok(Ok(())) => ErrorReport::new("Server exited before accepting connections."),
                    Err(e) => ErrorReport::new(format!("Server task failed: {e}")),
                });
            }
            ready = timeout(STARTUP_TIMEOUT, wait_for_server(TEST_HOST, port)) => {
                ready.map_err(|_| ErrorReport::new("Server did not start in time."))??;
            }
        }
        Ok(Self { port, _dir: dir })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{TEST_HOST}:{}{path}", self.port)
    }
}

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
