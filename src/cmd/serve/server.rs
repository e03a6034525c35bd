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

use axum::Router;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use chrono::Duration;
use fibocards_core::error::Fallible;
use tokio::net::TcpListener;
use tokio::signal;

use crate::auth::token::TokenSigner;
use crate::cmd::serve::cards;
use crate::cmd::serve::response::reply;
use crate::cmd::serve::state::ServerState;
use crate::cmd::serve::users;
use crate::db::Database;

pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path to the SQLite database. Created if missing.
    pub database: String,
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

pub async fn start_server(config: ServerConfig) -> Fallible<()> {
    let db = Database::open(&config.database)?;
    let tokens = TokenSigner::new(&config.jwt_secret, config.token_ttl);
    let app = router(ServerState::new(db, tokens));
    let bind = format!("{}:{}", config.host, config.port);

    // Start the server with graceful shutdown on Ctrl+C.
    log::info!("Starting server on {bind} using {}", config.database);
    let listener = TcpListener::bind(bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn router(state: ServerState) -> Router {
    let app = Router::new();
    let app = app.route("/", get(index_handler));
    let app = app.route("/user/create", post(users::create_handler));
    let app = app.route(
        "/user/login",
        get(users::login_status_handler).post(users::login_handler),
    );
    let app = app.route("/user/logout", post(users::logout_handler));
    let app = app.route("/user/{username}", get(users::get_handler));
    let app = app.route("/card", get(cards::search_handler));
    let app = app.route("/card/create", post(cards::create_handler));
    let app = app.route(
        "/card/{japanese}",
        get(cards::get_handler).put(cards::replace_handler),
    );
    let app = app.fallback(not_found_handler);
    app.with_state(state)
}

async fn index_handler() -> Response {
    reply(StatusCode::OK, "All is well.")
}

async fn not_found_handler() -> Response {
    reply(StatusCode::NOT_FOUND, "Not Found")
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => log::debug!("Received Ctrl+C, shutting down gracefully"),
        Err(e) => {
            log::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    }
}
