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
use axum::extract::Query;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::Response;
use fibocards_core::types::card::Card;
use fibocards_core::types::timestamp::Timestamp;
use fibocards_core::validate::CardForm;
use fibocards_core::validate::FieldErrors;
use fibocards_core::validate::validate_card;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;

use crate::cmd::serve::extract::AuthUser;
use crate::cmd::serve::response::ApiError;
use crate::cmd::serve::response::ApiResult;
use crate::cmd::serve::response::envelope;
use crate::cmd::serve::state::ServerState;
use crate::db::Replace;

pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const MAX_SEARCH_LIMIT: usize = 100;

const FIELD_ERRORS: &str = "Card fields have errors.";

/// A card as returned to clients, with its progressive display.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    #[serde(rename = "type")]
    kind: &'static str,
    japanese: String,
    english: String,
    kana: String,
    romaji: String,
    progressive: String,
    level: i32,
    created_at: Timestamp,
}

impl From<Card> for CardView {
    fn from(card: Card) -> Self {
        let progressive = card.progressive();
        Self {
            kind: "jp_card",
            japanese: card.japanese,
            english: card.english,
            kana: card.kana,
            romaji: card.romaji,
            progressive,
            level: card.level,
            created_at: card.created_at,
        }
    }
}

#[derive(Deserialize)]
pub struct SearchQuery {
    prefix: Option<String>,
    limit: Option<usize>,
}

pub async fn search_handler(
    State(state): State<ServerState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let prefix = query.prefix.unwrap_or_default();
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT);
    let cards = state.db()?.find_cards_by_prefix(prefix.trim(), limit)?;
    let cards: Vec<CardView> = cards.into_iter().map(CardView::from).collect();
    Ok(envelope(
        StatusCode::OK,
        &format!("Found {} card(s).", cards.len()),
        json!({ "cards": cards }),
    ))
}

pub async fn get_handler(
    State(state): State<ServerState>,
    Path(japanese): Path<String>,
) -> ApiResult<Response> {
    let card = state.db()?.find_card(&japanese)?;
    match card {
        Some(card) => Ok(envelope(
            StatusCode::OK,
            "Card found.",
            json!({ "card": CardView::from(card) }),
        )),
        None => Err(card_not_found(&japanese)),
    }
}

pub async fn create_handler(
    State(state): State<ServerState>,
    AuthUser(username): AuthUser,
    payload: Result<Json<CardForm>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(form) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let card = validate_card(form, Timestamp::now()).map_err(field_errors)?;
    if !state.db()?.insert_card(&card)? {
        return Err(card_exists(&card.japanese));
    }
    log::info!("{username} created card '{}'", card.japanese);
    Ok(envelope(
        StatusCode::CREATED,
        "Card has been added successfully.",
        json!({ "card": CardView::from(card) }),
    ))
}

/// Overwrites every field of a card. The key itself may change, as long as
/// it does not collide with another card.
pub async fn replace_handler(
    State(state): State<ServerState>,
    AuthUser(username): AuthUser,
    Path(japanese): Path<String>,
    payload: Result<Json<CardForm>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(form) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let card = validate_card(form, Timestamp::now()).map_err(field_errors)?;
    let outcome = state.db()?.replace_card(&japanese, &card)?;
    match outcome {
        Replace::Replaced => {
            log::info!("{username} replaced card '{japanese}' with '{}'", card.japanese);
            Ok(envelope(
                StatusCode::OK,
                "Card has been updated successfully.",
                json!({ "card": CardView::from(card) }),
            ))
        }
        Replace::NotFound => Err(card_not_found(&japanese)),
        Replace::Conflict => Err(card_exists(&card.japanese)),
    }
}

fn field_errors(errors: FieldErrors) -> ApiError {
    ApiError::Validation {
        message: FIELD_ERRORS,
        errors,
    }
}

fn card_exists(japanese: &str) -> ApiError {
    field_errors(FieldErrors::single(
        "japanese",
        format!("Card '{japanese}' already exists"),
        japanese,
    ))
}

fn card_not_found(japanese: &str) -> ApiError {
    ApiError::NotFound(format!("Card '{japanese}' does not exist!"))
}
