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

//! Request validation. Everything here is pure: checks that need the
//! database, like uniqueness, happen in the server.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Number;
use serde_json::Value;

use crate::levels::LOCKED;
use crate::levels::MAX_LEVEL;
use crate::reveal::AlignmentError;
use crate::reveal::check_alignment;
use crate::types::card::Card;
use crate::types::timestamp::Timestamp;

/// Maximum length, in characters, of a card's text fields.
pub const MAX_TEXT_LENGTH: usize = 300;

pub const MAX_USERNAME_LENGTH: usize = 100;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 30;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldError {
    pub msg: String,
    pub value: Value,
}

/// Validation failures keyed by field name. Only the first failure for each
/// field is kept.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, msg: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut errors = Self::new();
        errors.add(field, msg, value);
        errors
    }

    pub fn add(&mut self, field: &str, msg: impl Into<String>, value: impl Into<Value>) {
        self.0.entry(field.to_string()).or_insert(FieldError {
            msg: msg.into(),
            value: value.into(),
        });
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A level as submitted: clients send either a JSON number or a string.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LevelInput {
    Number(Number),
    Text(String),
}

/// The body of a card create or replace request.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CardForm {
    pub japanese: Option<String>,
    pub kana: Option<String>,
    pub english: Option<String>,
    pub romaji: Option<String>,
    pub level: Option<LevelInput>,
    /// Creation date. Defaults to the time of the request.
    pub date: Option<String>,
}

/// Validates a card form into a card. `now` is the creation timestamp used
/// when the form carries no date.
pub fn validate_card(form: CardForm, now: Timestamp) -> Result<Card, FieldErrors> {
    let mut errors = FieldErrors::new();
    let japanese = required_text(&mut errors, "japanese", "Japanese", form.japanese);
    let kana = required_text(&mut errors, "kana", "Kana", form.kana);
    let english = required_text(&mut errors, "english", "English", form.english);
    let romaji = required_text(&mut errors, "romaji", "Romaji", form.romaji);
    let level = level(&mut errors, form.level);
    let created_at = date(&mut errors, form.date, now);

    if let (Some(kana), Some(romaji)) = (&kana, &romaji) {
        match check_alignment(kana, romaji) {
            Ok(()) => {}
            Err(e @ AlignmentError::UnknownUnit(_)) => {
                errors.add("kana", e.to_string(), kana.as_str());
            }
            Err(e) => errors.add("romaji", e.to_string(), romaji.as_str()),
        }
    }

    match (japanese, kana, english, romaji, level, created_at) {
        (Some(japanese), Some(kana), Some(english), Some(romaji), Some(level), Some(created_at))
            if errors.is_empty() =>
        {
            Ok(Card {
                japanese,
                kana,
                romaji,
                english,
                level,
                created_at,
            })
        }
        _ => Err(errors),
    }
}

fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    label: &str,
    value: Option<String>,
) -> Option<String> {
    let value = value.unwrap_or_default().trim().to_string();
    if value.is_empty() {
        errors.add(field, format!("{label} is required"), value);
        return None;
    }
    if value.chars().count() > MAX_TEXT_LENGTH {
        errors.add(
            field,
            format!("{label} cannot have more than {MAX_TEXT_LENGTH} characters"),
            value,
        );
        return None;
    }
    Some(value)
}

fn level(errors: &mut FieldErrors, input: Option<LevelInput>) -> Option<i32> {
    let (parsed, raw): (Option<f64>, Value) = match input {
        None => return Some(LOCKED),
        Some(LevelInput::Text(s)) if s.trim().is_empty() => return Some(LOCKED),
        Some(LevelInput::Text(s)) => (s.trim().parse::<f64>().ok(), Value::String(s)),
        Some(LevelInput::Number(n)) => (n.as_f64(), Value::Number(n)),
    };
    let Some(parsed) = parsed.filter(|n| n.is_finite()) else {
        errors.add("level", "Level is not a number", raw);
        return None;
    };
    if parsed.fract() != 0.0 || parsed < LOCKED as f64 || parsed > MAX_LEVEL as f64 {
        errors.add(
            "level",
            format!("Level must be a whole number between {LOCKED} and {MAX_LEVEL}"),
            raw,
        );
        return None;
    }
    Some(parsed as i32)
}

fn date(errors: &mut FieldErrors, input: Option<String>, now: Timestamp) -> Option<Timestamp> {
    match input {
        None => Some(now),
        Some(s) if s.trim().is_empty() => Some(now),
        Some(s) => match Timestamp::parse_lenient(&s) {
            Ok(ts) => Some(ts),
            Err(_) => {
                errors.add("date", "Invalid date", s);
                None
            }
        },
    }
}

/// The body of a registration request.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UserForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// A registration that passed validation. The password is still plain text.
#[derive(Clone, Debug, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

pub fn validate_user(form: UserForm) -> Result<NewUser, FieldErrors> {
    let mut errors = FieldErrors::new();

    let username = normalize_username(form.username.as_deref().unwrap_or_default());
    if username.is_empty() {
        errors.add("username", "Username is required", username.as_str());
    } else if username.chars().count() > MAX_USERNAME_LENGTH {
        errors.add(
            "username",
            format!("Username must be {MAX_USERNAME_LENGTH} characters or below"),
            username.as_str(),
        );
    }

    // Passwords are not echoed back in errors.
    let password = form.password.unwrap_or_default();
    let length = password.chars().count();
    if password.is_empty() {
        errors.add("password", "Password is required", "");
    } else if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        errors.add(
            "password",
            format!(
                "Password must be {MIN_PASSWORD_LENGTH} to {MAX_PASSWORD_LENGTH} characters long"
            ),
            "",
        );
    }

    if errors.is_empty() {
        Ok(NewUser { username, password })
    } else {
        Err(errors)
    }
}

/// Usernames are compared trimmed and lower-cased.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use serde_json::json;

    use super::*;

    fn now() -> Timestamp {
        let ndt =
            NaiveDateTime::parse_from_str("2024-01-01T12:00:00.000", "%Y-%m-%dT%H:%M:%S%.3f")
                .unwrap();
        Timestamp::new(ndt)
    }

    fn form() -> CardForm {
        CardForm {
            japanese: Some(" 猫 ".to_string()),
            kana: Some("ねこ".to_string()),
            english: Some("cat".to_string()),
            romaji: Some("neko".to_string()),
            level: None,
            date: None,
        }
    }

    fn parse(body: Value) -> CardForm {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_valid_card() {
        let card = validate_card(form(), now()).unwrap();
        assert_eq!(card.japanese, "猫");
        assert_eq!(card.level, LOCKED);
        assert_eq!(card.created_at, now());
    }

    #[test]
    fn test_missing_fields() {
        let errors = validate_card(CardForm::default(), now()).unwrap_err();
        assert_eq!(errors.get("japanese").unwrap().msg, "Japanese is required");
        assert_eq!(errors.get("kana").unwrap().msg, "Kana is required");
        assert_eq!(errors.get("english").unwrap().msg, "English is required");
        assert_eq!(errors.get("romaji").unwrap().msg, "Romaji is required");
        assert!(!errors.contains("level"));
        assert!(!errors.contains("date"));
    }

    #[test]
    fn test_whitespace_only_is_missing() {
        let mut form = form();
        form.english = Some("   ".to_string());
        let errors = validate_card(form, now()).unwrap_err();
        assert_eq!(errors.get("english").unwrap().msg, "English is required");
    }

    #[test]
    fn test_too_long() {
        let mut form = form();
        form.english = Some("a".repeat(MAX_TEXT_LENGTH + 1));
        let errors = validate_card(form, now()).unwrap_err();
        assert_eq!(
            errors.get("english").unwrap().msg,
            "English cannot have more than 300 characters"
        );

        let mut form = self::form();
        form.english = Some("猫".repeat(MAX_TEXT_LENGTH));
        assert!(validate_card(form, now()).is_ok());
    }

    #[test]
    fn test_level_coercion() {
        let body = json!({"japanese": "猫", "kana": "ねこ", "english": "cat", "romaji": "neko"});
        for (level, expected) in [
            (json!(3), 3),
            (json!("3"), 3),
            (json!(" 7 "), 7),
            (json!(""), LOCKED),
            (json!(-1), LOCKED),
            (json!(2.0), 2),
        ] {
            let mut body = body.clone();
            body["level"] = level;
            let card = validate_card(parse(body), now()).unwrap();
            assert_eq!(card.level, expected);
        }
    }

    #[test]
    fn test_level_not_a_number() {
        let body = json!({"japanese": "猫", "kana": "ねこ", "english": "cat", "romaji": "neko", "level": "three"});
        let errors = validate_card(parse(body), now()).unwrap_err();
        let error = errors.get("level").unwrap();
        assert_eq!(error.msg, "Level is not a number");
        assert_eq!(error.value, json!("three"));
    }

    #[test]
    fn test_level_out_of_range() {
        for level in [json!(-2), json!(MAX_LEVEL + 1), json!(1.5)] {
            let body = json!({"japanese": "猫", "kana": "ねこ", "english": "cat", "romaji": "neko", "level": level});
            let errors = validate_card(parse(body), now()).unwrap_err();
            assert!(errors.contains("level"));
        }
    }

    #[test]
    fn test_level_of_wrong_json_type_is_rejected() {
        let body = json!({"japanese": "猫", "level": true});
        assert!(serde_json::from_value::<CardForm>(body).is_err());
    }

    #[test]
    fn test_date() {
        let mut form = form();
        form.date = Some("2020-05-06".to_string());
        let card = validate_card(form, now()).unwrap();
        assert_eq!(card.created_at.to_string(), "2020-05-06T00:00:00.000");

        let mut form = self::form();
        form.date = Some("not a date".to_string());
        let errors = validate_card(form, now()).unwrap_err();
        assert_eq!(errors.get("date").unwrap().msg, "Invalid date");
    }

    #[test]
    fn test_misaligned_romaji() {
        let mut form = form();
        form.romaji = Some("neka".to_string());
        let errors = validate_card(form, now()).unwrap_err();
        assert!(errors.get("romaji").unwrap().msg.starts_with("Romaji does not match kana"));
    }

    #[test]
    fn test_romaji_must_reproduce_kana() {
        for (kana, romaji) in [("トウキョウ", "Toukyou"), ("ねこ ねこ", "nekoneko")] {
            let mut form = form();
            form.kana = Some(kana.to_string());
            form.romaji = Some(romaji.to_string());
            let errors = validate_card(form, now()).unwrap_err();
            assert_eq!(errors.get("romaji").unwrap().value, json!(romaji));
            assert!(!errors.contains("kana"));
        }
    }

    #[test]
    fn test_unknown_kana() {
        let mut form = form();
        form.kana = Some("きって".to_string());
        form.romaji = Some("kitte".to_string());
        let errors = validate_card(form, now()).unwrap_err();
        assert!(errors.contains("kana"));
        assert!(!errors.contains("romaji"));
    }

    #[test]
    fn test_errors_serialize_as_map() {
        let errors = FieldErrors::single("japanese", "Card '猫' already exists", "猫");
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({"japanese": {"msg": "Card '猫' already exists", "value": "猫"}})
        );
    }

    #[test]
    fn test_first_error_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.add("kana", "first", "");
        errors.add("kana", "second", "");
        assert_eq!(errors.get("kana").unwrap().msg, "first");
    }

    #[test]
    fn test_valid_user() {
        let form = UserForm {
            username: Some("  Alice ".to_string()),
            password: Some("correct horse".to_string()),
        };
        let user = validate_user(form).unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.password, "correct horse");
    }

    #[test]
    fn test_invalid_user() {
        let errors = validate_user(UserForm::default()).unwrap_err();
        assert_eq!(errors.get("username").unwrap().msg, "Username is required");
        assert_eq!(errors.get("password").unwrap().msg, "Password is required");

        let form = UserForm {
            username: Some("a".repeat(MAX_USERNAME_LENGTH + 1)),
            password: Some("short".to_string()),
        };
        let errors = validate_user(form).unwrap_err();
        assert_eq!(
            errors.get("username").unwrap().msg,
            "Username must be 100 characters or below"
        );
        assert_eq!(
            errors.get("password").unwrap().msg,
            "Password must be 8 to 30 characters long"
        );
        assert_eq!(errors.get("password").unwrap().value, json!(""));
    }
}
