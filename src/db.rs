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

use fibocards_core::error::Fallible;
use fibocards_core::types::card::Card;
use fibocards_core::types::timestamp::Timestamp;
use fibocards_core::types::user::User;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::params;

const SCHEMA: &str = "
create table if not exists cards (
    japanese text primary key,
    kana text not null,
    romaji text not null,
    english text not null,
    level integer not null,
    created_at text not null
) strict;

create table if not exists users (
    username text primary key,
    password_hash text not null,
    created_at text not null
) strict;
";

const CARD_COLUMNS: &str = "japanese, kana, romaji, english, level, created_at";

/// The outcome of replacing a card.
#[derive(Debug, PartialEq)]
pub enum Replace {
    Replaced,
    /// No card has the old key.
    NotFound,
    /// The new key belongs to a different card.
    Conflict,
}

/// SQLite-backed card and user store. Uniqueness of card and user keys is
/// enforced by the primary keys.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Fallible<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    #[cfg(test)]
    pub fn in_memory() -> Fallible<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Fallible<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn find_card(&self, japanese: &str) -> Fallible<Option<Card>> {
        let sql = format!("select {CARD_COLUMNS} from cards where japanese = ?1");
        let row = self
            .conn
            .query_row(&sql, [japanese], CardRow::read)
            .optional()?;
        row.map(CardRow::into_card).transpose()
    }

    /// Cards whose key starts with `prefix`, in key order.
    pub fn find_cards_by_prefix(&self, prefix: &str, limit: usize) -> Fallible<Vec<Card>> {
        let sql = format!(
            "select {CARD_COLUMNS} from cards
             where substr(japanese, 1, length(?1)) = ?1
             order by japanese
             limit ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![prefix, limit as i64], CardRow::read)?;
        let mut cards = Vec::new();
        for row in rows {
            cards.push(row?.into_card()?);
        }
        Ok(cards)
    }

    /// Inserts a card. Returns false, and changes nothing, if a card with the
    /// same key already exists.
    pub fn insert_card(&self, card: &Card) -> Fallible<bool> {
        let sql = format!(
            "insert into cards ({CARD_COLUMNS}) values (?1, ?2, ?3, ?4, ?5, ?6)
             on conflict (japanese) do nothing"
        );
        let changed = self.conn.execute(
            &sql,
            params![
                card.japanese,
                card.kana,
                card.romaji,
                card.english,
                card.level,
                card.created_at.to_string(),
            ],
        )?;
        Ok(changed == 1)
    }

    /// Overwrites the card stored under `japanese` with `card`, which may
    /// carry a different key.
    pub fn replace_card(&self, japanese: &str, card: &Card) -> Fallible<Replace> {
        let tx = self.conn.unchecked_transaction()?;
        let exists = |key: &str| -> Fallible<bool> {
            let found = tx
                .query_row("select 1 from cards where japanese = ?1", [key], |_| Ok(()))
                .optional()?;
            Ok(found.is_some())
        };
        if !exists(japanese)? {
            return Ok(Replace::NotFound);
        }
        if card.japanese != japanese && exists(&card.japanese)? {
            return Ok(Replace::Conflict);
        }
        tx.execute(
            "update cards
             set japanese = ?1, kana = ?2, romaji = ?3, english = ?4, level = ?5, created_at = ?6
             where japanese = ?7",
            params![
                card.japanese,
                card.kana,
                card.romaji,
                card.english,
                card.level,
                card.created_at.to_string(),
                japanese,
            ],
        )?;
        tx.commit()?;
        Ok(Replace::Replaced)
    }

    pub fn find_user(&self, username: &str) -> Fallible<Option<User>> {
        let row = self
            .conn
            .query_row(
                "select username, password_hash, created_at from users where username = ?1",
                [username],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;
        match row {
            Some((username, password_hash, created_at)) => Ok(Some(User {
                username,
                password_hash,
                created_at: Timestamp::try_from(created_at)?,
            })),
            None => Ok(None),
        }
    }

    /// Inserts a user. Returns false if the username is taken.
    pub fn insert_user(&self, user: &User) -> Fallible<bool> {
        let changed = self.conn.execute(
            "insert into users (username, password_hash, created_at) values (?1, ?2, ?3)
             on conflict (username) do nothing",
            params![
                user.username,
                user.password_hash,
                user.created_at.to_string()
            ],
        )?;
        Ok(changed == 1)
    }
}

struct CardRow {
    japanese: String,
    kana: String,
    romaji: String,
    english: String,
    level: i32,
    created_at: String,
}

impl CardRow {
    fn read(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            japanese: row.get(0)?,
            kana: row.get(1)?,
            romaji: row.get(2)?,
            english: row.get(3)?,
            level: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    fn into_card(self) -> Fallible<Card> {
        Ok(Card {
            japanese: self.japanese,
            kana: self.kana,
            romaji: self.romaji,
            english: self.english,
            level: self.level,
            created_at: Timestamp::try_from(self.created_at)?,
        })
    }
}
