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

use crate::reveal::progressive;
use crate::types::timestamp::Timestamp;

/// A vocabulary card. `japanese` is the natural key.
#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    /// The word as written, usually with kanji.
    pub japanese: String,
    /// Phonetic transcription in hiragana or katakana.
    pub kana: String,
    /// Latin transcription, aligned with `kana` unit for unit.
    pub romaji: String,
    pub english: String,
    /// Unlock level used for the progressive display. `-1` unlocks nothing.
    pub level: i32,
    pub created_at: Timestamp,
}

impl Card {
    /// The mixed kana/romaji display string at this card's level.
    ///
    /// This is computed from the stored fields on every call, so it can
    /// never go stale after the card is replaced.
    pub fn progressive(&self) -> String {
        progressive(&self.kana, &self.romaji, self.level)
    }
}
