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

//! The level table: which kana units a learner has unlocked.
//!
//! Level `n` introduces the units in `LEVELS[n]`. Unlocking is cumulative, so
//! at level `n` every unit introduced at `0..=n` is shown in kana.

use std::collections::HashMap;
use std::sync::LazyLock;

/// The level at which nothing is unlocked.
pub const LOCKED: i32 = -1;

#[rustfmt::skip]
const LEVELS: &[&[&str]] = &[
    // Vowels.
    &["あ", "い", "う", "え", "お"],
    &["か", "き", "く", "け", "こ"],
    &["さ", "し", "す", "せ", "そ"],
    &["た", "ち", "つ", "て", "と"],
    &["な", "に", "ぬ", "ね", "の"],
    &["は", "ひ", "ふ", "へ", "ほ"],
    &["ま", "み", "む", "め", "も"],
    &["や", "ゆ", "よ"],
    &["ら", "り", "る", "れ", "ろ"],
    &["わ", "を", "ん"],
    // Voiced hiragana.
    &[
        "が", "ぎ", "ぐ", "げ", "ご",
        "ざ", "じ", "ず", "ぜ", "ぞ",
    ],
    &[
        "だ", "ぢ", "づ", "で", "ど",
        "ば", "び", "ぶ", "べ", "ぼ",
        "ぱ", "ぴ", "ぷ", "ぺ", "ぽ",
    ],
    // Hiragana digraphs.
    &[
        "きゃ", "きゅ", "きょ", "しゃ", "しゅ", "しょ",
        "ちゃ", "ちゅ", "ちょ", "にゃ", "にゅ", "にょ",
        "ひゃ", "ひゅ", "ひょ", "みゃ", "みゅ", "みょ",
        "りゃ", "りゅ", "りょ",
    ],
    &[
        "ぎゃ", "ぎゅ", "ぎょ", "じゃ", "じゅ", "じょ",
        "ぢゃ", "ぢゅ", "ぢょ", "びゃ", "びゅ", "びょ",
        "ぴゃ", "ぴゅ", "ぴょ",
    ],
    // Katakana.
    &[
        "ア", "イ", "ウ", "エ", "オ",
        "カ", "キ", "ク", "ケ", "コ",
    ],
    &[
        "サ", "シ", "ス", "セ", "ソ",
        "タ", "チ", "ツ", "テ", "ト",
    ],
    &[
        "ナ", "ニ", "ヌ", "ネ", "ノ",
        "ハ", "ヒ", "フ", "ヘ", "ホ",
    ],
    &[
        "マ", "ミ", "ム", "メ", "モ",
        "ヤ", "ユ", "ヨ",
    ],
    &[
        "ラ", "リ", "ル", "レ", "ロ",
        "ワ", "ヲ", "ン",
    ],
    &[
        "ガ", "ギ", "グ", "ゲ", "ゴ",
        "ザ", "ジ", "ズ", "ゼ", "ゾ",
        "ダ", "ヂ", "ヅ", "デ", "ド",
        "バ", "ビ", "ブ", "ベ", "ボ",
        "パ", "ピ", "プ", "ペ", "ポ",
    ],
    &[
        "キャ", "キュ", "キョ", "シャ", "シュ", "ショ", "チャ", "チュ", "チョ",
        "ニャ", "ニュ", "ニョ", "ヒャ", "ヒュ", "ヒョ", "ミャ", "ミュ", "ミョ",
        "リャ", "リュ", "リョ",
        "ギャ", "ギュ", "ギョ", "ジャ", "ジュ", "ジョ", "ヂャ", "ヂュ", "ヂョ",
        "ビャ", "ビュ", "ビョ", "ピャ", "ピュ", "ピョ",
    ],
];

/// The highest level. Everything in the kana table is unlocked here.
pub const MAX_LEVEL: i32 = LEVELS.len() as i32 - 1;

static INTRODUCED_AT: LazyLock<HashMap<&'static str, i32>> = LazyLock::new(|| {
    let mut map = HashMap::new();
    for (level, units) in LEVELS.iter().enumerate() {
        for unit in units.iter() {
            map.insert(*unit, level as i32);
        }
    }
    map
});

/// The level at which `unit` is introduced, if it is in the table at all.
pub fn introduced_at(unit: &str) -> Option<i32> {
    INTRODUCED_AT.get(unit).copied()
}

/// Whether `unit` is shown in kana at `level`. Units missing from the table
/// are never unlocked.
pub fn is_unlocked(unit: &str, level: i32) -> bool {
    introduced_at(unit).is_some_and(|at| at <= level)
}

/// The units newly introduced at `level`.
pub fn units_at(level: i32) -> &'static [&'static str] {
    usize::try_from(level)
        .ok()
        .and_then(|level| LEVELS.get(level))
        .copied()
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kana;

    #[test]
    fn test_every_kana_unit_has_a_level() {
        for unit in kana::units() {
            assert!(introduced_at(unit).is_some(), "{unit} has no level");
        }
    }

    #[test]
    fn test_every_level_unit_is_in_the_kana_table() {
        for level in 0..=MAX_LEVEL {
            for unit in units_at(level) {
                assert!(kana::lookup(unit).is_some(), "{unit} is not in the kana table");
            }
        }
    }

    #[test]
    fn test_each_unit_introduced_once() {
        let total: usize = (0..=MAX_LEVEL).map(|level| units_at(level).len()).sum();
        assert_eq!(total, INTRODUCED_AT.len());
    }

    #[test]
    fn test_unlock_is_cumulative() {
        for unit in kana::units() {
            let mut seen = false;
            for level in LOCKED..=MAX_LEVEL + 2 {
                let unlocked = is_unlocked(unit, level);
                assert!(!seen || unlocked, "{unit} locked again at {level}");
                seen |= unlocked;
            }
            assert!(seen);
        }
    }

    #[test]
    fn test_locked_level_unlocks_nothing() {
        for unit in kana::units() {
            assert!(!is_unlocked(unit, LOCKED));
        }
    }

    #[test]
    fn test_acquisition_order() {
        assert_eq!(introduced_at("あ"), Some(0));
        assert_eq!(introduced_at("か"), Some(1));
        assert_eq!(introduced_at("ん"), Some(9));
        assert!(introduced_at("が") > introduced_at("ん"));
        assert!(introduced_at("きゃ") > introduced_at("ぽ"));
        assert!(introduced_at("ア") > introduced_at("ぴょ"));
        assert_eq!(introduced_at("ピョ"), Some(MAX_LEVEL));
    }

    #[test]
    fn test_unknown_units_stay_locked() {
        assert_eq!(introduced_at("っ"), None);
        assert!(!is_unlocked("っ", MAX_LEVEL));
        assert!(!is_unlocked(" ", MAX_LEVEL));
    }

    #[test]
    fn test_units_at_out_of_range() {
        assert!(units_at(LOCKED).is_empty());
        assert!(units_at(MAX_LEVEL + 1).is_empty());
        assert_eq!(units_at(7), &["や", "ゆ", "よ"]);
    }
}
