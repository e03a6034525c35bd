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

use fibocards_core::levels::MAX_LEVEL;
use fibocards_core::levels::units_at;
use fibocards_core::reveal::check_alignment;
use fibocards_core::reveal::progressive;

/// Prints the progressive display of a kana/romaji pair at `level`.
pub fn print_reveal(kana: &str, romaji: &str, level: i32) {
    if let Err(e) = check_alignment(kana, romaji) {
        log::warn!("{e}");
    }
    println!("{}", progressive(kana, romaji, level));
}

/// Prints the kana introduced at each level.
pub fn print_levels() {
    for line in level_lines() {
        println!("{line}");
    }
}

fn level_lines() -> Vec<String> {
    (0..=MAX_LEVEL)
        .map(|level| format!("{level:>2}: {}", units_at(level).join(" ")))
        .collect()
}
