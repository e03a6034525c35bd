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

//! Progressive reveal: show the kana a learner has unlocked, and romaji for
//! everything else.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use crate::kana;
use crate::levels;

/// Builds the mixed kana/romaji string for `kana` at `level`.
///
/// Two cursors walk the inputs in step: one over `kana` by unit (one
/// character, or two for a digraph), one over `romaji` by the length of each
/// unit's romaji. Spaces in `romaji` are copied through as they are met, so
/// the output keeps the romaji's word breaks.
///
/// The romaji cursor only ever advances by the table's romaji length, so the
/// output is only meaningful when `kana` and `romaji` spell the same thing.
/// Mismatched pairs produce garbled text but never panic. See
/// [`check_alignment`] for the write-time check.
pub fn progressive(kana: &str, romaji: &str, level: i32) -> String {
    let kana: Vec<char> = kana.chars().collect();
    let romaji: Vec<char> = romaji.chars().collect();
    let mut output = String::with_capacity(romaji.len() + kana.len() * 3);

    let mut ip: usize = 0;
    let mut rip: usize = 0;
    while ip < kana.len() {
        while romaji.get(rip) == Some(&' ') {
            output.push(' ');
            rip += 1;
        }

        let width = unit_width(&kana, ip);
        let unit: String = kana[ip..ip + width].iter().collect();
        ip += width;

        let fragment: &str = kana::lookup(&unit).unwrap_or("");
        if levels::is_unlocked(&unit, level) {
            output.push_str(&unit);
        } else {
            output.push_str(fragment);
        }
        rip += fragment.chars().count();
    }
    output
}

/// The number of characters in the kana unit starting at `ip`.
fn unit_width(kana: &[char], ip: usize) -> usize {
    match kana.get(ip + 1) {
        Some(c) if kana::is_digraph_marker(*c) => 2,
        _ => 1,
    }
}

/// Why a kana/romaji pair cannot be revealed progressively.
#[derive(Debug, PartialEq)]
pub enum AlignmentError {
    /// The kana contains a unit missing from the kana table.
    UnknownUnit(String),
    /// The romaji at this point does not spell the kana unit.
    Mismatch {
        unit: String,
        expected: &'static str,
        found: String,
    },
    /// Romaji left over after every kana unit was matched.
    TrailingRomaji(String),
}

impl Display for AlignmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignmentError::UnknownUnit(unit) => {
                write!(f, "Kana '{unit}' has no known romaji")
            }
            AlignmentError::Mismatch {
                unit,
                expected,
                found,
            } => write!(
                f,
                "Romaji does not match kana: expected '{expected}' for '{unit}', found '{found}'"
            ),
            AlignmentError::TrailingRomaji(rest) => {
                write!(f, "Romaji has text with no matching kana: '{rest}'")
            }
        }
    }
}

impl Error for AlignmentError {}

/// Checks that `romaji` spells `kana` unit for unit, so that
/// [`progressive`] reproduces `romaji` when locked and `kana` when fully
/// unlocked. Extra spaces may appear in the romaji wherever a unit boundary
/// falls; they also show up in the fully unlocked output.
/// A space in the kana must be matched by a space in the romaji. Romaji is
/// compared exactly, so it must be lowercase like the kana table.
pub fn check_alignment(kana: &str, romaji: &str) -> Result<(), AlignmentError> {
    let kana: Vec<char> = kana.chars().collect();
    let romaji: Vec<char> = romaji.chars().collect();

    let mut ip: usize = 0;
    let mut rip: usize = 0;
    while ip < kana.len() {
        if kana[ip] == ' ' {
            if romaji.get(rip) != Some(&' ') {
                return Err(AlignmentError::Mismatch {
                    unit: " ".to_string(),
                    expected: " ",
                    found: romaji.get(rip).map(|c| c.to_string()).unwrap_or_default(),
                });
            }
            ip += 1;
            rip += 1;
            continue;
        }
        while romaji.get(rip) == Some(&' ') {
            rip += 1;
        }

        let width = unit_width(&kana, ip);
        let unit: String = kana[ip..ip + width].iter().collect();
        ip += width;

        let Some(expected) = kana::lookup(&unit) else {
            return Err(AlignmentError::UnknownUnit(unit));
        };
        let end = (rip + expected.chars().count()).min(romaji.len());
        let found: String = romaji[rip..end].iter().collect();
        if found != expected {
            return Err(AlignmentError::Mismatch {
                unit,
                expected,
                found,
            });
        }
        rip = end;
    }

    let rest: String = romaji[rip.min(romaji.len())..].iter().collect();
    if !rest.trim().is_empty() {
        return Err(AlignmentError::TrailingRomaji(rest.trim().to_string()));
    }
    Ok(())
}
