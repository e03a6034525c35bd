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

//! fibocards-core: Core library for the fibocards vocabulary server.
//!
//! This library has no I/O and provides:
//! - The kana table and the level table
//! - Progressive reveal of kana over romaji
//! - Card and user records
//! - Validation of card and user requests

pub mod error;
pub mod kana;
pub mod levels;
pub mod reveal;
pub mod types;
pub mod validate;

// Re-exports for convenience
pub use error::{ErrorReport, Fallible, fail};
pub use levels::{LOCKED, MAX_LEVEL};
pub use reveal::{AlignmentError, check_alignment, progressive};
pub use types::card::Card;
pub use types::timestamp::Timestamp;
pub use types::user::User;
pub use validate::{CardForm, FieldErrors, NewUser, UserForm, validate_card, validate_user};
