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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use fibocards_core::error::Fallible;
use fibocards_core::error::fail;

use crate::auth::token::TokenSigner;
use crate::db::Database;

#[derive(Clone)]
pub struct ServerState {
    db: Arc<Mutex<Database>>,
    pub tokens: Arc<TokenSigner>,
}

impl ServerState {
    pub fn new(db: Database, tokens: TokenSigner) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            tokens: Arc::new(tokens),
        }
    }

    /// Locks the database. Never hold the guard across an `.await`.
    pub fn db(&self) -> Fallible<MutexGuard<'_, Database>> {
        match self.db.lock() {
            Ok(guard) => Ok(guard),
            Err(_) => fail("database lock poisoned"),
        }
    }
}
