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

use std::path::PathBuf;

use clap::Parser;
use fibocards_core::error::Fallible;
use fibocards_core::levels::LOCKED;

use crate::cmd::reveal::print_levels;
use crate::cmd::reveal::print_reveal;
use crate::cmd::serve::server::start_server;
use crate::config::ServeOptions;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Run the HTTP API server.
    Serve {
        /// Path to a TOML config file. Flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,
        /// The host address to bind to. Default is 127.0.0.1.
        #[arg(long)]
        host: Option<String>,
        /// The port to use for the web server. Default is 3000.
        #[arg(long)]
        port: Option<u16>,
        /// Path to the SQLite database. Default is fibocards.db.
        #[arg(long)]
        database: Option<String>,
        /// Secret used to sign access tokens.
        #[arg(long, env = "FIBOCARDS_JWT_SECRET", hide_env_values = true)]
        jwt_secret: Option<String>,
        /// How long access tokens stay valid. Default is 48 hours.
        #[arg(long)]
        token_ttl_hours: Option<i64>,
    },
    /// Print the progressive display of a kana/romaji pair.
    Reveal {
        kana: String,
        romaji: String,
        /// Unlock level. Default is -1, which shows only romaji.
        #[arg(long, default_value_t = LOCKED, allow_negative_numbers = true)]
        level: i32,
    },
    /// List the kana introduced at each level.
    Levels,
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Serve {
            config,
            host,
            port,
            database,
            jwt_secret,
            token_ttl_hours,
        } => {
            let flags = ServeOptions {
                host,
                port,
                database,
                jwt_secret,
                token_ttl_hours,
            };
            let options = match config {
                Some(path) => flags.or(ServeOptions::load(&path)?),
                None => flags,
            };
            start_server(options.into_server_config()?).await
        }
        Command::Reveal {
            kana,
            romaji,
            level,
        } => {
            print_reveal(&kana, &romaji, level);
            Ok(())
        }
        Command::Levels => {
            print_levels();
            Ok(())
        }
    }
}
