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

use std::io::stdout;
use std::path::PathBuf;

use clap::Parser;

use crate::cmd::annotate::annotate_record;
use crate::cmd::draw::draw_and_record;
use crate::cmd::export::export_history;
use crate::cmd::history::HistoryFormat;
use crate::cmd::history::print_history;
use crate::config::Config;
use crate::draw::DrawEngine;
use crate::error::Fallible;
use crate::store::RecordStore;
use crate::table::Layout;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Draw five pairs and add them to the history.
    Draw {
        /// Path to the history file.
        #[arg(long)]
        history: Option<String>,
        /// Seed for a reproducible draw.
        #[arg(long)]
        seed: Option<u64>,
        /// Skip the reveal animation.
        #[arg(long)]
        no_reveal: bool,
    },
    /// List previous draws, most recent first.
    History {
        /// Path to the history file.
        #[arg(long)]
        history: Option<String>,
        /// Output format.
        #[arg(long, default_value_t = HistoryFormat::Table)]
        format: HistoryFormat,
    },
    /// Record who claimed a group of a draw.
    Annotate {
        /// The group, from 1 to 5.
        group: usize,
        /// The claimant's name.
        name: String,
        /// The claimant's card id.
        card_id: String,
        /// The draw number shown by `history`. Defaults to the latest draw.
        #[arg(long)]
        record: Option<usize>,
        /// Path to the history file.
        #[arg(long)]
        history: Option<String>,
    },
    /// Write the history to a file.
    Export {
        /// Where to write the table.
        output: PathBuf,
        /// Leave out the name and card id columns.
        #[arg(long)]
        condensed: bool,
        /// Path to the history file.
        #[arg(long)]
        history: Option<String>,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    let config = Config::load()?;
    let mut out = stdout().lock();
    match cli {
        Command::Draw {
            history,
            seed,
            no_reveal,
        } => {
            let mut store = RecordStore::open(config.history_file(history));
            let mut engine = match seed {
                Some(seed) => DrawEngine::seeded(seed),
                None => DrawEngine::from_entropy(),
            };
            let mut reveal = config.reveal;
            if no_reveal {
                reveal.frames = 0;
            }
            draw_and_record(&mut store, &mut engine, reveal, &mut out)?;
            Ok(())
        }
        Command::History { history, format } => {
            let store = RecordStore::open(config.history_file(history));
            print_history(&store, format, &mut out)
        }
        Command::Annotate {
            group,
            name,
            card_id,
            record,
            history,
        } => {
            let mut store = RecordStore::open(config.history_file(history));
            annotate_record(&mut store, record, group, &name, &card_id, &mut out)
        }
        Command::Export {
            output,
            condensed,
            history,
        } => {
            let store = RecordStore::open(config.history_file(history));
            let layout = if condensed {
                Layout::Condensed
            } else {
                Layout::Full
            };
            export_history(&store, &output, layout, &mut out)
        }
    }
}
