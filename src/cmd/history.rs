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

use std::fmt::Display;
use std::fmt::Formatter;
use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::Fallible;
use crate::store::RecordStore;
use crate::types::pair::GROUP_COUNT;
use crate::types::record::DrawRecord;

#[derive(ValueEnum, Clone, Copy)]
pub enum HistoryFormat {
    /// A plain text table.
    Table,
    /// JSON output.
    Json,
}

impl Display for HistoryFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryFormat::Table => write!(f, "table"),
            HistoryFormat::Json => write!(f, "json"),
        }
    }
}

/// A record with its 1-based position in the history.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryEntry<'a> {
    number: usize,
    #[serde(flatten)]
    record: &'a DrawRecord,
}

/// Print the history, most recent draw first.
pub fn print_history<W: Write>(
    store: &RecordStore,
    format: HistoryFormat,
    out: &mut W,
) -> Fallible<()> {
    let entries: Vec<HistoryEntry> = store
        .all()
        .iter()
        .enumerate()
        .rev()
        .map(|(index, record)| HistoryEntry {
            number: index + 1,
            record,
        })
        .collect();
    match format {
        HistoryFormat::Table if store.is_empty() => {
            writeln!(out, "No draws yet.")?;
            Ok(())
        }
        HistoryFormat::Table => write_table(&entries, out),
        HistoryFormat::Json => {
            let json = serde_json::to_string_pretty(&entries)?;
            writeln!(out, "{json}")?;
            Ok(())
        }
    }
}

fn write_table<W: Write>(entries: &[HistoryEntry], out: &mut W) -> Fallible<()> {
    write!(out, "{:>5}", "#")?;
    for group in 1..=GROUP_COUNT {
        write!(out, "  {:<7}", format!("group{group}"))?;
    }
    writeln!(out, "  drawn at")?;
    for entry in entries {
        let record = entry.record;
        write!(out, "{:>5}", entry.number)?;
        for pair in record.groups() {
            write!(out, "  {:<7}", pair.to_string())?;
        }
        let ts = record.created_at();
        writeln!(out, "  {} {}", ts.date(), ts.time())?;
        for group in 0..GROUP_COUNT {
            if let Some(annotation) = record.annotation(group) {
                writeln!(
                    out,
                    "{:>5}  group{}: {} ({})",
                    "",
                    group + 1,
                    annotation.name,
                    annotation.card_id
                )?;
            }
        }
    }
    Ok(())
}
