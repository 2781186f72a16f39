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

//! The history table: comma-separated rows with no quoting, an optional
//! header, and one row per draw.
//!
//! A full row has 17 fields: the date, the time, then for each of the five
//! groups the pair (`low-high`), the claimant's name and card id. Names or
//! card ids containing a comma will corrupt the row.

use std::io::Read;
use std::io::Write;

use csv::QuoteStyle;
use csv::ReaderBuilder;
use csv::StringRecord;
use csv::WriterBuilder;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::pair::Band;
use crate::types::pair::GROUP_COUNT;
use crate::types::pair::NumberPair;
use crate::types::record::Annotation;
use crate::types::record::DrawRecord;
use crate::types::timestamp::Timestamp;
use crate::types::timestamp::is_date;

/// Fields per group in the full layout: pair, name, card id.
const GROUP_FIELDS: usize = 3;

/// The number of fields in a full row.
pub const FIELD_COUNT: usize = 2 + GROUP_FIELDS * GROUP_COUNT;

/// Which columns to write.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Layout {
    /// Date, time, and every group with its claimant. This is the layout of
    /// the history file.
    Full,
    /// Date, time, and the five pairs, without claimants.
    Condensed,
}

impl Layout {
    fn header(self) -> Vec<String> {
        let mut header = vec!["date".to_string(), "time".to_string()];
        for group in 1..=GROUP_COUNT {
            header.push(format!("group{group}"));
            if self == Layout::Full {
                header.push(format!("name{group}"));
                header.push(format!("card{group}"));
            }
        }
        header
    }

    fn row(self, record: &DrawRecord) -> Vec<String> {
        let ts = record.created_at();
        let mut row = vec![ts.date(), ts.time()];
        for (pair, annotation) in record.groups().iter().zip(record.annotations()) {
            row.push(pair.to_string());
            if self == Layout::Full {
                match annotation {
                    Some(Annotation { name, card_id }) => {
                        row.push(name.clone());
                        row.push(card_id.clone());
                    }
                    None => {
                        row.push(String::new());
                        row.push(String::new());
                    }
                }
            }
        }
        row
    }
}

/// Whether `value` can be written as a field without breaking its row.
pub fn is_storable(value: &str) -> bool {
    !value.contains([',', '\n', '\r'])
}

/// Write a header row followed by one row per record.
pub fn write_table<W: Write>(writer: W, records: &[DrawRecord], layout: Layout) -> Fallible<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .from_writer(writer);
    writer.write_record(layout.header())?;
    for record in records {
        writer.write_record(layout.row(record))?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a full-layout table. Rows that can't be parsed are skipped with a
/// warning. Fails only if the underlying reader does.
pub fn read_table<R: Read>(reader: R) -> Fallible<Vec<DrawRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);
    let mut records = Vec::new();
    let mut first = true;
    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                log::warn!("Skipping unreadable row: {e}");
                first = false;
                continue;
            }
        };
        let is_first = std::mem::replace(&mut first, false);
        if is_first && !row.get(0).is_some_and(is_date) {
            continue;
        }
        match parse_row(&row) {
            Ok(record) => records.push(record),
            Err(e) => {
                let line = row.position().map(|p| p.line()).unwrap_or(0);
                log::warn!("Skipping row on line {line}: {e}");
            }
        }
    }
    Ok(records)
}

/// Parse one full-layout row. Fields past the 17th are ignored.
pub fn parse_row(row: &StringRecord) -> Fallible<DrawRecord> {
    if row.len() < FIELD_COUNT {
        return fail(format!(
            "expected {FIELD_COUNT} fields, found {}.",
            row.len()
        ));
    }
    let field = |index: usize| row.get(index).unwrap_or("");
    let created_at = Timestamp::parse(field(0), field(1))?;
    let mut groups = Vec::with_capacity(GROUP_COUNT);
    let mut annotations = Vec::with_capacity(GROUP_COUNT);
    for band in Band::all() {
        let base = 2 + GROUP_FIELDS * band.group();
        groups.push(NumberPair::parse(band, field(base))?);
        annotations.push(Annotation::from_fields(field(base + 1), field(base + 2)));
    }
    let groups: [NumberPair; GROUP_COUNT] = match groups.try_into() {
        Ok(groups) => groups,
        Err(_) => return fail("wrong number of groups."),
    };
    let mut record = DrawRecord::new(created_at, groups);
    for (group, annotation) in annotations.into_iter().enumerate() {
        record.set_annotation(group, annotation);
    }
    Ok(record)
}
