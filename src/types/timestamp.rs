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

use chrono::Local;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use chrono::Timelike;
use serde::Serialize;
use serde::Serializer;

use crate::error::ErrorReport;
use crate::error::Fallible;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// A local wall-clock timestamp with one second precision. Stored as separate
/// date and time columns.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    pub fn new(ts: NaiveDateTime) -> Self {
        // Sub-second precision does not survive the table, so drop it here.
        Self(ts.with_nanosecond(0).unwrap_or(ts))
    }

    pub fn now() -> Self {
        Self::new(Local::now().naive_local())
    }

    /// Parse the `YYYY-MM-DD` and `HH:MM:SS` columns.
    pub fn parse(date: &str, time: &str) -> Fallible<Self> {
        let date = parse_date(date)?;
        let time = NaiveTime::parse_from_str(time.trim(), TIME_FORMAT)
            .map_err(|_| ErrorReport::new(format!("invalid time: {time:?}")))?;
        Ok(Self::new(date.and_time(time)))
    }

    pub fn date(self) -> String {
        self.0.format(DATE_FORMAT).to_string()
    }

    pub fn time(self) -> String {
        self.0.format(TIME_FORMAT).to_string()
    }
}

/// Whether `s` looks like a date column. Used to tell a header row from data.
pub fn is_date(s: &str) -> bool {
    parse_date(s).is_ok()
}

fn parse_date(s: &str) -> Fallible<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| ErrorReport::new(format!("invalid date: {s:?}")))
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{} {}", self.date(), self.time()))
    }
}
