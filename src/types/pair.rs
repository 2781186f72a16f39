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
use std::str::FromStr;

use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;

/// The number of groups in a draw.
pub const GROUP_COUNT: usize = 5;

/// The number of integers in each band.
pub const BAND_WIDTH: u32 = 4;

/// The fixed range of integers assigned to one group. Group `g` covers
/// `4g+1 ..= 4g+4`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Band {
    group: usize,
}

impl Band {
    /// All five bands, in group order.
    pub fn all() -> [Band; GROUP_COUNT] {
        [0, 1, 2, 3, 4].map(|group| Band { group })
    }

    pub fn group(self) -> usize {
        self.group
    }

    /// The smallest value in the band.
    pub fn start(self) -> u32 {
        BAND_WIDTH * self.group as u32 + 1
    }

    /// The largest value in the band.
    pub fn end(self) -> u32 {
        self.start() + BAND_WIDTH - 1
    }

    pub fn contains(self, value: u32) -> bool {
        value >= self.start() && value <= self.end()
    }
}

/// Two numbers drawn from the same band, with `low < high`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct NumberPair {
    low: u32,
    high: u32,
}

impl NumberPair {
    /// Construct a pair, checking the ordering and band invariants.
    pub fn new(band: Band, low: u32, high: u32) -> Fallible<Self> {
        if low >= high {
            return fail(format!("pair {low}-{high} is not in ascending order."));
        }
        if !band.contains(low) || !band.contains(high) {
            return fail(format!(
                "pair {low}-{high} is outside the band {}-{}.",
                band.start(),
                band.end()
            ));
        }
        Ok(Self { low, high })
    }

    /// Construct a pair the draw engine has already checked.
    pub(crate) fn from_draw(low: u32, high: u32) -> Self {
        debug_assert!(low < high);
        Self { low, high }
    }

    /// Parse a `low-high` field and check it against `band`.
    pub fn parse(band: Band, s: &str) -> Fallible<Self> {
        let RawPair { low, high } = s.parse()?;
        Self::new(band, low, high)
    }

    pub fn low(self) -> u32 {
        self.low
    }

    pub fn high(self) -> u32 {
        self.high
    }
}

impl Display for NumberPair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// A `low-high` field before the band is known.
struct RawPair {
    low: u32,
    high: u32,
}

impl FromStr for RawPair {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (low, high) = s
            .split_once('-')
            .ok_or_else(|| ErrorReport::new(format!("invalid pair: {s:?}")))?;
        let parse = |part: &str| -> Fallible<u32> {
            part.trim()
                .parse::<u32>()
                .map_err(|_| ErrorReport::new(format!("invalid pair: {s:?}")))
        };
        Ok(RawPair {
            low: parse(low)?,
            high: parse(high)?,
        })
    }
}
