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

use std::io::Write;
use std::thread::sleep;
use std::time::Duration;

use rand::Rng;

use crate::config::RevealConfig;
use crate::draw::DrawEngine;
use crate::draw::Picker;
use crate::error::Fallible;
use crate::store::RecordStore;
use crate::types::pair::GROUP_COUNT;
use crate::types::pair::NumberPair;
use crate::types::record::DrawRecord;
use crate::types::timestamp::Timestamp;

/// The largest number shown while the reveal animation runs.
const REVEAL_MAX: u32 = 20;

/// Draw, show, and record one set of pairs. Returns the new record's index.
pub fn draw_and_record<P: Picker, W: Write>(
    store: &mut RecordStore,
    engine: &mut DrawEngine<P>,
    reveal: RevealConfig,
    out: &mut W,
) -> Fallible<usize> {
    animate(reveal, out)?;
    let pairs = engine.draw();
    let record = DrawRecord::new(Timestamp::now(), pairs);
    let index = store.append(record);
    writeln!(out, "{}", format_pairs(&pairs))?;
    writeln!(out, "Saved as draw #{}.", index + 1)?;
    Ok(index)
}

/// Show a few frames of throwaway numbers before the real draw is printed.
/// These come from a separate generator so they never disturb a seeded
/// engine.
fn animate<W: Write>(reveal: RevealConfig, out: &mut W) -> Fallible<()> {
    if reveal.frames == 0 {
        return Ok(());
    }
    let mut rng = rand::rng();
    let delay = Duration::from_millis(reveal.frame_millis);
    for _ in 0..reveal.frames {
        let frame: Vec<String> = (0..GROUP_COUNT)
            .map(|_| {
                let a = rng.random_range(1..=REVEAL_MAX);
                let b = rng.random_range(1..=REVEAL_MAX);
                format!("{a:>2}-{b:<2}")
            })
            .collect();
        write!(out, "\r{}", frame.join("  "))?;
        out.flush()?;
        sleep(delay);
    }
    write!(out, "\r")?;
    Ok(())
}

fn format_pairs(pairs: &[NumberPair]) -> String {
    pairs
        .iter()
        .map(|pair| format!("{:>2}-{:<2}", pair.low(), pair.high()))
        .collect::<Vec<_>>()
        .join("  ")
}
