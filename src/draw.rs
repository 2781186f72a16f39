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

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::types::pair::BAND_WIDTH;
use crate::types::pair::Band;
use crate::types::pair::GROUP_COUNT;
use crate::types::pair::NumberPair;

/// A source of uniform choices.
pub trait Picker {
    /// Return a value drawn uniformly from `0..count`. `count` is never zero.
    fn pick(&mut self, count: u32) -> u32;
}

impl<P: Picker + ?Sized> Picker for &mut P {
    fn pick(&mut self, count: u32) -> u32 {
        (**self).pick(count)
    }
}

/// Adapts a `rand` generator into a [`Picker`].
pub struct RngPicker<R> {
    rng: R,
}

impl<R: Rng> RngPicker<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Picker for RngPicker<R> {
    fn pick(&mut self, count: u32) -> u32 {
        self.rng.random_range(0..count)
    }
}

/// Produces draws: five pairs, one per band, with `low < high`.
pub struct DrawEngine<P = RngPicker<Pcg32>> {
    picker: P,
}

impl DrawEngine {
    /// An engine seeded from the operating system's entropy.
    pub fn from_entropy() -> Self {
        Self::seeded(rand::random())
    }

    /// An engine whose draws are fully determined by `seed`.
    pub fn seeded(seed: u64) -> Self {
        log::debug!("Seeding draw engine with {seed}.");
        Self::new(RngPicker::new(Pcg32::seed_from_u64(seed)))
    }
}

impl<P: Picker> DrawEngine<P> {
    pub fn new(picker: P) -> Self {
        Self { picker }
    }

    /// Draw one pair per band.
    pub fn draw(&mut self) -> [NumberPair; GROUP_COUNT] {
        Band::all().map(|band| self.draw_pair(band))
    }

    fn draw_pair(&mut self, band: Band) -> NumberPair {
        // `low` comes from the first three values of the band.
        let low = band.start() + self.picker.pick(BAND_WIDTH - 1);
        // `high` is redrawn from the whole band until it exceeds `low`. The
        // band's last value always does, so this terminates.
        let high = loop {
            let candidate = band.start() + self.picker.pick(BAND_WIDTH);
            if candidate > low {
                break candidate;
            }
        };
        NumberPair::from_draw(low, high)
    }
}
