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

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::store::RecordStore;
use crate::types::pair::GROUP_COUNT;

/// Record a claimant for one group of one draw. `record` and `group` are
/// 1-based, as printed by `history`. Without `record`, the latest draw is
/// annotated.
pub fn annotate_record<W: Write>(
    store: &mut RecordStore,
    record: Option<usize>,
    group: usize,
    name: &str,
    card_id: &str,
    out: &mut W,
) -> Fallible<()> {
    let record_index = match record {
        Some(number) => number
            .checked_sub(1)
            .ok_or_else(|| ErrorReport::new("draw numbers start at 1."))?,
        None => match store.latest_index() {
            Some(index) => index,
            None => return fail("there are no draws to annotate."),
        },
    };
    let group_index = match group.checked_sub(1) {
        Some(index) if index < GROUP_COUNT => index,
        _ => return fail(format!("group must be between 1 and {GROUP_COUNT}.")),
    };
    store.annotate(record_index, group_index, name, card_id)?;
    if name.is_empty() && card_id.is_empty() {
        writeln!(out, "Cleared group {group} of draw #{}.", record_index + 1)?;
    } else {
        writeln!(
            out,
            "Group {group} of draw #{} claimed by {name} ({card_id}).",
            record_index + 1
        )?;
    }
    Ok(())
}
