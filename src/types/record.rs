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

use serde::Serialize;

use crate::types::pair::GROUP_COUNT;
use crate::types::pair::NumberPair;
use crate::types::timestamp::Timestamp;

/// A claimant attached to one group of a draw.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub name: String,
    pub card_id: String,
}

impl Annotation {
    /// Build an annotation from its two fields. Both fields blank means no
    /// annotation, matching how an absent one is written to the table.
    pub fn from_fields(name: &str, card_id: &str) -> Option<Self> {
        if name.is_empty() && card_id.is_empty() {
            None
        } else {
            Some(Self {
                name: name.to_string(),
                card_id: card_id.to_string(),
            })
        }
    }
}

/// One draw and its claimants.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawRecord {
    /// When the draw was made. Never changes.
    created_at: Timestamp,
    /// The drawn pairs, one per band, in group order.
    groups: [NumberPair; GROUP_COUNT],
    /// Per-group claimants, initially all absent.
    annotations: [Option<Annotation>; GROUP_COUNT],
}

impl DrawRecord {
    pub fn new(created_at: Timestamp, groups: [NumberPair; GROUP_COUNT]) -> Self {
        Self {
            created_at,
            groups,
            annotations: Default::default(),
        }
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn groups(&self) -> &[NumberPair; GROUP_COUNT] {
        &self.groups
    }

    pub fn annotations(&self) -> &[Option<Annotation>; GROUP_COUNT] {
        &self.annotations
    }

    pub fn annotation(&self, group: usize) -> Option<&Annotation> {
        self.annotations.get(group).and_then(Option::as_ref)
    }

    /// Overwrite the claimant of `group`. Callers check the index.
    pub(crate) fn set_annotation(&mut self, group: usize, annotation: Option<Annotation>) {
        self.annotations[group] = annotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;
    use crate::types::pair::Band;

    fn record() -> Fallible<DrawRecord> {
        let bands = Band::all();
        let groups = [
            NumberPair::new(bands[0], 1, 2)?,
            NumberPair::new(bands[1], 5, 8)?,
            NumberPair::new(bands[2], 11, 12)?,
            NumberPair::new(bands[3], 13, 14)?,
            NumberPair::new(bands[4], 18, 20)?,
        ];
        Ok(DrawRecord::new(
            Timestamp::parse("2025-01-02", "03:04:05")?,
            groups,
        ))
    }

    #[test]
    fn test_new_record_has_no_annotations() -> Fallible<()> {
        let record = record()?;
        assert!(record.annotations().iter().all(Option::is_none));
        Ok(())
    }

    #[test]
    fn test_blank_annotation_is_absent() {
        assert_eq!(Annotation::from_fields("", ""), None);
        assert!(Annotation::from_fields("Alice", "").is_some());
        assert!(Annotation::from_fields("", "0042").is_some());
    }

    #[test]
    fn test_json() -> Fallible<()> {
        let mut record = record()?;
        record.set_annotation(1, Annotation::from_fields("Alice", "0042"));
        let json = serde_json::to_value(&record)?;
        assert_eq!(json["createdAt"], "2025-01-02 03:04:05");
        assert_eq!(json["groups"][4]["high"], 20);
        assert_eq!(json["annotations"][0], serde_json::Value::Null);
        assert_eq!(json["annotations"][1]["cardId"], "0042");
        Ok(())
    }
}
