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

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fs::File;
use std::fs::create_dir_all;
use std::fs::remove_file;
use std::fs::rename;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::table::Layout;
use crate::table::is_storable;
use crate::table::read_table;
use crate::table::write_table;
use crate::types::pair::GROUP_COUNT;
use crate::types::record::Annotation;
use crate::types::record::DrawRecord;

#[derive(Debug)]
pub enum StoreError {
    /// The history file exists but could not be read.
    PersistenceRead { path: PathBuf, cause: ErrorReport },
    /// The history file could not be written.
    PersistenceWrite { path: PathBuf, cause: ErrorReport },
    /// An annotation targeted a record or group that doesn't exist.
    IndexOutOfRange {
        record_index: usize,
        group_index: usize,
        record_count: usize,
    },
    /// A name or card id contains a character the table can't hold.
    InvalidField { field: &'static str, value: String },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::PersistenceRead { path, cause } => {
                write!(
                    f,
                    "failed to read history from {}: {}",
                    path.display(),
                    cause.message()
                )
            }
            StoreError::PersistenceWrite { path, cause } => {
                write!(
                    f,
                    "failed to write history to {}: {}",
                    path.display(),
                    cause.message()
                )
            }
            StoreError::IndexOutOfRange {
                record_index,
                group_index,
                record_count,
            } => write!(
                f,
                "no group {group_index} in record {record_index} (there are {record_count} records and {GROUP_COUNT} groups)."
            ),
            StoreError::InvalidField { field, value } => write!(
                f,
                "{field} {value:?} contains a comma or a line break, which the history file can't store."
            ),
        }
    }
}

impl Error for StoreError {}

/// The history of every draw, oldest first. Every mutation rewrites the
/// whole history file.
pub struct RecordStore {
    path: PathBuf,
    history: Vec<DrawRecord>,
}

impl RecordStore {
    /// Open the history stored at `path`. A missing or unreadable file gives
    /// an empty history.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let history = Self::load(&path);
        Self { path, history }
    }

    /// Read the history file at `path`.
    pub fn load(path: &Path) -> Vec<DrawRecord> {
        match try_load(path) {
            Ok(history) => {
                log::debug!("Loaded {} records from {}.", history.len(), path.display());
                history
            }
            Err(e) => {
                log::error!("{e}");
                Vec::new()
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every record, oldest first.
    pub fn all(&self) -> &[DrawRecord] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// The index of the most recent record.
    pub fn latest_index(&self) -> Option<usize> {
        self.history.len().checked_sub(1)
    }

    /// Add a record to the end of the history and persist it. Returns the
    /// index of the new record. A failed write is logged and the record is
    /// kept in memory.
    pub fn append(&mut self, record: DrawRecord) -> usize {
        self.history.push(record);
        self.persist();
        self.history.len() - 1
    }

    /// Set the claimant of one group of one record, replacing any previous
    /// claimant, and persist the history. Blank `name` and `card_id` clear
    /// the claimant. Fields containing a comma or a line break are rejected
    /// without changing anything.
    pub fn annotate(
        &mut self,
        record_index: usize,
        group_index: usize,
        name: &str,
        card_id: &str,
    ) -> Result<(), StoreError> {
        let record_count = self.history.len();
        let record = match self.history.get_mut(record_index) {
            Some(record) if group_index < GROUP_COUNT => record,
            _ => {
                return Err(StoreError::IndexOutOfRange {
                    record_index,
                    group_index,
                    record_count,
                });
            }
        };
        for (field, value) in [("name", name), ("card id", card_id)] {
            if !is_storable(value) {
                return Err(StoreError::InvalidField {
                    field,
                    value: value.to_string(),
                });
            }
        }
        record.set_annotation(group_index, Annotation::from_fields(name, card_id));
        self.persist();
        Ok(())
    }

    fn persist(&self) {
        match self.save() {
            Ok(()) => log::debug!(
                "Saved {} records to {}.",
                self.history.len(),
                self.path.display()
            ),
            Err(e) => log::error!("{e}"),
        }
    }

    /// Write the whole history to a temporary file next to the history file,
    /// then move it into place.
    fn save(&self) -> Result<(), StoreError> {
        let write = || -> Fallible<()> {
            if let Some(parent) = self.path.parent() {
                if !parent.as_os_str().is_empty() {
                    create_dir_all(parent)?;
                }
            }
            let tmp_path = tmp_path(&self.path);
            let result = File::create(&tmp_path)
                .map_err(ErrorReport::from)
                .and_then(|file| write_table(BufWriter::new(file), &self.history, Layout::Full))
                .and_then(|()| rename(&tmp_path, &self.path).map_err(ErrorReport::from));
            if result.is_err() && tmp_path.exists() {
                if let Err(e) = remove_file(&tmp_path) {
                    log::warn!("Failed to remove {}: {e}", tmp_path.display());
                }
            }
            result
        };
        write().map_err(|cause| StoreError::PersistenceWrite {
            path: self.path.clone(),
            cause,
        })
    }
}

fn try_load(path: &Path) -> Result<Vec<DrawRecord>, StoreError> {
    let read = || -> Fallible<Vec<DrawRecord>> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No history at {}.", path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        read_table(BufReader::new(file))
    };
    read().map_err(|cause| StoreError::PersistenceRead {
        path: path.to_path_buf(),
        cause,
    })
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;
    use crate::draw::DrawEngine;
    use crate::types::timestamp::Timestamp;

    fn new_record(engine: &mut DrawEngine, second: u32) -> Fallible<DrawRecord> {
        let time = format!("10:00:{second:02}");
        Ok(DrawRecord::new(
            Timestamp::parse("2025-02-03", &time)?,
            engine.draw(),
        ))
    }

    #[test]
    fn test_missing_file_is_empty() -> Fallible<()> {
        let dir = tempdir()?;
        let store = RecordStore::open(dir.path().join("history.csv"));
        assert!(store.is_empty());
        assert_eq!(store.latest_index(), None);
        Ok(())
    }

    #[test]
    fn test_append_then_reload() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data").join("history.csv");
        let mut engine = DrawEngine::seeded(1);
        let mut store = RecordStore::open(&path);
        let mut appended = Vec::new();
        for second in 0..5 {
            let record = new_record(&mut engine, second)?;
            appended.push(record.clone());
            assert_eq!(store.append(record), second as usize);
        }
        assert!(path.exists());
        assert!(!tmp_path(&path).exists());

        let reloaded = RecordStore::open(&path);
        assert_eq!(reloaded.all(), appended.as_slice());
        assert!(
            reloaded
                .all()
                .iter()
                .all(|r| r.annotations().iter().all(Option::is_none))
        );
        Ok(())
    }

    #[test]
    fn test_annotate_overwrites() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("history.csv");
        let mut engine = DrawEngine::seeded(2);
        let mut store = RecordStore::open(&path);
        store.append(new_record(&mut engine, 0)?);
        store.append(new_record(&mut engine, 1)?);

        store.annotate(1, 3, "A", "1")?;
        store.annotate(1, 3, "B", "2")?;

        let reloaded = RecordStore::open(&path);
        assert_eq!(reloaded.all(), store.all());
        let record = &reloaded.all()[1];
        let annotation = record.annotation(3).unwrap();
        assert_eq!((annotation.name.as_str(), annotation.card_id.as_str()), ("B", "2"));
        for group in [0, 1, 2, 4] {
            assert_eq!(record.annotation(group), None);
        }
        assert!(
            reloaded.all()[0]
                .annotations()
                .iter()
                .all(Option::is_none)
        );
        Ok(())
    }

    #[test]
    fn test_blank_annotation_clears() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("history.csv");
        let mut store = RecordStore::open(&path);
        store.append(new_record(&mut DrawEngine::seeded(3), 0)?);
        store.annotate(0, 0, "Alice", "0042")?;
        store.annotate(0, 0, "", "")?;
        assert_eq!(store.all()[0].annotation(0), None);
        assert_eq!(RecordStore::open(&path).all(), store.all());
        Ok(())
    }

    #[test]
    fn test_annotate_out_of_range() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("history.csv");
        let mut store = RecordStore::open(&path);

        let result = store.annotate(0, 0, "A", "1");
        assert!(matches!(
            result,
            Err(StoreError::IndexOutOfRange { record_index: 0, .. })
        ));
        assert!(!path.exists());

        store.append(new_record(&mut DrawEngine::seeded(4), 0)?);
        let before = read_to_string(&path)?;
        assert!(matches!(
            store.annotate(1, 0, "A", "1"),
            Err(StoreError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            store.annotate(0, GROUP_COUNT, "A", "1"),
            Err(StoreError::IndexOutOfRange { group_index: 5, .. })
        ));
        assert_eq!(read_to_string(&path)?, before);
        assert_eq!(store.all()[0].annotation(0), None);
        Ok(())
    }

    #[test]
    fn test_header_malformed_and_valid_row() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("history.csv");
        let content = "日期,时间,第一组,姓名,卡号,第二组,姓名,卡号,第三组,姓名,卡号,第四组,姓名,卡号,第五组,姓名,卡号\n\
                       2024-05-05,09:00:00,1-2,x,1\n\
                       2024-05-06,09:30:15,3-4,,,6-7,Zed,99,9-12,,,15-16,,,17-20,,\n";
        write(&path, content)?;
        let store = RecordStore::open(&path);
        assert_eq!(store.len(), 1);
        let record = &store.all()[0];
        assert_eq!(record.created_at().date(), "2024-05-06");
        assert_eq!(record.created_at().time(), "09:30:15");
        let pairs: Vec<String> = record.groups().iter().map(|p| p.to_string()).collect();
        assert_eq!(pairs, vec!["3-4", "6-7", "9-12", "15-16", "17-20"]);
        assert_eq!(record.annotation(1).unwrap().name, "Zed");
        Ok(())
    }

    #[test]
    fn test_unreadable_history_is_empty() -> Fallible<()> {
        let dir = tempdir()?;
        // Opening a directory may succeed, but reading it as a table fails.
        let store = RecordStore::open(dir.path());
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn test_write_failure_keeps_mutation() -> Fallible<()> {
        let dir = tempdir()?;
        let blocker = dir.path().join("blocker");
        write(&blocker, "not a directory")?;
        let path = blocker.join("history.csv");
        let mut store = RecordStore::open(&path);
        let index = store.append(new_record(&mut DrawEngine::seeded(5), 0)?);
        assert_eq!(index, 0);
        assert_eq!(store.len(), 1);
        store.annotate(0, 2, "Alice", "0042")?;
        assert_eq!(store.all()[0].annotation(2).unwrap().name, "Alice");
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_line_breaks_and_commas_are_rejected() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("history.csv");
        let mut engine = DrawEngine::seeded(6);
        let mut store = RecordStore::open(&path);
        store.append(new_record(&mut engine, 0)?);
        store.append(new_record(&mut engine, 1)?);
        let before = read_to_string(&path)?;

        for (name, card_id) in [
            ("Alice\nSmith", "0042"),
            ("Alice\rSmith", "0042"),
            ("Smith, Alice", "0042"),
            ("Alice", "00\n42"),
        ] {
            assert!(matches!(
                store.annotate(0, 2, name, card_id),
                Err(StoreError::InvalidField { .. })
            ));
        }
        assert_eq!(store.all()[0].annotation(2), None);
        assert_eq!(read_to_string(&path)?, before);

        let mut reloaded = RecordStore::open(&path);
        assert_eq!(reloaded.all(), store.all());
        reloaded.append(new_record(&mut engine, 2)?);
        assert_eq!(RecordStore::open(&path).len(), 3);
        Ok(())
    }

    #[test]
    fn test_failed_write_leaves_no_temporary_file() -> Fallible<()> {
        let dir = tempdir()?;
        // The history path is a directory, so the final rename fails.
        let path = dir.path().join("history.csv");
        std::fs::create_dir(&path)?;
        let mut store = RecordStore {
            path: path.clone(),
            history: Vec::new(),
        };
        store.append(new_record(&mut DrawEngine::seeded(7), 0)?);
        assert_eq!(store.len(), 1);
        assert!(path.is_dir());
        assert!(!tmp_path(&path).exists());
        Ok(())
    }

    #[test]
    fn test_error_messages() {
        let err = StoreError::IndexOutOfRange {
            record_index: 4,
            group_index: 1,
            record_count: 2,
        };
        assert_eq!(
            err.to_string(),
            "no group 1 in record 4 (there are 2 records and 5 groups)."
        );
    }
}
