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

use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;

use crate::error::Fallible;
use crate::store::RecordStore;
use crate::table::Layout;
use crate::table::write_table;

/// Write the whole history, oldest first, to `output`. The store is not
/// modified.
pub fn export_history<W: Write>(
    store: &RecordStore,
    output: &Path,
    layout: Layout,
    out: &mut W,
) -> Fallible<()> {
    log::debug!(
        "Exporting {} to {}.",
        store.path().display(),
        output.display()
    );
    let file = File::create(output)?;
    write_table(BufWriter::new(file), store.all(), layout)?;
    writeln!(
        out,
        "Exported {} draws to {}.",
        store.len(),
        output.display()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;

    const ROW: &str = "2025-06-01,12:30:00,1-3,Alice,0042,5-8,,,9-10,,,13-16,,,17-18,,";

    #[test]
    fn test_export_full_and_condensed() -> Fallible<()> {
        let dir = tempdir()?;
        let history = dir.path().join("history.csv");
        write(&history, format!("{ROW}\n"))?;
        let store = RecordStore::open(&history);
        let before = read_to_string(&history)?;

        let full = dir.path().join("full.csv");
        let condensed = dir.path().join("condensed.csv");
        let mut out = Vec::new();
        export_history(&store, &full, Layout::Full, &mut out)?;
        export_history(&store, &condensed, Layout::Condensed, &mut out)?;

        let full = read_to_string(&full)?;
        assert_eq!(full.lines().nth(1), Some(ROW));
        let condensed = read_to_string(&condensed)?;
        assert_eq!(
            condensed.lines().nth(1),
            Some("2025-06-01,12:30:00,1-3,5-8,9-10,13-16,17-18")
        );
        assert_eq!(read_to_string(&history)?, before);
        assert_eq!(RecordStore::open(dir.path().join("full.csv")).all(), store.all());
        Ok(())
    }

    #[test]
    fn test_export_to_missing_directory() -> Fallible<()> {
        let dir = tempdir()?;
        let store = RecordStore::open(dir.path().join("history.csv"));
        let output = dir.path().join("nope").join("out.csv");
        let mut out = Vec::new();
        assert!(export_history(&store, &output, Layout::Full, &mut out).is_err());
        Ok(())
    }
}
