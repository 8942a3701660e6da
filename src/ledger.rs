//! Durable reply ledger.
//!
//! Single source of truth for which items have already been answered.
//! The whole ledger is mirrored in memory with a hash index on the item id;
//! every append rewrites the backing CSV through a temp file and an atomic
//! rename before returning, so a crash never leaves a half-written row.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::LedgerEntry;

/// Column names, always written as row 0.
pub const HEADER: [&str; 10] = [
    "user_name",
    "domain",
    "reply_tweet_id",
    "id_str",
    "created_at",
    "favorite_count",
    "reply_count",
    "retweet_count",
    "quote_count",
    "full_text",
];

/// Ledger backend. Owns the in-memory mirror and the file it is persisted to.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    entries: Vec<LedgerEntry>,
    /// id_str -> position in `entries`.
    index: HashMap<String, usize>,
}

impl Ledger {
    /// Load the ledger at `path`, creating an empty one if it does not exist.
    ///
    /// Row 0 is skipped only when it is the header; files written without a
    /// header keep their first entry.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut ledger = Self {
            path,
            entries: Vec::new(),
            index: HashMap::new(),
        };

        if !ledger.path.exists() {
            ledger.persist()?;
            info!(path = %ledger.path.display(), "created empty ledger");
            return Ok(ledger);
        }

        let file = File::open(&ledger.path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);

        for (row, record) in reader.records().enumerate() {
            let record = record?;
            if row == 0 && record.iter().eq(HEADER.iter().copied()) {
                continue;
            }
            if record.len() != HEADER.len() {
                return Err(Error::Format(format!(
                    "{} row {row}: expected {} fields, found {}",
                    ledger.path.display(),
                    HEADER.len(),
                    record.len()
                )));
            }
            let entry: LedgerEntry = record.deserialize(None)?;
            if ledger.index.contains_key(&entry.id_str) {
                return Err(Error::Format(format!(
                    "{} row {row}: duplicate item id {}",
                    ledger.path.display(),
                    entry.id_str
                )));
            }
            ledger.index.insert(entry.id_str.clone(), ledger.entries.len());
            ledger.entries.push(entry);
        }

        info!(
            path = %ledger.path.display(),
            entries = ledger.entries.len(),
            "ledger loaded"
        );
        Ok(ledger)
    }

    /// Has a reply already been recorded for this item id?
    pub fn exists(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Look up the entry for an item id.
    pub fn get(&self, id: &str) -> Option<&LedgerEntry> {
        self.index.get(id).map(|&pos| &self.entries[pos])
    }

    /// Record a reply and flush it to disk.
    ///
    /// Either the entry is durable and visible to [`Ledger::exists`], or an
    /// error is returned and neither the mirror nor the file contain it.
    pub fn append(&mut self, entry: LedgerEntry) -> Result<()> {
        if self.exists(&entry.id_str) {
            return Err(Error::Other(format!(
                "item {} is already in the ledger",
                entry.id_str
            )));
        }

        let id = entry.id_str.clone();
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push(entry);

        if let Err(e) = self.persist() {
            self.entries.pop();
            self.index.remove(&id);
            return Err(e);
        }

        debug!(id = %id, entries = self.entries.len(), "ledger entry appended");
        Ok(())
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write header + mirror to a temp file beside the ledger, fsync, rename.
    fn persist(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(tmp.as_file_mut());
            writer.write_record(HEADER)?;
            for entry in &self.entries {
                writer.serialize(entry)?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        // Make the rename itself durable.
        if let Ok(d) = File::open(dir) {
            d.sync_all().ok();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str) -> LedgerEntry {
        LedgerEntry {
            user_name: "alice".into(),
            domain: "example.com".into(),
            reply_tweet_id: format!("reply-{id}"),
            id_str: id.into(),
            created_at: "Mon Jan 02 15:04:05 +0000 2006".into(),
            favorite_count: "0".into(),
            reply_count: "0".into(),
            retweet_count: "0".into(),
            quote_count: "0".into(),
            full_text: "hello, \"world\"\nsecond line".into(),
        }
    }

    #[test]
    fn missing_file_is_created_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posted.csv");

        let ledger = Ledger::open(&path).unwrap();
        assert!(ledger.is_empty());

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), HEADER.join(","));
    }

    #[test]
    fn append_is_visible_and_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posted.csv");

        let mut ledger = Ledger::open(&path).unwrap();
        ledger.append(entry("1")).unwrap();
        assert!(ledger.exists("1"));
        assert!(!ledger.exists("2"));

        let reloaded = Ledger::open(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get("1"), Some(&entry("1")));
    }

    #[test]
    fn duplicate_append_is_rejected_without_touching_storage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posted.csv");

        let mut ledger = Ledger::open(&path).unwrap();
        ledger.append(entry("1")).unwrap();
        let before = std::fs::read(&path).unwrap();

        assert!(ledger.append(entry("1")).is_err());
        assert_eq!(ledger.len(), 1);
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn failed_write_rolls_back_mirror() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posted.csv");
        let mut ledger = Ledger::open(&path).unwrap();

        dir.close().unwrap();

        assert!(ledger.append(entry("1")).is_err());
        assert!(!ledger.exists("1"));
        assert!(ledger.is_empty());
    }
}
