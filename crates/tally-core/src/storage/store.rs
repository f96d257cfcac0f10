//! Generic file-backed entity store
//!
//! A [`Store`] owns every record of one entity type, allocates ids, tracks
//! whether the in-memory state has diverged from disk, and persists through
//! the record reader/writer against one flat file per type.
//!
//! The store assumes exclusive access: one process, one session, no interior
//! locking. Saves replace the backing file atomically (write to a temp file,
//! fsync, rename), so a crash mid-save leaves the previous file intact.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use tracing::{debug, info};

use super::codec::{unescape, DELIMITER};
use super::error::{DecodeError, EncodeError, StoreError, StoreResult};
use super::migration::{run_chain, Migration, RawRecord};
use super::record::{RecordReader, RecordWriter};

/// An entity type that can live in a [`Store`]
///
/// Implementations fix the on-disk field order: `write_fields` and
/// `read_fields` must visit the same fields in the same order, so that a
/// written record reads back equal.
pub trait Record: Sized {
    /// Schema version written in the file header
    const FILE_VERSION: u32;

    fn id(&self) -> u64;

    fn set_id(&mut self, id: u64);

    fn write_fields(&self, writer: &mut RecordWriter) -> Result<(), EncodeError>;

    fn read_fields(reader: &mut RecordReader) -> Result<Self, DecodeError>;

    /// Version steps for files older than [`Self::FILE_VERSION`]
    fn migrations() -> &'static [Migration] {
        &[]
    }
}

/// In-memory, file-backed collection of one entity type
#[derive(Debug)]
pub struct Store<T: Record> {
    records: Vec<T>,
    next_id: u64,
    changed: bool,
}

impl<T: Record> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Store<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
            changed: false,
        }
    }

    /// Load a store from its backing file
    ///
    /// A missing file is an empty store, not an error. A file older than
    /// [`Record::FILE_VERSION`] is migrated in memory first; the store is
    /// then marked changed so the next save rewrites it in current shape.
    /// Any malformed line aborts the whole load.
    pub fn load(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            debug!("no data file at {:?}, starting empty", path);
            return Ok(Self::new());
        }

        let content =
            fs::read_to_string(path).map_err(|e| StoreError::io("read", path, e))?;

        let mut version = T::FILE_VERSION;
        let mut header_allowed = true;
        let mut rows: Vec<RawRecord> = Vec::new();
        let mut line_numbers: Vec<usize> = Vec::new();

        for (index, line) in content.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }

            // only the first non-empty line may be a version marker
            if header_allowed {
                header_allowed = false;
                if let Some(found) = parse_version_marker(line) {
                    version = found;
                    continue;
                }
            }

            rows.push(line.split(DELIMITER).map(unescape).collect());
            line_numbers.push(index + 1);
        }

        let (rows, migrated) = run_chain(rows, version, T::FILE_VERSION, T::migrations())?;

        let mut records = Vec::with_capacity(rows.len());
        let mut next_id = 1;

        for (index, row) in rows.into_iter().enumerate() {
            let mut reader = RecordReader::from_parts(row);
            let record = T::read_fields(&mut reader).map_err(|source| StoreError::Load {
                path: path.to_path_buf(),
                line: line_numbers.get(index).copied().unwrap_or(index + 1),
                source,
            })?;

            next_id = next_id.max(record.id() + 1);
            records.push(record);
        }

        debug!("loaded {} records from {:?}", records.len(), path);

        Ok(Self {
            records,
            next_id,
            changed: migrated,
        })
    }

    /// Persist the store if it has changed
    ///
    /// Serializes every record, one line each, behind a version header, and
    /// atomically replaces the backing file. The changed flag is cleared only
    /// on success; a failed save leaves it set so a retry is possible.
    pub fn save(&mut self, path: &Path) -> StoreResult<()> {
        if !self.changed {
            debug!("{:?} unchanged, skipping save", path);
            return Ok(());
        }

        let mut content = format!("v{}\n", T::FILE_VERSION);
        for record in &self.records {
            let mut writer = RecordWriter::new();
            record.write_fields(&mut writer)?;
            content.push_str(&writer.to_line());
            content.push('\n');
        }

        atomic_write(path, content.as_bytes())?;
        self.changed = false;

        info!("saved {} records to {:?}", self.records.len(), path);
        Ok(())
    }

    /// Insert a new record, assigning it the next free id
    ///
    /// Ids grow monotonically and are never reused, deletions included.
    pub fn add(&mut self, mut record: T) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        record.set_id(id);
        self.records.push(record);
        self.changed = true;

        id
    }

    /// Copy of the record with the given id
    pub fn get(&self, id: u64) -> StoreResult<T>
    where
        T: Clone,
    {
        self.records
            .iter()
            .find(|r| r.id() == id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    /// Whether a record with the given id is present
    pub fn exists(&self, id: u64) -> bool {
        self.records.iter().any(|r| r.id() == id)
    }

    /// Replace the stored record carrying the same id
    pub fn edit(&mut self, record: T) -> StoreResult<()> {
        let id = record.id();
        let position = self
            .records
            .iter()
            .position(|r| r.id() == id)
            .ok_or(StoreError::NotFound { id })?;

        self.records[position] = record;
        self.changed = true;
        Ok(())
    }

    /// Remove the record with the given id
    ///
    /// The id stays retired; it is never handed out again.
    pub fn delete(&mut self, id: u64) -> StoreResult<()> {
        let position = self
            .records
            .iter()
            .position(|r| r.id() == id)
            .ok_or(StoreError::NotFound { id })?;

        self.records.remove(position);
        self.changed = true;
        Ok(())
    }

    /// All live records, in insertion order
    pub fn all(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the in-memory state differs from the last-persisted state
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Force the changed flag, for callers that mutate records in place
    pub fn set_changed(&mut self) {
        self.changed = true;
    }
}

/// Parse a `v<N>` header line; anything else is a record line
fn parse_version_marker(line: &str) -> Option<u32> {
    let digits = line.strip_prefix('v')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Write data to a file atomically
///
/// Writes to a `.tmp` sibling, syncs it, then renames over the target, so the
/// target is never left partially written.
fn atomic_write(path: &Path, data: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io("create directory", parent, e))?;
        }
    }

    let temp_path = path.with_extension("tmp");

    let mut file =
        File::create(&temp_path).map_err(|e| StoreError::io("create", &temp_path, e))?;
    file.write_all(data)
        .map_err(|e| StoreError::io("write", &temp_path, e))?;
    file.sync_all()
        .map_err(|e| StoreError::io("sync", &temp_path, e))?;

    fs::rename(&temp_path, path).map_err(|e| StoreError::io("rename", &temp_path, e))?;

    Ok(())
}
