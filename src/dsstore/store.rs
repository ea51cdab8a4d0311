//! Scoped, editable handle on a `.DS_Store` file.
//!
//! [`DsStore`] owns the open file and an in-memory copy of every record.
//! Mutations only touch memory; [`DsStore::commit`] lays out a fresh file and
//! replaces the previous contents. Dropping a handle with uncommitted
//! changes commits them, and [`with_store`] wraps the whole open, edit and
//! close sequence so the close step runs on every exit path.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::consts::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE};
use super::error::{DsStoreError, Result};
use super::file::DsStoreFile;
use super::record::{FourCC, Record, RecordKey, RecordValue, fourcc_to_string};
use super::writer::StoreWriter;

/// How a store file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// The file must exist; edits are rejected.
    Read,
    /// Load the file when it exists, otherwise start empty. The file is
    /// created on open.
    ReadWrite,
    /// Start empty, discarding any existing records.
    Create,
}

impl OpenMode {
    fn is_writable(self) -> bool {
        !matches!(self, OpenMode::Read)
    }
}

/// An open record store.
#[derive(Debug)]
pub struct DsStore {
    path: PathBuf,
    mode: OpenMode,
    file: Option<File>,
    page_size: usize,
    records: BTreeMap<RecordKey, RecordValue>,
    dirty: bool,
}

impl DsStore {
    /// Open the store at `path`.
    ///
    /// The directory containing `path` must already exist; it is never
    /// created. In the writable modes the file itself is created if missing,
    /// so permission problems surface here rather than at commit time.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !parent.is_dir() {
            return Err(DsStoreError::TargetMissing(parent));
        }

        let mut file = match mode {
            OpenMode::Read => File::open(&path)?,
            OpenMode::ReadWrite | OpenMode::Create => OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(&path)?,
        };

        let mut records = BTreeMap::new();
        let mut page_size = DEFAULT_PAGE_SIZE;
        let mut existing = Vec::new();
        if mode != OpenMode::Create {
            file.read_to_end(&mut existing)?;
        }
        if !existing.is_empty() {
            let parsed = DsStoreFile::parse(&existing)?;
            let stored = parsed.tree_info().page_size as usize;
            if stored.is_power_of_two() && (MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&stored) {
                page_size = stored;
            } else {
                warn!(
                    path = %path.display(),
                    page_size = stored,
                    "ignoring unusable page size"
                );
            }
            for record in parsed.into_records() {
                records.insert(record.key(), record.value);
            }
        } else if mode == OpenMode::Read {
            return Err(DsStoreError::NotDsStore);
        }

        info!(
            path = %path.display(),
            ?mode,
            records = records.len(),
            "opened .DS_Store"
        );

        Ok(Self {
            path,
            mode,
            file: Some(file),
            page_size,
            records,
            // A fresh or truncated store is written out even if nothing is set.
            dirty: mode.is_writable() && existing.is_empty(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Set a record, returning the value it replaced.
    ///
    /// Setting a key that already exists overwrites it.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        code: FourCC,
        value: impl Into<RecordValue>,
    ) -> Result<Option<RecordValue>> {
        if !self.mode.is_writable() {
            return Err(DsStoreError::ReadOnly);
        }
        let key = RecordKey::new(name, code);
        let value = value.into();
        debug!(
            entry = key.name(),
            code = %fourcc_to_string(&code),
            kind = %fourcc_to_string(&value.type_tag()),
            "set record"
        );
        self.dirty = true;
        Ok(self.records.insert(key, value))
    }

    pub fn get(&self, name: &str, code: FourCC) -> Option<&RecordValue> {
        self.records.get(&RecordKey::new(name, code))
    }

    pub fn remove(&mut self, name: &str, code: FourCC) -> Result<Option<RecordValue>> {
        if !self.mode.is_writable() {
            return Err(DsStoreError::ReadOnly);
        }
        let removed = self.records.remove(&RecordKey::new(name, code));
        if removed.is_some() {
            self.dirty = true;
        }
        Ok(removed)
    }

    /// Records in on-disk order.
    pub fn records(&self) -> impl Iterator<Item = (&RecordKey, &RecordValue)> {
        self.records.iter()
    }

    /// Every record for one entry name.
    pub fn entry(&self, name: &str) -> Vec<(FourCC, &RecordValue)> {
        self.records
            .iter()
            .filter(|(key, _)| key.name() == name)
            .map(|(key, value)| (key.code(), value))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether there are edits not yet written to disk.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write all records to disk, replacing the file contents.
    ///
    /// Does nothing when the store is read-only or unchanged.
    pub fn commit(&mut self) -> Result<()> {
        if !self.dirty || !self.mode.is_writable() {
            return Ok(());
        }
        let Some(file) = self.file.as_mut() else {
            return Ok(());
        };

        let mut writer = StoreWriter::with_page_size(self.page_size);
        writer.extend_unique(
            self.records
                .iter()
                .map(|(key, value)| Record::new(key.name(), key.code(), value.clone())),
        );
        let bytes = writer.to_bytes()?;

        file.seek(SeekFrom::Start(0))?;
        file.write_all(&bytes)?;
        file.set_len(bytes.len() as u64)?;
        file.flush()?;
        file.sync_all()?;
        self.dirty = false;

        info!(
            path = %self.path.display(),
            records = self.records.len(),
            bytes = bytes.len(),
            "committed .DS_Store"
        );
        Ok(())
    }

    /// Commit and release the file.
    pub fn close(mut self) -> Result<()> {
        let result = self.commit();
        self.file = None;
        result
    }
}

impl Drop for DsStore {
    fn drop(&mut self) {
        if self.file.is_some() && self.dirty && self.mode.is_writable() {
            if let Err(err) = self.commit() {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "failed to commit .DS_Store on drop"
                );
            }
        }
    }
}

/// Open a store, run `f` against it and close it on every exit path.
///
/// If `f` fails, its error is returned and a close failure is only logged.
/// Otherwise a close failure is returned.
///
/// # Example
///
/// ```rust,no_run
/// use finder_layout::dsstore::{with_store, DsStoreError, OpenMode};
///
/// with_store("/Volumes/Installer/.DS_Store", OpenMode::ReadWrite, |store| {
///     store.set(".", *b"ICVO", true)?;
///     Ok::<_, DsStoreError>(())
/// })?;
/// # Ok::<(), DsStoreError>(())
/// ```
pub fn with_store<P, T, E, F>(path: P, mode: OpenMode, f: F) -> std::result::Result<T, E>
where
    P: AsRef<Path>,
    E: From<DsStoreError>,
    F: FnOnce(&mut DsStore) -> std::result::Result<T, E>,
{
    let mut store = DsStore::open(path, mode)?;
    let outcome = f(&mut store);
    let closed = store.close();
    match outcome {
        Ok(value) => {
            closed?;
            Ok(value)
        },
        Err(err) => {
            if let Err(close_err) = closed {
                warn!(error = %close_err, "closing .DS_Store after a failed edit also failed");
            }
            Err(err)
        },
    }
}
