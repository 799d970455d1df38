//! CSV record store
//!
//! Every append reads the whole file, adds one row at the end, and replaces the
//! file through a temporary sibling plus rename. Readers therefore always see
//! either the previous file or the new one, never a half-written row. Existing
//! rows are carried over as text, unchanged.
//!
//! There is no locking: two processes appending to the same file at once can
//! lose one of the rows.

use std::fs::{File, Permissions};
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::error::{Error, Result, StoreError};
use crate::types::{RECORD_HEADER, ResolvedRecord};

/// Append-only ledger of lookups backed by a CSV file
#[derive(Clone, Debug)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    /// Store backed by the file at `path` (created on first append)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `record` after all existing rows
    ///
    /// A missing file counts as an empty store. Any other read problem
    /// (permissions, malformed CSV, foreign header) is returned and the file
    /// is left as it was.
    pub fn append(&self, record: &ResolvedRecord) -> Result<()> {
        let mut rows = self.read_rows()?;
        let existing = rows.len();
        rows.push(StringRecord::from(record.to_row().to_vec()));

        self.replace_with(&rows)?;

        tracing::debug!(
            path = %self.path.display(),
            rows = existing + 1,
            code = %record.code,
            "Appended record"
        );
        Ok(())
    }

    /// Read every stored record in file order
    pub fn load(&self) -> Result<Vec<ResolvedRecord>> {
        let Some(file) = self.open_existing()? else {
            return Ok(Vec::new());
        };
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
        self.check_header(&mut reader)?;

        let mut records = Vec::new();
        for result in reader.deserialize::<ResolvedRecord>() {
            records.push(result?);
        }
        Ok(records)
    }

    /// Existing data rows as raw text, header excluded
    fn read_rows(&self) -> Result<Vec<StringRecord>> {
        let Some(file) = self.open_existing()? else {
            return Ok(Vec::new());
        };
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
        if !self.check_header(&mut reader)? {
            return Ok(Vec::new());
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            rows.push(result?);
        }
        Ok(rows)
    }

    /// Open the backing file, or `None` when it does not exist yet
    fn open_existing(&self) -> Result<Option<File>> {
        match File::open(&self.path) {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Verify the header row; `Ok(false)` means the file is empty
    fn check_header(&self, reader: &mut csv::Reader<File>) -> Result<bool> {
        let header = reader.headers()?;
        if header.is_empty() {
            return Ok(false);
        }
        if header.iter().ne(RECORD_HEADER) {
            return Err(StoreError::HeaderMismatch {
                path: self.path.clone(),
                found: header.iter().map(str::to_string).collect(),
            }
            .into());
        }
        Ok(true)
    }

    /// Permissions of the current file, or `None` when it does not exist yet
    fn existing_permissions(&self) -> Result<Option<Permissions>> {
        match std::fs::metadata(&self.path) {
            Ok(metadata) => Ok(Some(metadata.permissions())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Write header plus `rows` to a temporary sibling, then rename it over the store
    ///
    /// The replacement keeps the mode of the file it replaces. A new file gets
    /// the same mode a plain create would give it (0666 minus the umask) rather
    /// than the private 0600 of a temporary file.
    fn replace_with(&self, rows: &[StringRecord]) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let existing = self.existing_permissions()?;
        let mut builder = tempfile::Builder::new();
        #[cfg(unix)]
        if existing.is_none() {
            use std::os::unix::fs::PermissionsExt;
            // open(2) masks this with the umask
            builder.permissions(Permissions::from_mode(0o666));
        }
        let mut temp = builder.tempfile_in(&dir)?;
        {
            let mut writer = WriterBuilder::new().from_writer(temp.as_file_mut());
            writer.write_record(RECORD_HEADER)?;
            for row in rows {
                writer.write_record(row)?;
            }
            writer.flush()?;
        }
        temp.as_file_mut().flush()?;
        if let Some(permissions) = existing {
            temp.as_file().set_permissions(permissions)?;
        }
        temp.as_file().sync_all()?;

        temp.persist(&self.path).map_err(|e| StoreError::Persist {
            path: self.path.clone(),
            source: e.error,
        })?;
        Ok(())
    }
}
