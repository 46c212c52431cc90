//! Newline-delimited JSON file store.

use crate::error::StoreError;
use crate::traits::{Records, Store};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Read mode for handling a truncated final record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// Strict mode: a truncated final record is an error.
    #[default]
    Strict,
    /// Permissive mode: a truncated final record is treated as end-of-file.
    Permissive,
}

/// Options for appending records.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Whether to fsync after each append (default: false).
    pub sync: bool,
    /// Whether to create the file if it doesn't exist (default: true).
    pub create: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            sync: false,
            create: true,
        }
    }
}

/// Records stored one JSON object per line.
///
/// Every enumeration reopens the file, so records appended between queries
/// are visible to the next query. A line counts as truncated when it is the
/// last one, lacks its terminating newline, and its JSON ends before the
/// value does. Any other decode failure is [`StoreError::Json`] in both read
/// modes.
///
/// # Example
///
/// ```rust,no_run
/// use serde::{Deserialize, Serialize};
/// use sift_store::{JsonlStore, ReadMode, Store};
///
/// #[derive(Serialize, Deserialize)]
/// struct Account {
///     balance: i64,
///     tier: String,
/// }
///
/// let store = JsonlStore::<Account>::new("accounts.jsonl", ReadMode::Strict);
/// store.append(&Account { balance: 50, tier: "free".into() })?;
/// for record in store.for_each()? {
///     println!("balance: {}", record?.balance);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct JsonlStore<T> {
    path: PathBuf,
    mode: ReadMode,
    options: WriteOptions,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonlStore<T> {
    /// Creates a store over the file at `path`; no I/O happens until first use.
    pub fn new<P: AsRef<Path>>(path: P, mode: ReadMode) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            mode,
            options: WriteOptions::default(),
            _record: PhantomData,
        }
    }

    /// Replaces the write options.
    pub fn with_write_options(mut self, options: WriteOptions) -> Self {
        self.options = options;
        self
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T: Serialize> JsonlStore<T> {
    /// Appends one record as a JSON line.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if:
    /// - The file cannot be opened (or is missing and `create` is false)
    /// - The record cannot be encoded
    /// - I/O error occurs
    pub fn append(&self, record: &T) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(record).map_err(StoreError::Encode)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(self.options.create)
            .append(true)
            .open(&self.path)?;
        file.write_all(&line)?;
        file.flush()?;

        if self.options.sync {
            file.sync_all()?;
        }

        Ok(())
    }
}

impl<T> Store<T> for JsonlStore<T>
where
    T: DeserializeOwned + 'static,
{
    fn for_each(&self) -> Result<Records<'_, T>, StoreError> {
        let file = File::open(&self.path)?;
        Ok(Box::new(JsonlRecords::new(file, self.mode)))
    }
}

/// Lazy decoder over the lines of a [`JsonlStore`] file.
///
/// Stops for good after the first error.
pub struct JsonlRecords<T> {
    reader: BufReader<File>,
    mode: ReadMode,
    line: u64,
    done: bool,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonlRecords<T> {
    fn new(file: File, mode: ReadMode) -> Self {
        Self {
            reader: BufReader::new(file),
            mode,
            line: 0,
            done: false,
            _record: PhantomData,
        }
    }

    fn fail(&mut self, error: StoreError) -> Option<Result<T, StoreError>> {
        self.done = true;
        Some(Err(error))
    }
}

impl<T: DeserializeOwned> Iterator for JsonlRecords<T> {
    type Item = Result<T, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut buf = String::new();
        loop {
            buf.clear();
            match self.reader.read_line(&mut buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(e) => return self.fail(e.into()),
            }
            self.line += 1;

            let text = buf.trim();
            if text.is_empty() {
                continue;
            }

            return match serde_json::from_str::<T>(text) {
                Ok(record) => Some(Ok(record)),
                Err(source) if source.is_eof() && !buf.ends_with('\n') => match self.mode {
                    ReadMode::Strict => self.fail(StoreError::Truncated { line: self.line }),
                    ReadMode::Permissive => {
                        warn!(line = self.line, "dropping truncated trailing record");
                        self.done = true;
                        None
                    }
                },
                Err(source) => self.fail(StoreError::Json {
                    line: self.line,
                    source,
                }),
            };
        }
    }
}
