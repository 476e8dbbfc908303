//! JSON file checkpoint with a `.chk` staging file.
//!
//! While a run is in progress the data lives in `<output>.NN_w.chk`. Only
//! [`finalize`](CheckpointSink::finalize) of a consistent checkpoint renames
//! the staging file to `<output>`; anything left under the `.chk` name is an
//! incomplete run and must not be trusted.

use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use num_complex::Complex64;
use tracing::{debug, info};

use crate::error::{CheckpointError, Result};
use crate::sink::{CheckpointSink, CheckpointStore};

/// Suffix of the staging file.
pub const STAGING_SUFFIX: &str = ".NN_w.chk";

/// Staging path for a final output path.
pub fn staging_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(STAGING_SUFFIX);
    PathBuf::from(name)
}

/// File-backed checkpoint serialized as JSON.
#[derive(Debug)]
pub struct JsonCheckpoint {
    output: PathBuf,
    staging: PathBuf,
    store: CheckpointStore,
    open: bool,
    finalized: bool,
}

impl JsonCheckpoint {
    /// Open (or resume) the staging checkpoint for `output`.
    ///
    /// An existing staging file from an interrupted run is loaded; the
    /// consistency flag is cleared until the new run sets it again.
    pub fn create(output: impl AsRef<Path>) -> Result<Self> {
        let output = output.as_ref().to_path_buf();
        let staging = staging_path(&output);
        let store = if staging.exists() {
            info!(path = %staging.display(), "resuming checkpoint");
            let reader = BufReader::new(fs::File::open(&staging)?);
            let mut store: CheckpointStore = serde_json::from_reader(reader)?;
            store.consistent = false;
            store
        } else {
            CheckpointStore::default()
        };
        let mut chk = Self {
            output,
            staging,
            store,
            open: true,
            finalized: false,
        };
        chk.flush()?;
        Ok(chk)
    }

    /// Load a finalized checkpoint for reading.
    pub fn load(path: impl AsRef<Path>) -> Result<CheckpointStore> {
        let reader = BufReader::new(fs::File::open(path.as_ref())?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    pub fn staging_path(&self) -> &Path {
        &self.staging
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    fn flush(&mut self) -> Result<()> {
        let writer = BufWriter::new(fs::File::create(&self.staging)?);
        serde_json::to_writer(writer, &self.store)?;
        debug!(path = %self.staging.display(), entries = self.store.entries.len(), "checkpoint flushed");
        Ok(())
    }

    fn writable(&self) -> Result<()> {
        if self.finalized {
            return Err(CheckpointError::Finalized);
        }
        if !self.open {
            return Err(CheckpointError::Closed);
        }
        Ok(())
    }
}

impl CheckpointSink for JsonCheckpoint {
    fn open(&mut self) -> Result<()> {
        if self.finalized {
            return Err(CheckpointError::Finalized);
        }
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.open {
            self.flush()?;
            self.open = false;
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn create_directory(&mut self, path: &str) -> Result<()> {
        self.writable()?;
        self.store.create_directory(path);
        Ok(())
    }

    fn set(&mut self, path: &str, values: &[Complex64]) -> Result<()> {
        self.writable()?;
        self.store.set(path, values)
    }

    fn get(&self, path: &str) -> Result<Option<Vec<Complex64>>> {
        Ok(self.store.get(path).map(<[Complex64]>::to_vec))
    }

    fn set_counter(&mut self, name: &str, value: u32) -> Result<()> {
        self.writable()?;
        self.store.counters.insert(name.to_string(), value);
        Ok(())
    }

    fn set_consistency(&mut self, consistent: bool) -> Result<()> {
        self.writable()?;
        self.store.consistent = consistent;
        Ok(())
    }

    fn is_consistent(&self) -> bool {
        self.store.consistent
    }

    fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Err(CheckpointError::Finalized);
        }
        if !self.store.consistent {
            return Err(CheckpointError::Inconsistent);
        }
        self.flush()?;
        self.open = false;
        fs::rename(&self.staging, &self.output)?;
        self.finalized = true;
        info!(path = %self.output.display(), "checkpoint finalized");
        Ok(())
    }
}
