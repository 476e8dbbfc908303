//! The checkpoint sink interface and the in-memory store behind it.

use std::collections::{BTreeMap, BTreeSet};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{CheckpointError, Result};

/// Key-value sink for timesliced correlators.
///
/// Paths are hierarchical, `/`-separated (`boost_px0py0pz0/ppcorr_...`).
/// An entry can only be written below a directory created with
/// [`create_directory`](Self::create_directory), and only while the sink is
/// open.
pub trait CheckpointSink {
    /// Open for writing. Opening an open sink is a no-op.
    fn open(&mut self) -> Result<()>;

    /// Flush and close. Closing a closed sink is a no-op.
    fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    fn create_directory(&mut self, path: &str) -> Result<()>;

    /// Write (or overwrite) one timesliced array.
    fn set(&mut self, path: &str, values: &[Complex64]) -> Result<()>;

    fn get(&self, path: &str) -> Result<Option<Vec<Complex64>>>;

    /// Bookkeeping counter, e.g. `mucurrent`.
    fn set_counter(&mut self, name: &str, value: u32) -> Result<()>;

    /// Mark whether the stored data forms a complete, trusted result.
    fn set_consistency(&mut self, consistent: bool) -> Result<()>;

    fn is_consistent(&self) -> bool;

    /// Close and publish the checkpoint under its final name. Only a
    /// consistent checkpoint can be finalized.
    fn finalize(&mut self) -> Result<()>;
}

/// Split `a/b/c` into (`a/b`, `c`); root entries have no parent.
pub(crate) fn parent_of(path: &str) -> Option<&str> {
    path.rfind('/').map(|i| &path[..i])
}

/// Contents of a checkpoint, shared by the in-memory and file sinks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckpointStore {
    pub directories: BTreeSet<String>,
    pub entries: BTreeMap<String, Vec<Complex64>>,
    pub counters: BTreeMap<String, u32>,
    pub consistent: bool,
}

impl CheckpointStore {
    pub fn create_directory(&mut self, path: &str) {
        let mut prefix = String::new();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(part);
            self.directories.insert(prefix.clone());
        }
    }

    pub fn set(&mut self, path: &str, values: &[Complex64]) -> Result<()> {
        if let Some(parent) = parent_of(path) {
            if !self.directories.contains(parent) {
                return Err(CheckpointError::MissingDirectory(parent.to_string()));
            }
        }
        self.entries.insert(path.to_string(), values.to_vec());
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&[Complex64]> {
        self.entries.get(path).map(Vec::as_slice)
    }
}

/// In-memory sink, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryCheckpoint {
    store: CheckpointStore,
    open: bool,
    finalized: bool,
}

impl MemoryCheckpoint {
    /// A new sink, already open.
    pub fn new() -> Self {
        Self {
            open: true,
            ..Default::default()
        }
    }

    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
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

impl CheckpointSink for MemoryCheckpoint {
    fn open(&mut self) -> Result<()> {
        if self.finalized {
            return Err(CheckpointError::Finalized);
        }
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.open = false;
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
        if !self.store.consistent {
            return Err(CheckpointError::Inconsistent);
        }
        self.open = false;
        self.finalized = true;
        Ok(())
    }
}
