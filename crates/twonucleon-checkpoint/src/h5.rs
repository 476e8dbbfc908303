//! HDF5 checkpoint backend.
//!
//! Layout of the staging file `<output>.NN_w.chk`:
//!
//! ```text
//! /
//!   boost_px0py0pz0/            (group per directory)
//!     ppcorr_SING_0_0_px0py0pz0 (1D Complex64 dataset, one value per timeslice)
//!   proton_POS_PAR              (1D Complex64 dataset)
//!   _meta/
//!     consistent                (scalar u8)
//!     counters/mucurrent        (scalar u32)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use hdf5::{File, Group};
use num_complex::Complex64;
use tracing::info;

use crate::error::{CheckpointError, Result};
use crate::json::staging_path;
use crate::sink::{parent_of, CheckpointSink};

const META: &str = "_meta";
const COUNTERS: &str = "_meta/counters";
const CONSISTENT: &str = "_meta/consistent";

/// HDF5-backed checkpoint.
pub struct Hdf5Checkpoint {
    output: PathBuf,
    staging: PathBuf,
    file: Option<File>,
    consistent: bool,
    finalized: bool,
}

impl Hdf5Checkpoint {
    /// Open (or resume) the staging file for `output`.
    pub fn create(output: impl AsRef<Path>) -> Result<Self> {
        let output = output.as_ref().to_path_buf();
        let staging = staging_path(&output);
        let file = if staging.exists() {
            info!(path = %staging.display(), "resuming HDF5 checkpoint");
            File::open_rw(&staging)?
        } else {
            File::create(&staging)?
        };
        ensure_group(&file, META)?;
        ensure_group(&file, COUNTERS)?;
        let mut chk = Self {
            output,
            staging,
            file: Some(file),
            consistent: false,
            finalized: false,
        };
        chk.write_consistency(false)?;
        Ok(chk)
    }

    fn file(&self) -> Result<&File> {
        if self.finalized {
            return Err(CheckpointError::Finalized);
        }
        self.file.as_ref().ok_or(CheckpointError::Closed)
    }

    fn write_consistency(&mut self, consistent: bool) -> Result<()> {
        let file = self.file()?;
        replace_scalar(file, CONSISTENT, u8::from(consistent))?;
        self.consistent = consistent;
        Ok(())
    }
}

fn ensure_group(root: &Group, path: &str) -> Result<()> {
    let mut prefix = String::new();
    for part in path.split('/').filter(|p| !p.is_empty()) {
        if !prefix.is_empty() {
            prefix.push('/');
        }
        prefix.push_str(part);
        if !root.link_exists(&prefix) {
            root.create_group(&prefix)?;
        }
    }
    Ok(())
}

fn replace_scalar<T: hdf5::H5Type>(root: &Group, path: &str, value: T) -> Result<()> {
    if root.link_exists(path) {
        root.unlink(path)?;
    }
    let ds = root.new_dataset::<T>().shape(()).create(path)?;
    ds.as_writer().write_scalar(&value)?;
    Ok(())
}

impl CheckpointSink for Hdf5Checkpoint {
    fn open(&mut self) -> Result<()> {
        if self.finalized {
            return Err(CheckpointError::Finalized);
        }
        if self.file.is_none() {
            self.file = Some(File::open_rw(&self.staging)?);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            file.flush()?;
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.file.is_some()
    }

    fn create_directory(&mut self, path: &str) -> Result<()> {
        ensure_group(self.file()?, path)
    }

    fn set(&mut self, path: &str, values: &[Complex64]) -> Result<()> {
        let file = self.file()?;
        if let Some(parent) = parent_of(path) {
            if !file.link_exists(parent) {
                return Err(CheckpointError::MissingDirectory(parent.to_string()));
            }
        }
        if file.link_exists(path) {
            file.unlink(path)?;
        }
        let ds = file
            .new_dataset::<Complex64>()
            .shape([values.len()])
            .create(path)?;
        ds.as_writer().write_raw(values)?;
        Ok(())
    }

    fn get(&self, path: &str) -> Result<Option<Vec<Complex64>>> {
        let file = self.file()?;
        if !file.link_exists(path) {
            return Ok(None);
        }
        let ds = file.dataset(path)?;
        Ok(Some(ds.as_reader().read_raw::<Complex64>()?))
    }

    fn set_counter(&mut self, name: &str, value: u32) -> Result<()> {
        let file = self.file()?;
        replace_scalar(file, &format!("{COUNTERS}/{name}"), value)
    }

    fn set_consistency(&mut self, consistent: bool) -> Result<()> {
        self.write_consistency(consistent)
    }

    fn is_consistent(&self) -> bool {
        self.consistent
    }

    fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Err(CheckpointError::Finalized);
        }
        if !self.consistent {
            return Err(CheckpointError::Inconsistent);
        }
        self.close()?;
        fs::rename(&self.staging, &self.output)?;
        self.finalized = true;
        info!(path = %self.output.display(), "HDF5 checkpoint finalized");
        Ok(())
    }
}
