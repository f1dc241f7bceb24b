//! JSONL snapshot logging and run manifests.
//!
//! The core persists nothing by itself; these writers are the boundary
//! collaborators the CLI and atlas use. Snapshots serialize with every
//! field present, one record per line, so downstream tooling can stream
//! them.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::spec::{ClipMode, DataKind};
use crate::types::GuaranteeTier;

/// Line-delimited JSON writer for snapshot records.
#[derive(Debug)]
pub struct JsonlWriter {
    out: BufWriter<File>,
}

impl JsonlWriter {
    /// Create (truncating) a JSONL file at `path`.
    ///
    /// # Errors
    ///
    /// Propagates file creation errors.
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self {
            out: BufWriter::new(File::create(path)?),
        })
    }

    /// Append one record as a single JSON line.
    ///
    /// # Errors
    ///
    /// Propagates serialization and write errors.
    pub fn write<T: Serialize>(&mut self, record: &T) -> io::Result<()> {
        let line = serde_json::to_string(record)?;
        writeln!(self.out, "{line}")
    }

    /// Flush buffered lines to disk.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Manifest describing one logged run: the spec, the data provenance, the
/// method, and the tier of every emitted result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Stream or test name from the spec.
    pub name: String,
    /// Stable method name.
    pub method: String,
    /// Significance level.
    pub alpha: f64,
    /// Declared data kind.
    pub kind: DataKind,
    /// Declared support.
    pub support: (f64, f64),
    /// Out-of-range policy.
    pub clip_mode: ClipMode,
    /// Scenario name, for atlas runs.
    pub scenario: Option<String>,
    /// Base seed, for atlas runs.
    pub seed: Option<u64>,
    /// Tier of every emitted result, in emission order.
    pub tiers: Vec<GuaranteeTier>,
    /// Unix timestamp of manifest creation.
    pub created_unix: u64,
}

impl RunManifest {
    /// Stamp a manifest with the current wall-clock time.
    pub fn stamped(mut self) -> Self {
        self.created_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        self
    }

    /// Write the manifest as pretty JSON at `dir/manifest.json`.
    ///
    /// # Errors
    ///
    /// Propagates serialization and write errors.
    pub fn write_to(&self, dir: &Path) -> io::Result<()> {
        let file = File::create(dir.join("manifest.json"))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}
