//! Run manifest - a JSON summary written next to the output tables.
//!
//! Records what was read, what the normalizer dropped and how many rows
//! each table received, so a run can be audited without re-reading the
//! CSV files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{WriteError, WriteResult};
use crate::models::NormalizeStats;

/// File name of the manifest inside the output directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Summary of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Unique run identifier
    pub run_id: String,
    /// Start timestamp (RFC 3339)
    pub started_at: String,
    /// End timestamp (RFC 3339)
    pub finished_at: String,
    /// Source file
    pub input: PathBuf,
    /// Detected encoding of the source
    pub encoding: String,
    /// Delimiter used to read the source
    pub delimiter: char,
    /// Standardized source columns
    pub columns: Vec<String>,
    /// Normalizer accounting
    pub normalize: NormalizeStats,
    /// Rows written per table
    pub row_counts: BTreeMap<String, usize>,
    /// Written file names, relative to the output directory
    pub files: Vec<String>,
    /// Integrity violations found after building
    #[serde(default)]
    pub integrity_issues: Vec<String>,
}

impl RunManifest {
    /// Start a manifest for a new run.
    pub fn begin(input: &Path) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            started_at: chrono::Utc::now().to_rfc3339(),
            finished_at: String::new(),
            input: input.to_path_buf(),
            encoding: String::new(),
            delimiter: ',',
            columns: Vec::new(),
            normalize: NormalizeStats::default(),
            row_counts: BTreeMap::new(),
            files: Vec::new(),
            integrity_issues: Vec::new(),
        }
    }

    /// Stamp the end time.
    pub fn finish(&mut self) {
        self.finished_at = chrono::Utc::now().to_rfc3339();
    }

    /// Record written files by name.
    pub fn record_files(&mut self, paths: &[PathBuf]) {
        self.files = paths
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .collect();
    }

    /// Write `manifest.json` into `dir`.
    pub fn save(&self, dir: &Path) -> WriteResult<PathBuf> {
        let path = dir.join(MANIFEST_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content).map_err(|source| WriteError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Read `manifest.json` from `dir`, if there is a readable one.
    pub fn load(dir: &Path) -> Option<Self> {
        let content = fs::read_to_string(dir.join(MANIFEST_FILE)).ok()?;
        serde_json::from_str(&content).ok()
    }
}
