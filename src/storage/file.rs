use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use super::{StudentStore, NAMESPACE_KEY};
use crate::student::StudentRoster;

/// Get the default data file path (~/.config/recitation-tracker/students.json)
pub fn get_data_path() -> PathBuf {
    crate::config::get_config_dir().join("students.json")
}

/// A JSON document on disk acting as a small key-value store. The roster
/// lives under `NAMESPACE_KEY`; other top-level keys are preserved on save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Option<Map<String, Value>>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open data file at {}", self.path.display()))?;
        let document: Map<String, Value> = serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse data file at {}", self.path.display()))?;

        Ok(Some(document))
    }
}

impl StudentStore for JsonFileStore {
    fn load(&self) -> Result<StudentRoster> {
        let Some(mut document) = self.read_document()? else {
            return Ok(StudentRoster::new());
        };

        match document.remove(NAMESPACE_KEY) {
            Some(value) => serde_json::from_value(value).with_context(|| {
                format!("Failed to load students from {}", self.path.display())
            }),
            None => Ok(StudentRoster::new()),
        }
    }

    /// Write atomically, so a failed save never leaves a half-written file.
    fn save(&self, roster: &StudentRoster) -> Result<()> {
        // An unreadable document is replaced rather than merged
        let mut document = self.read_document().ok().flatten().unwrap_or_default();
        document.insert(
            NAMESPACE_KEY.to_string(),
            serde_json::to_value(roster).context("Failed to serialize students")?,
        );

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let mut file = AtomicWriteFile::open(&self.path)
            .with_context(|| format!("Failed to open atomic write file at {}", self.path.display()))?;
        serde_json::to_writer_pretty(&mut file, &document).context("Failed to serialize students")?;
        file.commit().context("Failed to save students")?;

        Ok(())
    }
}
