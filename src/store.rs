//! Saved plot persistence.
//!
//! A saved plot is an immutable document holding the chart type, the
//! complete record set and the source file name. `save` returns a fresh id;
//! `load` returns `Ok(None)` for ids that were never issued.

use crate::data::RecordSet;
use crate::PlotKind;
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPlot {
    pub plot_type: PlotKind,
    pub data: RecordSet,
    pub file_name: String,
    /// Set by the store when the document is written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SavedPlot {
    pub fn new(plot_type: PlotKind, data: RecordSet, file_name: impl Into<String>) -> Self {
        Self {
            plot_type,
            data,
            file_name: file_name.into(),
            created_at: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("saved plot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
}

pub trait PlotStore {
    /// Persist a new document and return its id
    fn save(&self, plot: &SavedPlot) -> Result<String, StoreError>;
    /// The document saved under `id`, or `None` if there is none
    fn load(&self, id: &str) -> Result<Option<SavedPlot>, StoreError>;
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn stamped(plot: &SavedPlot) -> SavedPlot {
    SavedPlot {
        created_at: Some(Utc::now()),
        ..plot.clone()
    }
}

/// Ids are opaque tokens; anything else cannot name a document
fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// One pretty-printed JSON file per saved plot
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }
}

/// Create `path` (never overwriting) and fill it with `write`. A file left
/// incomplete by a failed write is removed.
fn write_new_file<F>(path: &Path, write: F) -> std::io::Result<()>
where
    F: FnOnce(&mut File) -> std::io::Result<()>,
{
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    let written = write(&mut file).and_then(|_| file.sync_all());
    if let Err(e) = written {
        drop(file);
        if let Err(cleanup) = fs::remove_file(path) {
            warn!("Failed to remove partial document {}: {}", path.display(), cleanup);
        }
        return Err(e);
    }
    Ok(())
}

impl PlotStore for JsonFileStore {
    fn save(&self, plot: &SavedPlot) -> Result<String, StoreError> {
        let document = serde_json::to_vec_pretty(&stamped(plot))?;
        let id = new_id();
        let path = self.path_for(&id);

        write_new_file(&path, |file| file.write_all(&document))?;

        info!("Saved {} plot {} to {}", plot.plot_type, id, path.display());
        Ok(id)
    }

    fn load(&self, id: &str) -> Result<Option<SavedPlot>, StoreError> {
        if !is_valid_id(id) {
            warn!("No saved plot with id {:?}", id);
            return Ok(None);
        }
        let text = match fs::read_to_string(self.path_for(id)) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("No saved plot with id {:?}", id);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }
}

/// In-process store; documents live as long as the value
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<String, SavedPlot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PlotStore for MemoryStore {
    fn save(&self, plot: &SavedPlot) -> Result<String, StoreError> {
        let mut documents = self.documents.lock().map_err(|_| StoreError::Poisoned)?;
        let id = new_id();
        documents.insert(id.clone(), stamped(plot));
        info!("Saved {} plot {} in memory", plot.plot_type, id);
        Ok(id)
    }

    fn load(&self, id: &str) -> Result<Option<SavedPlot>, StoreError> {
        let documents = self.documents.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(documents.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Record, Value};
    use crate::samples;

    fn toptable() -> RecordSet {
        RecordSet::new(vec![
            Record::from_iter([
                ("ID", Value::from("1007_s_at")),
                ("logFC", Value::from(-1.25)),
                ("Gene.symbol", Value::from("DDR1")),
                ("flag", Value::from(true)),
                ("note", Value::Empty),
            ]),
            Record::from_iter([
                ("ID", Value::from("1053_at")),
                ("logFC", Value::from(0.5)),
                ("Gene.symbol", Value::from("RFC2")),
                ("flag", Value::from(false)),
                ("note", Value::from("x")),
            ]),
        ])
    }

    #[test]
    fn test_file_store_round_trip_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("plots")).unwrap();
        let plot = SavedPlot::new(PlotKind::Bar, toptable(), "toptable.tsv");

        let id = store.save(&plot).unwrap();
        let loaded = store.load(&id).unwrap().unwrap();
        assert_eq!(loaded.plot_type, PlotKind::Bar);
        assert_eq!(loaded.file_name, "toptable.tsv");
        assert_eq!(loaded.data, plot.data);
        assert!(loaded.created_at.is_some());

        let columns: Vec<&str> = loaded.data.records()[0].columns().collect();
        assert_eq!(columns, vec!["ID", "logFC", "Gene.symbol", "flag", "note"]);
    }

    #[test]
    fn test_each_save_gets_a_new_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        let plot = SavedPlot::new(PlotKind::Go, samples::go_terms(), "sample_data.csv");
        let a = store.save(&plot).unwrap();
        let b = store.save(&plot).unwrap();
        assert_ne!(a, b);
        assert!(is_valid_id(&a));
    }

    #[test]
    fn test_unknown_and_malformed_ids_are_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert!(store.load("deadbeef").unwrap().is_none());
        assert!(store.load("../etc/passwd").unwrap().is_none());
        assert!(store.load("").unwrap().is_none());
    }

    #[test]
    fn test_document_uses_camel_case_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        let id = store
            .save(&SavedPlot::new(PlotKind::Pie, samples::transcript_classes(), "sample_data.csv"))
            .unwrap();
        let text = fs::read_to_string(store.path_for(&id)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["plotType"], "pie");
        assert_eq!(json["fileName"], "sample_data.csv");
        assert!(json["createdAt"].is_string());
        assert_eq!(json["data"][0]["Gene.symbol"], "Coding");
        assert_eq!(json["data"][0]["value"], 120.0);
    }

    #[test]
    fn test_corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();
        assert!(matches!(store.load("broken"), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_failed_write_leaves_no_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        let err = write_new_file(&path, |file| {
            file.write_all(b"{\"plotType\":")?;
            Err(std::io::Error::new(ErrorKind::Other, "disk full"))
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "disk full");
        assert!(!path.exists());
    }

    #[test]
    fn test_existing_document_is_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taken.json");
        fs::write(&path, "{}").unwrap();
        let err = write_new_file(&path, |file| file.write_all(b"[]")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        let id = store
            .save(&SavedPlot::new(PlotKind::Heatmap, samples::expression_matrix(), "m.csv"))
            .unwrap();
        assert_eq!(store.len(), 1);
        let loaded = store.load(&id).unwrap().unwrap();
        assert_eq!(loaded.plot_type, PlotKind::Heatmap);
        assert!(store.load("missing").unwrap().is_none());
    }
}
