//! Application session.
//!
//! Holds what the user is looking at: the selected chart type, the active
//! record set and its file name, the id of the last save and the heatmap
//! z-score toggle. Every transition is a method here so front ends (the CLI,
//! tests) share the same rules.

use crate::data::RecordSet;
use crate::ir::ChartSpec;
use crate::samples::{self, SAMPLE_FILE_NAME};
use crate::shape::{shape_chart, ViewOptions};
use crate::store::{PlotStore, SavedPlot, StoreError};
use crate::upload::Upload;
use crate::{OutputFormat, PlotKind};
use log::{error, info};
use thiserror::Error;

/// File name used when data has no name of its own
pub const UNTITLED_FILE_NAME: &str = "untitled.csv";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No data to save")]
    NothingToSave,
    #[error("Please enter a plot ID")]
    EmptyId,
    #[error("Plot not found with that ID")]
    NotFound,
    #[error("Failed to save to cloud: {0}")]
    Save(#[source] StoreError),
    #[error("Error loading plot: {0}")]
    Load(#[source] StoreError),
}

pub struct Session<S: PlotStore> {
    store: S,
    kind: PlotKind,
    data: RecordSet,
    file_name: Option<String>,
    saved_id: Option<String>,
    zscore: bool,
}

impl<S: PlotStore> Session<S> {
    /// Fresh session on the pie chart with no data
    pub fn new(store: S) -> Self {
        Self {
            store,
            kind: PlotKind::Pie,
            data: RecordSet::default(),
            file_name: None,
            saved_id: None,
            zscore: false,
        }
    }

    pub fn kind(&self) -> PlotKind {
        self.kind
    }

    pub fn data(&self) -> &RecordSet {
        &self.data
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn saved_id(&self) -> Option<&str> {
        self.saved_id.as_deref()
    }

    pub fn zscore(&self) -> bool {
        self.zscore
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Switching chart type starts over with no data
    pub fn select_plot(&mut self, kind: PlotKind) {
        self.kind = kind;
        self.data = RecordSet::default();
        self.file_name = None;
        self.saved_id = None;
        self.zscore = false;
    }

    pub fn load_sample(&mut self) {
        let data = samples::sample_for(self.kind);
        self.replace_data(data, SAMPLE_FILE_NAME.to_string());
    }

    pub fn upload(&mut self, upload: Upload) {
        info!("Loaded {} rows from {}", upload.records.len(), upload.file_name);
        self.replace_data(upload.records, upload.file_name);
    }

    fn replace_data(&mut self, data: RecordSet, file_name: String) {
        self.data = data;
        self.file_name = Some(file_name);
        self.saved_id = None;
    }

    pub fn set_zscore(&mut self, zscore: bool) {
        self.zscore = zscore;
    }

    pub fn view(&self) -> ViewOptions {
        ViewOptions { zscore: self.zscore }
    }

    /// Chart for the current state; `None` until there is data
    pub fn chart(&self) -> Option<ChartSpec> {
        shape_chart(self.kind, &self.data, &self.view())
    }

    /// Persist the current plot. A failed save keeps the previous id.
    pub fn save(&mut self) -> Result<&str, SessionError> {
        if self.data.is_empty() {
            return Err(SessionError::NothingToSave);
        }
        let plot = SavedPlot::new(
            self.kind,
            self.data.clone(),
            self.file_name.as_deref().unwrap_or(UNTITLED_FILE_NAME),
        );
        let id = self.store.save(&plot).map_err(|e| {
            error!("Error adding document: {}", e);
            SessionError::Save(e)
        })?;
        Ok(self.saved_id.insert(id).as_str())
    }

    /// Replace the session with a saved plot. Nothing changes on failure.
    pub fn load_saved(&mut self, id: &str) -> Result<(), SessionError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(SessionError::EmptyId);
        }
        let saved = self
            .store
            .load(id)
            .map_err(|e| {
                error!("Error getting document: {}", e);
                SessionError::Load(e)
            })?
            .ok_or(SessionError::NotFound)?;

        self.kind = saved.plot_type;
        self.data = saved.data;
        self.file_name = Some(saved.file_name);
        self.saved_id = Some(id.to_string());
        Ok(())
    }

    /// `<chart title>_srplot.<ext>`
    pub fn export_file_name(&self, format: OutputFormat) -> String {
        format!("{}_srplot.{}", self.kind.title(), format.extension())
    }
}
