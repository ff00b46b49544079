//! The operator's working set: loaded document and data, mapping, routing,
//! subject, and preview position.
//!
//! Every operation takes the session explicitly. Loads either fully replace
//! the relevant part or leave the session untouched on error.

use crate::engine::dispatch::DispatchJob;
use crate::engine::preview::{render, PreviewCursor};
use crate::error::{DispatchError, LoadError};
use crate::sources::document::{open_document, LoadedDocument};
use crate::sources::tabular::open_data_source;
use common::model::config::MergeConfig;
use common::model::datasource::{DataSourceSummary, DataSourceType, DocumentSummary};
use common::model::dataset::Dataset;
use common::model::mapping::Mapping;
use common::model::merge::{DeliveryMode, RowRange};
use common::model::preview::RenderedRecord;
use common::model::routing::RoutingConfig;
use common::model::template::Template;
use log::info;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct MergeSession {
    document_path: Option<PathBuf>,
    data_path: Option<PathBuf>,
    dataset: Arc<Dataset>,
    template: Template,
    placeholders: BTreeSet<String>,
    mapping: Mapping,
    routing: RoutingConfig,
    cursor: PreviewCursor,
    last_preview: Option<RenderedRecord>,
}

/// Read-only overview of a session for the operator.
#[derive(Debug, Serialize)]
pub struct SessionSummary {
    pub document: Option<String>,
    pub data_source: Option<String>,
    pub placeholders: Vec<String>,
    pub columns: Vec<String>,
    pub row_count: usize,
    pub mapping: Mapping,
    pub subject: String,
    pub routing: RoutingConfig,
    /// Range a batch covers when none is given.
    pub default_range: Option<RowRange>,
    pub preview: Option<RenderedRecord>,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Picks the first column whose name mentions mail.
fn detect_email_column(columns: &[String]) -> Option<String> {
    columns
        .iter()
        .find(|c| {
            let lower = c.to_lowercase();
            lower.contains("email") || lower.contains("mail")
        })
        .cloned()
}

impl MergeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn routing(&self) -> &RoutingConfig {
        &self.routing
    }

    pub fn placeholders(&self) -> &BTreeSet<String> {
        &self.placeholders
    }

    pub fn document_path(&self) -> Option<&Path> {
        self.document_path.as_deref()
    }

    pub fn data_path(&self) -> Option<&Path> {
        self.data_path.as_deref()
    }

    /// Loads the template document, replacing the body and placeholder set.
    pub fn load_document(&mut self, path: &Path) -> Result<DocumentSummary, LoadError> {
        let doc = open_document(path)?;
        let summary = self.commit_document(path, doc);
        self.preview(0);
        Ok(summary)
    }

    /// Loads the data source and reconciles the routing selection with its
    /// columns: selections that no longer exist are dropped, and a missing To
    /// is guessed from the column names.
    pub fn load_data(&mut self, path: &Path) -> Result<DataSourceSummary, LoadError> {
        let (source_type, dataset) = open_data_source(path)?;
        let summary = self.commit_data(path, source_type, dataset);
        self.preview(0);
        Ok(summary)
    }

    fn commit_document(&mut self, path: &Path, doc: LoadedDocument) -> DocumentSummary {
        info!(
            "Loaded document {} with {} placeholders",
            path.display(),
            doc.placeholders.len()
        );
        self.template.body = doc.body_html;
        self.placeholders = doc.placeholders;
        self.document_path = Some(path.to_path_buf());
        DocumentSummary {
            file_name: file_name(path),
            placeholders: self.placeholders.iter().cloned().collect(),
        }
    }

    fn commit_data(
        &mut self,
        path: &Path,
        source_type: DataSourceType,
        dataset: Dataset,
    ) -> DataSourceSummary {
        info!(
            "Loaded data source {} with {} rows and {} columns",
            path.display(),
            dataset.len(),
            dataset.columns().len()
        );

        let keep = |column: &Option<String>| column.clone().filter(|c| dataset.has_column(c));
        self.routing = RoutingConfig {
            to: keep(&self.routing.to).or_else(|| detect_email_column(dataset.columns())),
            cc: keep(&self.routing.cc),
            bcc: keep(&self.routing.bcc),
        };
        self.dataset = Arc::new(dataset);
        self.data_path = Some(path.to_path_buf());

        DataSourceSummary {
            file_name: file_name(path),
            source_type,
            columns: self.dataset.columns().to_vec(),
            row_count: self.dataset.len(),
            to_column: self.routing.to.clone(),
        }
    }

    /// Reloads the document and data source from the paths they were loaded
    /// from, keeping mapping, routing and subject.
    ///
    /// Both files are read before anything is replaced, so a failure leaves
    /// the session as it was.
    pub fn refresh(&mut self) -> Result<Option<RenderedRecord>, LoadError> {
        if self.document_path.is_none() && self.data_path.is_none() {
            return Err(LoadError::NotLoaded("document or data source"));
        }
        let document = match self.document_path.clone() {
            Some(path) => Some((open_document(&path)?, path)),
            None => None,
        };
        let data = match self.data_path.clone() {
            Some(path) => Some((open_data_source(&path)?, path)),
            None => None,
        };

        if let Some((doc, path)) = document {
            self.commit_document(&path, doc);
        }
        if let Some(((source_type, dataset), path)) = data {
            self.commit_data(&path, source_type, dataset);
        }
        Ok(self.preview(0))
    }

    /// Proposes a mapping: keep existing entries whose column still exists,
    /// otherwise match a placeholder to the column of the same name.
    pub fn suggest_mapping(&self) -> Mapping {
        self.placeholders
            .iter()
            .filter_map(|ph| {
                let column = match self.mapping.column_for(ph) {
                    Some(col) if self.dataset.has_column(col) => col.to_string(),
                    _ if self.dataset.has_column(ph) => ph.clone(),
                    _ => return None,
                };
                Some((ph.clone(), column))
            })
            .collect()
    }

    pub fn set_mapping(&mut self, mapping: Mapping) -> Option<RenderedRecord> {
        self.mapping = mapping;
        self.cursor.reset();
        self.preview(0)
    }

    pub fn set_routing(&mut self, subject: String, routing: RoutingConfig) -> Option<RenderedRecord> {
        self.template.subject = subject;
        self.routing = routing;
        self.preview(0)
    }

    /// Restores a persisted configuration verbatim, including columns the
    /// current dataset does not have.
    pub fn apply_config(&mut self, config: MergeConfig) -> Option<RenderedRecord> {
        self.routing = config.routing();
        self.mapping = config.mapping;
        self.template.subject = config.subject;
        self.preview(0)
    }

    pub fn export_config(&self) -> MergeConfig {
        MergeConfig::from_parts(&self.mapping, &self.template.subject, &self.routing)
    }

    /// Moves the preview by `step` records and renders it.
    ///
    /// With no data or no mapping this does nothing and returns the last
    /// rendered record.
    pub fn preview(&mut self, step: isize) -> Option<RenderedRecord> {
        if self.dataset.is_empty() || self.mapping.is_empty() {
            return self.last_preview.clone();
        }
        self.cursor.advance(step, self.dataset.len());
        self.render_current()
    }

    /// Moves the preview to the zero-based `index` and renders it.
    pub fn jump_to(&mut self, index: usize) -> Option<RenderedRecord> {
        if self.dataset.is_empty() || self.mapping.is_empty() {
            return self.last_preview.clone();
        }
        self.cursor.jump_to(index, self.dataset.len());
        self.render_current()
    }

    fn render_current(&mut self) -> Option<RenderedRecord> {
        self.last_preview = render(
            &self.dataset,
            &self.template,
            &self.mapping,
            &self.routing,
            self.cursor.index(),
        );
        self.last_preview.clone()
    }

    pub fn default_range(&self) -> Option<RowRange> {
        (!self.dataset.is_empty()).then(|| RowRange::full(self.dataset.len()))
    }

    /// Snapshots the session into a validated batch.
    pub fn dispatch_job(
        &self,
        range: Option<RowRange>,
        mode: DeliveryMode,
    ) -> Result<DispatchJob, DispatchError> {
        let range = range.unwrap_or_else(|| RowRange::full(self.dataset.len()));
        DispatchJob::new(
            Arc::clone(&self.dataset),
            self.template.clone(),
            self.mapping.clone(),
            self.routing.clone(),
            range,
            mode,
        )
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            document: self.document_path.as_deref().map(file_name),
            data_source: self.data_path.as_deref().map(file_name),
            placeholders: self.placeholders.iter().cloned().collect(),
            columns: self.dataset.columns().to_vec(),
            row_count: self.dataset.len(),
            mapping: self.mapping.clone(),
            subject: self.template.subject.clone(),
            routing: self.routing.clone(),
            default_range: self.default_range(),
            preview: self.last_preview.clone(),
        }
    }
}
