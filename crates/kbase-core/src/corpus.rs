//! Corpus loading: turns structured article records into validated documents.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::traits::CorpusSource;
use crate::types::{ArticleRecord, Document};

/// Reads one JSON article per `*.json` file under a directory tree.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    root: PathBuf,
}

impl JsonDirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn list_json_files(&self) -> Vec<PathBuf> {
        let mut json_files = Vec::new();
        for entry in walkdir::WalkDir::new(&self.root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                json_files.push(path.to_path_buf());
            }
        }
        json_files.sort();
        json_files
    }

    fn read_record(&self, file_path: &Path) -> Result<ArticleRecord> {
        let raw = fs::read_to_string(file_path)
            .map_err(|e| Error::Corpus { path: file_path.to_path_buf(), reason: e.to_string() })?;
        let mut record: ArticleRecord = serde_json::from_str(&raw)
            .map_err(|e| Error::Corpus { path: file_path.to_path_buf(), reason: e.to_string() })?;
        record.source = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.display().to_string());
        Ok(record)
    }
}

impl CorpusSource for JsonDirSource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn load(&self) -> Result<Vec<ArticleRecord>> {
        if !self.root.is_dir() {
            return Err(Error::Corpus {
                path: self.root.clone(),
                reason: "not a directory".to_string(),
            });
        }
        let files = self.list_json_files();
        let mut records = Vec::with_capacity(files.len());
        for (file_index, file_path) in files.iter().enumerate() {
            debug!("Reading article {}/{}: {}", file_index + 1, files.len(), file_path.display());
            records.push(self.read_record(file_path)?);
        }
        info!("Loaded {} article records from {}", records.len(), self.root.display());
        Ok(records)
    }
}

/// Loads every record from `source` and converts it into a [`Document`].
///
/// Fails with [`Error::NoDocuments`] when the source is empty and with
/// [`Error::InvalidRecord`] on the first record missing a title or content.
pub fn load_documents(source: &dyn CorpusSource) -> Result<Vec<Document>> {
    let records = source.load()?;
    if records.is_empty() {
        return Err(Error::NoDocuments(source.describe()));
    }
    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            validate_record(&record, i)?;
            Ok(Document::from_record(record))
        })
        .collect()
}

fn validate_record(record: &ArticleRecord, position: usize) -> Result<()> {
    let source_id = if record.source.is_empty() { format!("#{position}") } else { record.source.clone() };
    if record.title.trim().is_empty() {
        return Err(Error::InvalidRecord { source_id, reason: "missing title".to_string() });
    }
    if record.content.trim().is_empty() {
        return Err(Error::InvalidRecord { source_id, reason: "missing content".to_string() });
    }
    Ok(())
}
