//! Highlight request and job model.
//!
//! `HighlightRequest` is what a client sends; `HighlightJob` is what the
//! executor receives after the orchestrator has resolved paths and names.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::errors::HostError;
use super::file_name::StoredFileName;
use super::overlay::OverlayData;

/// Ordered list of range expressions such as `A1` or `B2:B5`.
///
/// Parsed from a comma-separated string; tokens are trimmed and empty
/// tokens dropped. An empty list is valid (nothing gets highlighted).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellRanges(Vec<String>);

impl CellRanges {
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// JSON array form handed to the executor, e.g. `["D15","B8"]`.
    pub fn to_json(&self) -> String {
        serde_json::Value::from(self.0.clone()).to_string()
    }
}

impl From<Vec<String>> for CellRanges {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

/// Wire shape of `POST /highlight`.
///
/// All fields default so that a missing field surfaces as `BadRequest`
/// from [`HighlightRequest::validate`] instead of a decode error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightRequest {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub sheet_name: String,
    #[serde(default)]
    pub cell_ranges: String,
}

/// A request whose fields have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub file_name: StoredFileName,
    pub sheet_name: String,
    pub cell_ranges: CellRanges,
}

impl HighlightRequest {
    pub fn new(
        file_name: impl Into<String>,
        sheet_name: impl Into<String>,
        cell_ranges: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            sheet_name: sheet_name.into(),
            cell_ranges: cell_ranges.into(),
        }
    }

    pub fn validate(&self) -> Result<ValidatedRequest, HostError> {
        let file_name = StoredFileName::parse(self.file_name.trim())?;
        let sheet_name = self.sheet_name.trim();
        if sheet_name.is_empty() {
            return Err(HostError::BadRequest("sheet name is required".to_string()));
        }
        Ok(ValidatedRequest {
            file_name,
            sheet_name: sheet_name.to_string(),
            cell_ranges: CellRanges::parse(&self.cell_ranges),
        })
    }
}

/// Everything the Highlight Executor needs for one run.
#[derive(Debug, Clone)]
pub struct HighlightJob {
    pub source: PathBuf,
    pub sheet_name: String,
    pub cell_ranges: CellRanges,
    pub overlay: Arc<OverlayData>,
    pub destination: PathBuf,
}

/// Output captured from a successful executor run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutorReport {
    pub stdout: String,
    pub stderr: String,
}

/// Result of one orchestration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightOutcome {
    pub base: StoredFileName,
    pub artifact: StoredFileName,
    /// Artifacts of the same base removed before the new one was written.
    pub retired: Vec<StoredFileName>,
}
