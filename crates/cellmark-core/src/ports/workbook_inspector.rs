//! WorkbookInspector port - ワークブックのシート一覧を読む

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("workbook could not be read: {0}")]
    Unreadable(String),
}

#[async_trait]
pub trait WorkbookInspector: Send + Sync {
    async fn sheet_names(&self, path: &Path) -> Result<Vec<String>, InspectError>;
}
