//! CalamineInspector - calamine でシート名を読む
//!
//! calamine は同期 API なので spawn_blocking で実行します。

use std::path::Path;

use async_trait::async_trait;
use calamine::{Reader, open_workbook_auto};

use crate::ports::{InspectError, WorkbookInspector};

#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineInspector;

#[async_trait]
impl WorkbookInspector for CalamineInspector {
    async fn sheet_names(&self, path: &Path) -> Result<Vec<String>, InspectError> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let workbook =
                open_workbook_auto(&path).map_err(|e| InspectError::Unreadable(e.to_string()))?;
            Ok(workbook.sheet_names())
        })
        .await
        .map_err(|e| InspectError::Unreadable(format!("inspection task failed: {e}")))?
    }
}
