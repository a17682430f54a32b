//! Overlay data - ハイライト時に参照する結合セル・グラフ・画像の位置情報
//!
//! 中身は解釈せず、そのまま Highlight Executor に渡します。
//! 起動時に一度だけ読み込み、ファイルが無い場合は `{}` にフォールバックして
//! 機能を縮退させます（起動は失敗させない）。

use std::path::Path;

use serde_json::Value;
use tracing::{info, warn};

pub const MERGED_CELLS_FILE: &str = "merged_cells.json";
pub const CHARTS_FILE: &str = "charts.json";
pub const IMAGES_FILE: &str = "images.json";

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayData {
    pub merged_cells: Value,
    pub charts: Value,
    pub images: Value,
}

impl Default for OverlayData {
    fn default() -> Self {
        Self {
            merged_cells: empty(),
            charts: empty(),
            images: empty(),
        }
    }
}

fn empty() -> Value {
    Value::Object(Default::default())
}

impl OverlayData {
    /// `dir` から 3 つの JSON を読み込む
    pub async fn load(dir: &Path) -> Self {
        Self {
            merged_cells: load_one(dir, MERGED_CELLS_FILE, "Merged cells").await,
            charts: load_one(dir, CHARTS_FILE, "Charts").await,
            images: load_one(dir, IMAGES_FILE, "Images").await,
        }
    }

    pub fn merged_cells_json(&self) -> String {
        self.merged_cells.to_string()
    }

    pub fn charts_json(&self) -> String {
        self.charts.to_string()
    }

    pub fn images_json(&self) -> String {
        self.images.to_string()
    }
}

async fn load_one(dir: &Path, file: &str, label: &str) -> Value {
    let path = dir.join(file);
    let text = match tokio::fs::read_to_string(&path).await {
        Ok(text) => text,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "{file} not found. {label} highlighting will not work.");
            return empty();
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => {
            info!(path = %path.display(), "{file} loaded successfully.");
            value
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "{file} is not valid JSON. {label} highlighting will not work.");
            empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn missing_files_degrade_to_empty_objects() {
        let dir = tempfile::tempdir().unwrap();
        let overlay = OverlayData::load(dir.path()).await;
        assert_eq!(overlay, OverlayData::default());
        assert_eq!(overlay.charts_json(), "{}");
    }

    #[tokio::test]
    async fn loads_present_files_and_ignores_broken_ones() {
        let dir = tempfile::tempdir().unwrap();
        let charts = json!({
            "charts": [{ "sheet_name": "Sheet1", "charts_on_sheet": [{ "coords": "H2:N18" }] }]
        });
        std::fs::write(dir.path().join(CHARTS_FILE), charts.to_string()).unwrap();
        std::fs::write(dir.path().join(IMAGES_FILE), "{ not json").unwrap();

        let overlay = OverlayData::load(dir.path()).await;
        assert_eq!(overlay.charts, charts);
        assert_eq!(overlay.images, json!({}));
        assert_eq!(overlay.merged_cells, json!({}));
    }
}
