//! CheckFileInfo record returned to the document viewer.

use serde::{Deserialize, Serialize};

/// Metadata the viewer needs before it fetches the bytes.
///
/// Field names follow the WOPI CheckFileInfo contract (`BaseFileName`,
/// `Size`, ...), which is why the struct serializes in PascalCase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileInfo {
    pub base_file_name: String,
    pub size: u64,
    pub owner_id: String,
    pub user_id: String,
    /// Changes on every call; files are never mutated in place.
    pub version: String,
    pub user_friendly_name: String,
    pub file_url: String,
    /// Always false: the host is read-only.
    pub supports_update: bool,
}

/// Fixed single-user identity reported in [`FileInfo`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    pub owner_id: String,
    pub user_id: String,
    pub friendly_name: String,
}

impl Default for HostIdentity {
    fn default() -> Self {
        Self {
            owner_id: "user".to_string(),
            user_id: "user".to_string(),
            friendly_name: "Local User".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_wopi_field_names() {
        let info = FileInfo {
            base_file_name: "report.xlsx".to_string(),
            size: 12_288,
            owner_id: "user".to_string(),
            user_id: "user".to_string(),
            version: "1700000000000".to_string(),
            user_friendly_name: "Local User".to_string(),
            file_url: "http://localhost:3001/document-host/files/report.xlsx/contents".to_string(),
            supports_update: false,
        };
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["BaseFileName"], "report.xlsx");
        assert_eq!(value["Size"], 12_288);
        assert_eq!(value["OwnerId"], "user");
        assert_eq!(value["UserFriendlyName"], "Local User");
        assert_eq!(value["SupportsUpdate"], false);
        assert!(value["FileUrl"].as_str().unwrap().ends_with("/contents"));
    }
}
