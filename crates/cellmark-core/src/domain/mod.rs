//! Domain model (file names, highlight requests, file info, errors).
//!
//! ドメイン層は HTTP も子プロセスも知りません。
//! I/O を伴うのは起動時の OverlayData 読み込みだけです。

pub mod errors;
pub mod file_info;
pub mod file_name;
pub mod highlight;
pub mod overlay;

pub use self::errors::{ErrorKind, HighlightFailure, HostError};
pub use self::file_info::{FileInfo, HostIdentity};
pub use self::file_name::{
    ARTIFACT_MARKER, SPREADSHEET_CONTENT_TYPE, SPREADSHEET_EXTENSION, StoredFileName,
};
pub use self::highlight::{
    CellRanges, ExecutorReport, HighlightJob, HighlightOutcome, HighlightRequest,
    ValidatedRequest,
};
pub use self::overlay::OverlayData;
