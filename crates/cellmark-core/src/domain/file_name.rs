//! File names - File Store のアドレスと、ハイライト成果物の命名規則
//!
//! File Store はフラットなディレクトリで、ファイル名がそのままキーになります。
//! ハイライト成果物は `<stem>_highlighted_<timestampMillis>.xlsx` という名前で
//! 区別され、この規則はディスク上の契約です（base 名の逆算に使う）。
//!
//! # 学習ポイント
//! - Newtype パターンで「検証済みの名前」を型で表す
//! - `serde(try_from)` でデシリアライズ時にも検証する

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::HostError;

/// ハイライト成果物を示すマーカー
pub const ARTIFACT_MARKER: &str = "_highlighted_";

/// スプレッドシートの拡張子（成果物は常にこれ）
pub const SPREADSHEET_EXTENSION: &str = ".xlsx";

pub const SPREADSHEET_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// StoredFileName は File Store 内のファイル名
///
/// # 不変条件
/// - 空でない
/// - パス区切り（`/`, `\`）と NUL を含まず、`.` や `..` そのものでもない
///
/// これにより、クライアントが渡した名前でディレクトリ外に出ることはできません。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StoredFileName(String);

impl StoredFileName {
    pub fn parse(raw: impl Into<String>) -> Result<Self, HostError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(HostError::BadRequest("file name is required".to_string()));
        }
        if raw.contains(['/', '\\', '\0']) || raw == "." || raw == ".." {
            return Err(HostError::BadRequest(format!("invalid file name: {raw}")));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 最後の拡張子を除いた部分（先頭のドットは拡張子扱いしない）
    pub fn stem(&self) -> &str {
        match self.0.rfind('.') {
            Some(idx) if idx > 0 => &self.0[..idx],
            _ => &self.0,
        }
    }

    /// ドット付きの拡張子。無ければ空文字列
    pub fn extension(&self) -> &str {
        &self.0[self.stem().len()..]
    }

    pub fn is_artifact(&self) -> bool {
        self.0.contains(ARTIFACT_MARKER)
    }

    /// ハイライト前の元ドキュメント名を逆算する
    ///
    /// マーカーを含む場合は最初のマーカー以降を切り落とし、要求された名前の
    /// 拡張子を付け直す。含まない場合は自分自身が base。
    ///
    /// 冪等: `name.base_name().base_name() == name.base_name()`
    pub fn base_name(&self) -> StoredFileName {
        let Some(idx) = self.0.find(ARTIFACT_MARKER) else {
            return self.clone();
        };
        let base = format!("{}{}", &self.0[..idx], self.extension());
        match StoredFileName::parse(base) {
            Ok(base) => base,
            // "_highlighted_" のように何も残らない名前はそのまま扱う
            Err(_) => self.clone(),
        }
    }

    /// `<stem>_highlighted_<timestamp_millis>.xlsx`
    pub fn artifact(&self, timestamp_millis: i64) -> StoredFileName {
        StoredFileName(format!(
            "{}{}{}{}",
            self.stem(),
            ARTIFACT_MARKER,
            timestamp_millis,
            SPREADSHEET_EXTENSION
        ))
    }

    /// 成果物名に埋め込まれたタイムスタンプ
    pub fn artifact_timestamp(&self) -> Option<i64> {
        let idx = self.0.rfind(ARTIFACT_MARKER)?;
        self.0[idx + ARTIFACT_MARKER.len()..]
            .strip_suffix(SPREADSHEET_EXTENSION)?
            .parse()
            .ok()
    }

    /// `stem` を base とする成果物かどうか（cleanup の掃除対象判定）
    pub fn is_artifact_of(&self, stem: &str) -> bool {
        self.0
            .strip_prefix(stem)
            .is_some_and(|rest| rest.starts_with(ARTIFACT_MARKER))
            && self.0.ends_with(SPREADSHEET_EXTENSION)
    }
}

impl fmt::Display for StoredFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for StoredFileName {
    type Error = HostError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<StoredFileName> for String {
    fn from(value: StoredFileName) -> Self {
        value.0
    }
}

impl AsRef<str> for StoredFileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
