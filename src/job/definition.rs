//! ジョブ定義

use super::serde_ext::{loose_id, nullable};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// バックアップジョブ定義
///
/// `id` と `db_path` はレジストリが登録時に割り当てる。
/// 外部から持ち込まれた値は信用せず、読み込み時に必ず消去される。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobDefinition {
    /// レジストリが割り当てる識別子
    #[serde(
        rename = "ID",
        default,
        deserialize_with = "loose_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    /// 表示名（大文字小文字を区別せず一意）
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,

    #[serde(default, deserialize_with = "nullable")]
    pub description: String,

    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,

    /// バックアップ先 URL
    #[serde(rename = "TargetURL", default, deserialize_with = "nullable")]
    pub target_url: String,

    /// ローカル実行データベースのパス（レジストリが割り当てる）
    #[serde(rename = "DBPath", default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,

    #[serde(default, deserialize_with = "nullable")]
    pub sources: Vec<String>,

    #[serde(default, deserialize_with = "nullable")]
    pub settings: Vec<JobSetting>,

    #[serde(default, deserialize_with = "nullable")]
    pub filters: Vec<JobFilter>,

    /// 環境依存のメタデータ（最終実行日時、ソースサイズなど）
    #[serde(default, deserialize_with = "nullable")]
    pub metadata: BTreeMap<String, String>,

    /// 未解釈のフィールド
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// ジョブ設定（オプション）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobSetting {
    #[serde(default, deserialize_with = "nullable")]
    pub filter: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub value: String,
    #[serde(default, deserialize_with = "nullable")]
    pub argument: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// ジョブのフィルタ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobFilter {
    #[serde(default, deserialize_with = "nullable")]
    pub order: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub include: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub expression: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobSetting {
    /// 先頭の `--` を除いた設定名
    pub fn key(&self) -> &str {
        self.name.trim().trim_start_matches('-')
    }
}

impl JobDefinition {
    /// 設定値を名前で検索（先頭の `--` と大文字小文字は無視）
    pub fn setting(&self, name: &str) -> Option<&str> {
        let name = name.trim_start_matches('-');
        self.settings
            .iter()
            .find(|s| s.key().eq_ignore_ascii_case(name))
            .map(|s| s.value.as_str())
    }

    /// 名前が一致するか（大文字小文字を区別しない）
    pub fn has_name(&self, name: &str) -> bool {
        names_equal(&self.name, name)
    }

    /// レジストリ管理のフィールドを消去
    pub fn clear_identity(&mut self) {
        self.id = None;
        self.db_path = None;
    }
}

/// ジョブ名の比較（Unicode の小文字化による大文字小文字無視）
fn names_equal(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
#[path = "definition_test.rs"]
mod tests;
