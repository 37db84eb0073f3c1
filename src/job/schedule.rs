//! ジョブのスケジュール

use super::serde_ext::{loose_id, nullable};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// スケジュール（ジョブごとに 0 または 1 個）
///
/// 繰り返しルールと次回実行の情報。内容は検証時の構造チェック以外では解釈しない。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Schedule {
    #[serde(
        rename = "ID",
        default,
        deserialize_with = "loose_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    pub tags: Vec<String>,

    /// 次回実行の基準時刻
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    /// 繰り返し間隔（例: `1D`, `12h`, `1W2D`）
    #[serde(default, deserialize_with = "nullable")]
    pub repeat: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<String>,

    /// 実行条件（例: `AllowedWeekDays=Monday,Friday`）
    #[serde(default, deserialize_with = "nullable")]
    pub rule: String,

    #[serde(default, deserialize_with = "nullable")]
    pub allowed_days: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Schedule {
    /// ルールから許可曜日の一覧を取り出す
    ///
    /// `AllowedWeekDays` 句が無ければ None。
    pub fn allowed_week_days(&self) -> Option<Vec<&str>> {
        self.rule.split(';').find_map(|clause| {
            let (key, value) = clause.split_once('=')?;
            if !key.trim().eq_ignore_ascii_case("AllowedWeekDays") {
                return None;
            }
            Some(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .collect(),
            )
        })
    }
}
