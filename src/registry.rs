//! ジョブレジストリ
//!
//! 稼働中のジョブ定義の集合への読み書きを提供する。
//! インポート処理からは [`JobRegistry`] の 3 操作（存在確認・検証・登録）のみを通して利用する。

mod lock;
mod store;
mod validate;

pub use store::{JsonJobRegistry, RegistryDocument, RegistryEntry};
pub use validate::validate_job;

use crate::error::Result;
use crate::job::{JobDefinition, Schedule};
use std::path::PathBuf;

/// 登録済みジョブの識別情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertedJob {
    pub id: String,
    pub name: String,
    /// ローカル実行データベースの割り当てパス
    pub db_path: PathBuf,
}

/// ジョブレジストリの契約
pub trait JobRegistry {
    /// 同名（大文字小文字を区別しない）のジョブが存在するか
    fn exists(&mut self, name: &str) -> Result<bool>;

    /// 構造検証（状態は変更しない）
    ///
    /// 問題があれば説明文を返す。
    fn validate(&self, job: &JobDefinition, schedule: Option<&Schedule>) -> Option<String> {
        validate_job(job, schedule)
    }

    /// ID とローカル DB パスを割り当ててアトミックに登録
    ///
    /// 失敗時はレジストリを変更しない。
    fn insert(&mut self, job: JobDefinition, schedule: Option<Schedule>) -> Result<InsertedJob>;
}
