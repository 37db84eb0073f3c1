//! バックアップジョブのデータモデル
//!
//! エクスポートされた構成ファイルのスキーマ（PascalCase の JSON キー）をそのまま扱う。
//! 本クレートが解釈しないフィールドは `extra` に保持し、変更せずに受け渡す。

mod definition;
mod schedule;
pub(crate) mod serde_ext;
mod timespan;

pub use definition::{JobDefinition, JobFilter, JobSetting};
pub use schedule::Schedule;
pub use timespan::parse_timespan;
