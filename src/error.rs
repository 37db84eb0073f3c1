mod code;
mod formatter;
mod rich;

pub use code::ErrorCode;
pub use formatter::ErrorFormatter;
pub use rich::{ErrorContext, RichError};

use std::path::PathBuf;
use thiserror::Error;

/// インポート処理の統一エラー型
///
/// どのバリアントも終端エラーであり、内部でリトライは行わない。
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid arguments: {0}")]
    Argument(String),

    #[error("Unable to read configuration bundle {}: {reason}", .path.display())]
    BundleUnreadable { path: PathBuf, reason: String },

    #[error("Unable to decrypt configuration bundle {}: {reason}", .path.display())]
    BundleDecryptionFailed { path: PathBuf, reason: String },

    #[error("A backup with the name {0} already exists")]
    DuplicateJobName(String),

    #[error("Invalid backup configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Job registry {} is unavailable: {reason}", .path.display())]
    RegistryUnavailable { path: PathBuf, reason: String },

    #[error("Failed to record backup in the job registry: {0}")]
    RegistryInsertFailed(String),

    #[error(
        "Backup \"{job_name}\" was registered with ID {job_id}, but its local database at {} could not be created: {reason}",
        .path.display()
    )]
    StorageProvisionFailed {
        job_id: String,
        job_name: String,
        path: PathBuf,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ImportError>;

impl ImportError {
    /// 対応するエラーコード
    pub fn code(&self) -> ErrorCode {
        match self {
            ImportError::Argument(_) => ErrorCode::Arg001,
            ImportError::BundleUnreadable { .. } => ErrorCode::Bnd001,
            ImportError::BundleDecryptionFailed { .. } => ErrorCode::Bnd002,
            ImportError::DuplicateJobName(_) => ErrorCode::Reg001,
            ImportError::InvalidConfiguration(_) => ErrorCode::Reg002,
            ImportError::RegistryUnavailable { .. } => ErrorCode::Reg003,
            ImportError::RegistryInsertFailed(_) => ErrorCode::Reg004,
            ImportError::StorageProvisionFailed { .. } => ErrorCode::Sto001,
        }
    }

    /// レジストリにローカルストアを持たないエントリが残ったか
    ///
    /// 登録後のプロビジョニング失敗のみが該当し、手動での後始末が必要になる。
    pub fn leaves_orphaned_entry(&self) -> bool {
        matches!(self, ImportError::StorageProvisionFailed { .. })
    }

    /// プロセスの終了コード
    pub fn exit_code(&self) -> i32 {
        match self {
            ImportError::Argument(_) => 2,
            ImportError::StorageProvisionFailed { .. } => 3,
            _ => 1,
        }
    }

    /// CLI 表示用の RichError に変換
    pub fn to_rich(&self) -> RichError {
        let context = match self {
            ImportError::BundleUnreadable { path, .. }
            | ImportError::BundleDecryptionFailed { path, .. } => {
                ErrorContext::new().path("bundle", path)
            }
            ImportError::RegistryUnavailable { path, .. } => {
                ErrorContext::new().path("registry", path)
            }
            ImportError::DuplicateJobName(name) => ErrorContext::new().value("backup", name),
            ImportError::StorageProvisionFailed {
                job_id,
                job_name,
                path,
                ..
            } => ErrorContext::new()
                .value("backup", job_name)
                .value("registered id", job_id)
                .path("database", path),
            _ => ErrorContext::new(),
        };

        let rich = RichError::new(self.code(), self.to_string()).with_context(context);
        if self.leaves_orphaned_entry() {
            rich.with_orphaned_entry()
        } else {
            rich
        }
    }
}
