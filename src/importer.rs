//! インポートの手順制御
//!
//! 読み込み → 重複確認 → 検証 → 登録 → ストア作成 の順に実行し、
//! 最初の失敗で中断する。リトライは行わない。
//!
//! 登録後にストア作成が失敗した場合、登録は取り消さない。
//! エラーは登録済みの ID とパスを含み、手動での後始末を促す。

use crate::bundle;
use crate::error::{ImportError, Result};
use crate::registry::JobRegistry;
use crate::storage::StorageProvisioner;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// インポート要求
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub bundle_path: PathBuf,
    /// 真ならジョブのメタデータを取り込まない
    pub strip_metadata: bool,
}

/// インポート結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub name: String,
    pub id: String,
    pub db_path: PathBuf,
}

pub struct Importer<R, S> {
    registry: R,
    provisioner: S,
}

impl<R, S> Importer<R, S>
where
    R: JobRegistry,
    S: StorageProvisioner,
{
    pub fn new(registry: R, provisioner: S) -> Self {
        Self {
            registry,
            provisioner,
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// バンドルを 1 件インポート
    ///
    /// `secret_provider` は暗号化バンドルの場合にのみ呼ばれる。
    pub fn import_configuration<F>(
        &mut self,
        request: &ImportRequest,
        secret_provider: F,
    ) -> Result<ImportOutcome>
    where
        F: FnOnce() -> std::io::Result<String>,
    {
        let loaded = bundle::load(
            &request.bundle_path,
            request.strip_metadata,
            secret_provider,
        )?;
        let name = loaded.job.name.clone();

        // 重複は検証より先に判定する
        if self.registry.exists(&name)? {
            return Err(ImportError::DuplicateJobName(name));
        }

        if let Some(message) = self
            .registry
            .validate(&loaded.job, loaded.schedule.as_ref())
        {
            return Err(ImportError::InvalidConfiguration(message));
        }
        debug!(name = %name, "configuration is valid");

        let inserted = self.registry.insert(loaded.job, loaded.schedule)?;

        if let Err(e) = self.provisioner.provision(&inserted.db_path) {
            warn!(
                id = %inserted.id,
                path = %inserted.db_path.display(),
                "registered job has no local database"
            );
            return Err(ImportError::StorageProvisionFailed {
                job_id: inserted.id,
                job_name: inserted.name,
                path: inserted.db_path,
                reason: e.to_string(),
            });
        }

        info!(id = %inserted.id, name = %inserted.name, "import complete");
        Ok(ImportOutcome {
            name: inserted.name,
            id: inserted.id,
            db_path: inserted.db_path,
        })
    }
}

#[cfg(test)]
#[path = "importer_test.rs"]
mod tests;
