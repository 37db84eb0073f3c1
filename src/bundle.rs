//! 構成バンドルの読み込み
//!
//! エクスポートされた構成ファイル（平文 JSON または暗号化エンベロープ）を
//! ジョブ定義とスケジュールに変換する。
//!
//! - 暗号化されている場合のみパスフレーズを要求する（提供関数は高々 1 回呼ばれる）
//! - ID・ローカル DB パス・スケジュール ID は常に消去する
//! - `strip_metadata` が真ならジョブのメタデータも消去する

pub mod envelope;

use crate::error::{ImportError, Result};
use crate::job::serde_ext::nullable;
use crate::job::{JobDefinition, Schedule};
use envelope::SealedBundle;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use zeroize::Zeroizing;

/// 読み込んだバンドル（1 回のインポートでのみ使用）
#[derive(Debug, Clone)]
pub struct ImportedBundle {
    pub job: JobDefinition,
    pub schedule: Option<Schedule>,
    /// エクスポートしたユーザー
    pub created_by: Option<String>,
    /// ソースパスの表示名
    pub display_names: BTreeMap<String, String>,
}

/// エクスポートファイルのトップレベル構造
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ExportDocument {
    #[serde(default)]
    created_by_username: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    display_names: BTreeMap<String, String>,
    #[serde(default)]
    backup: Option<JobDefinition>,
    #[serde(default)]
    schedule: Option<Schedule>,
}

/// バンドルを読み込む
///
/// `secret_provider` はバンドルが暗号化されている場合に限り、ヘッダの検証後に 1 回だけ呼ばれる。
pub fn load<F>(path: &Path, strip_metadata: bool, secret_provider: F) -> Result<ImportedBundle>
where
    F: FnOnce() -> std::io::Result<String>,
{
    let bytes = fs::read(path).map_err(|e| unreadable(path, e))?;

    let document = if envelope::is_sealed(&bytes) {
        let sealed = SealedBundle::parse(&bytes).map_err(|e| unreadable(path, e))?;
        let kdf = sealed.kdf();
        info!(
            path = %path.display(),
            m_cost = kdf.m_cost,
            t_cost = kdf.t_cost,
            "bundle is encrypted"
        );

        let secret = Zeroizing::new(secret_provider().map_err(|e| {
            decryption_failed(path, format!("passphrase unavailable: {}", e))
        })?);
        let plaintext = Zeroizing::new(
            sealed
                .open(&secret)
                .map_err(|e| decryption_failed(path, e))?,
        );
        parse_document(path, &plaintext)?
    } else {
        parse_document(path, &bytes)?
    };

    let mut job = document
        .backup
        .ok_or_else(|| unreadable(path, "No backup found in document"))?;
    job.clear_identity();
    if strip_metadata {
        job.metadata.clear();
    }

    let schedule = document.schedule.map(|mut schedule| {
        schedule.id = None;
        schedule
    });

    debug!(
        name = %job.name,
        has_schedule = schedule.is_some(),
        strip_metadata,
        "bundle loaded"
    );

    Ok(ImportedBundle {
        job,
        schedule,
        created_by: document.created_by_username,
        display_names: document.display_names,
    })
}

fn parse_document(path: &Path, bytes: &[u8]) -> Result<ExportDocument> {
    let text = std::str::from_utf8(bytes).map_err(|e| unreadable(path, e))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    serde_json::from_str(text).map_err(|e| unreadable(path, e))
}

fn unreadable(path: &Path, reason: impl ToString) -> ImportError {
    ImportError::BundleUnreadable {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn decryption_failed(path: &Path, reason: impl ToString) -> ImportError {
    ImportError::BundleDecryptionFailed {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[path = "bundle_test.rs"]
mod tests;
