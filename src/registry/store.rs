//! JSON ファイルによるジョブレジストリ（状態マシン）
//!
//! ## 状態遷移図
//!
//! ```text
//!                    ┌─────────────┐
//!                    │   Initial   │
//!                    └──────┬──────┘
//!                           │ new()
//!                           ▼
//!                    ┌─────────────┐
//!              ┌────▶│    Idle     │◀────┐
//!              │     └──────┬──────┘     │
//!              │            │            │
//!              │   load() / exists()     │
//!              │            ▼            │
//!              │     ┌─────────────┐     │
//!              │     │   Loaded    │     │
//!              │     └──────┬──────┘     │
//!              │            │            │
//!              │   insert()（ロック下で再読込）
//!              │            ▼            │
//!              │     ┌─────────────┐     │
//!              │     │  Modified   │     │
//!              │     └──────┬──────┘     │
//!              │            │            │
//!              │       save()            │
//!              │            │            │
//!              └────────────┴────────────┘
//! ```
//!
//! 書き込みは同一ディレクトリの一時ファイルへ書いてからリネームするため、
//! 他の読み手が書きかけのエントリを観測することはない。

use super::lock::RegistryLock;
use super::{InsertedJob, JobRegistry};
use crate::error::{ImportError, Result};
use crate::job::{JobDefinition, Schedule};
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

const FORMAT_VERSION: u32 = 1;

fn format_version() -> u32 {
    FORMAT_VERSION
}

/// レジストリエントリ
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    pub job: JobDefinition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
    /// 登録日時
    pub imported_at: DateTime<Utc>,
}

/// レジストリファイルの内容
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryDocument {
    #[serde(default = "format_version")]
    pub version: u32,
    /// 次に割り当てる ID（再利用しない）
    #[serde(default)]
    pub next_id: u64,
    #[serde(default)]
    pub jobs: Vec<RegistryEntry>,
}

impl Default for RegistryDocument {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            next_id: 1,
            jobs: Vec::new(),
        }
    }
}

impl RegistryDocument {
    /// 同名のジョブを検索
    pub fn find_by_name(&self, name: &str) -> Option<&RegistryEntry> {
        self.jobs.iter().find(|entry| entry.job.has_name(name))
    }

    /// 新しい ID を払い出す
    ///
    /// `next_id` が欠損・破損していても既存 ID と衝突しない値を返す。
    /// ID 空間を使い切った場合は払い出さない。
    fn allocate_id(&mut self) -> Result<u64> {
        let exhausted =
            || ImportError::RegistryInsertFailed("no job IDs left to allocate".to_string());

        let max_existing = self
            .jobs
            .iter()
            .filter_map(|entry| entry.job.id.as_deref()?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        let id = self
            .next_id
            .max(max_existing.checked_add(1).ok_or_else(exhausted)?)
            .max(1);
        self.next_id = id.checked_add(1).ok_or_else(exhausted)?;
        Ok(id)
    }

    fn references_db_path(&self, path: &Path) -> bool {
        self.jobs
            .iter()
            .any(|entry| entry.job.db_path.as_deref() == Some(path))
    }
}

/// 状態マシンの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Loaded,
    Modified,
}

/// JSON ファイルをバックエンドとするジョブレジストリ
pub struct JsonJobRegistry {
    registry_path: PathBuf,
    jobs_folder: PathBuf,
    state: State,
    document: Option<RegistryDocument>,
}

impl JsonJobRegistry {
    /// レジストリファイルとローカル DB 配置先を指定して作成
    pub fn new(registry_path: PathBuf, jobs_folder: PathBuf) -> Self {
        Self {
            registry_path,
            jobs_folder,
            state: State::Idle,
            document: None,
        }
    }

    pub fn registry_path(&self) -> &Path {
        &self.registry_path
    }

    /// 設定を読み込み（Idle → Loaded）
    ///
    /// Loaded 状態ではメモリ上の内容を返す。
    pub fn load(&mut self) -> Result<&RegistryDocument> {
        let document = match self.document.take() {
            Some(document) if self.state == State::Loaded => document,
            _ => read_document(&self.registry_path)?,
        };
        self.state = State::Loaded;
        Ok(self.document.insert(document))
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = OsString::from(self.registry_path.as_os_str());
        name.push(".lock");
        PathBuf::from(name)
    }

    /// 未使用のローカル DB パスを生成
    ///
    /// `<jobs-folder>/<id>-<ランダム8文字>.sqlite` の形式。
    fn allocate_db_path(&self, id: u64, document: &RegistryDocument) -> PathBuf {
        let mut rng = rand::thread_rng();
        loop {
            let suffix: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(8)
                .map(|b| char::from(b).to_ascii_lowercase())
                .collect();
            let candidate = self.jobs_folder.join(format!("{}-{}.sqlite", id, suffix));
            if !candidate.exists() && !document.references_db_path(&candidate) {
                return candidate;
            }
        }
    }

    /// 設定を保存（Modified → Idle）
    fn save(&mut self, document: RegistryDocument) -> Result<()> {
        match write_document(&self.registry_path, &document) {
            Ok(()) => {
                self.document = Some(document);
                self.state = State::Idle;
                Ok(())
            }
            Err(e) => {
                // 次回アクセス時にディスクから読み直す
                self.document = None;
                self.state = State::Idle;
                Err(e)
            }
        }
    }

    /// 登録済みエントリ一覧
    pub fn list(&mut self) -> Result<Vec<RegistryEntry>> {
        Ok(self.load()?.jobs.clone())
    }

    /// 現在の状態を取得（デバッグ用）
    #[cfg(test)]
    pub fn current_state(&self) -> &'static str {
        match self.state {
            State::Idle => "Idle",
            State::Loaded => "Loaded",
            State::Modified => "Modified",
        }
    }
}

impl JobRegistry for JsonJobRegistry {
    fn exists(&mut self, name: &str) -> Result<bool> {
        Ok(self.load()?.find_by_name(name).is_some())
    }

    fn insert(
        &mut self,
        mut job: JobDefinition,
        mut schedule: Option<Schedule>,
    ) -> Result<InsertedJob> {
        if let Some(parent) = self.registry_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ImportError::RegistryInsertFailed(format!(
                    "cannot create {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let lock = RegistryLock::acquire(&self.lock_path()).map_err(|e| {
            ImportError::RegistryInsertFailed(format!("cannot lock registry: {}", e))
        })?;
        debug!(lock = %lock.path().display(), "registry locked");

        // ロック取得前に読んだ内容は古い可能性があるため読み直す
        let mut document = read_document(&self.registry_path)?;
        if document.find_by_name(&job.name).is_some() {
            return Err(ImportError::DuplicateJobName(job.name));
        }

        let id = document.allocate_id()?;
        let db_path = self.allocate_db_path(id, &document);
        let id = id.to_string();

        job.id = Some(id.clone());
        job.db_path = Some(db_path.clone());
        if let Some(schedule) = schedule.as_mut() {
            schedule.tags.retain(|tag| !tag.starts_with("ID="));
            schedule.tags.push(format!("ID={}", id));
        }

        let inserted = InsertedJob {
            id,
            name: job.name.clone(),
            db_path,
        };
        document.jobs.push(RegistryEntry {
            job,
            schedule,
            imported_at: Utc::now(),
        });
        self.state = State::Modified;

        self.save(document)?;
        drop(lock);

        info!(
            id = %inserted.id,
            name = %inserted.name,
            registry = %self.registry_path.display(),
            "job registered"
        );
        Ok(inserted)
    }
}

/// レジストリファイルを読み込む（存在しなければ空）
fn read_document(path: &Path) -> Result<RegistryDocument> {
    match fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Ok(RegistryDocument::default()),
        Ok(content) => serde_json::from_str(&content).map_err(|e| ImportError::RegistryUnavailable {
            path: path.to_path_buf(),
            reason: format!("failed to parse registry: {}", e),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RegistryDocument::default()),
        Err(e) => Err(ImportError::RegistryUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

/// アトミックに書き込む（一時ファイル + persist）
fn write_document(path: &Path, document: &RegistryDocument) -> Result<()> {
    let insert_failed = |what: &str, e: &dyn std::fmt::Display| {
        ImportError::RegistryInsertFailed(format!("{}: {}", what, e))
    };

    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut temp_file =
        NamedTempFile::new_in(parent).map_err(|e| insert_failed("failed to create temp file", &e))?;

    let content = serde_json::to_string_pretty(document)
        .map_err(|e| insert_failed("failed to serialize registry", &e))?;
    temp_file
        .write_all(content.as_bytes())
        .and_then(|_| temp_file.as_file().sync_all())
        .map_err(|e| insert_failed("failed to write registry", &e))?;

    temp_file
        .persist(path)
        .map_err(|e| insert_failed("failed to persist registry", &e.error))?;
    Ok(())
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
