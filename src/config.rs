//! インポート設定
//!
//! 優先順位: `KEY=VALUE` オプション > 環境変数 > `$HOME`

use crate::env::EnvVar;
use crate::error::{ImportError, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

/// データフォルダを指定する環境変数
pub const DATAFOLDER_ENV: &str = "JOB_IMPORT_DATAFOLDER";
/// パスフレーズを指定する環境変数
pub const PASSPHRASE_ENV: &str = "JOB_IMPORT_PASSPHRASE";

const DEFAULT_DATAFOLDER: &str = ".job-import";
const REGISTRY_FILE: &str = "registry.json";
const JOBS_DIR: &str = "jobs";

const KEY_DATAFOLDER: &str = "server-datafolder";
const KEY_REGISTRY_PATH: &str = "registry-path";
const KEY_JOBS_FOLDER: &str = "jobs-folder";

/// 真偽値をパース（大文字小文字を区別しない）
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// `KEY=VALUE` 形式の引数をパース
///
/// キー先頭の `-` は取り除き、小文字に正規化する。同じキーは後勝ち。
/// 区切りの `--` は読み飛ばす。
pub fn parse_options<I, S>(args: I) -> Result<BTreeMap<String, String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = BTreeMap::new();
    for arg in args {
        let arg = arg.as_ref();
        if arg == "--" {
            continue;
        }
        let (key, value) = arg.split_once('=').ok_or_else(|| {
            ImportError::Argument(format!("expected KEY=VALUE, got '{}'", arg))
        })?;
        let key = key.trim().trim_start_matches('-').to_ascii_lowercase();
        if key.is_empty() {
            return Err(ImportError::Argument(format!("missing option name in '{}'", arg)));
        }
        options.insert(key, value.to_string());
    }
    Ok(options)
}

/// 解決済みのインポート設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub datafolder: PathBuf,
    pub registry_path: PathBuf,
    pub jobs_folder: PathBuf,
}

impl ImportConfig {
    /// オプションと環境変数から設定を解決
    pub fn resolve(options: &BTreeMap<String, String>) -> Result<Self> {
        let option = |key: &str| {
            options
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };

        let datafolder = option(KEY_DATAFOLDER)
            .or_else(|| EnvVar::path(DATAFOLDER_ENV))
            .or_else(|| EnvVar::home_dir().map(|home| home.join(DEFAULT_DATAFOLDER)))
            .ok_or_else(|| {
                ImportError::Argument(format!(
                    "cannot determine the data folder; set {} or pass {}=<dir>",
                    DATAFOLDER_ENV, KEY_DATAFOLDER
                ))
            })?;
        let datafolder = absolute(datafolder)?;

        let registry_path = match option(KEY_REGISTRY_PATH) {
            Some(path) => absolute(path)?,
            None => datafolder.join(REGISTRY_FILE),
        };
        let jobs_folder = match option(KEY_JOBS_FOLDER) {
            Some(path) => absolute(path)?,
            None => datafolder.join(JOBS_DIR),
        };

        for key in options.keys().filter(|k| !is_known_key(k)) {
            debug!(option = %key, "ignoring unrecognized option");
        }

        Ok(Self {
            datafolder,
            registry_path,
            jobs_folder,
        })
    }
}

/// 相対パスを作業ディレクトリ基準の絶対パスにする
///
/// レジストリに記録するパスは別のディレクトリから起動した利用者にも有効でなければならない。
fn absolute(path: PathBuf) -> Result<PathBuf> {
    std::path::absolute(&path).map_err(|e| {
        ImportError::Argument(format!("cannot resolve {}: {}", path.display(), e))
    })
}

fn is_known_key(key: &str) -> bool {
    matches!(key, KEY_DATAFOLDER | KEY_REGISTRY_PATH | KEY_JOBS_FOLDER)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
