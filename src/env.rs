//! 環境変数ユーティリティ

use std::path::PathBuf;

pub struct EnvVar;

impl EnvVar {
    /// 環境変数を取得（空文字列はNoneとして扱う）
    pub fn get(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.is_empty())
    }

    /// パスとして取得
    pub fn path(key: &str) -> Option<PathBuf> {
        std::env::var_os(key)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }

    /// ホームディレクトリ
    pub fn home_dir() -> Option<PathBuf> {
        Self::path("HOME").or_else(|| Self::path("USERPROFILE"))
    }
}

#[cfg(test)]
#[path = "env_test.rs"]
mod tests;
