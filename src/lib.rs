//! エクスポートされたバックアップジョブ構成のインポート

pub mod bundle;
pub mod cli;
pub mod commands;
pub mod config;
pub mod env;
pub mod error;
pub mod importer;
pub mod job;
pub mod output;
pub mod prompt;
pub mod registry;
pub mod storage;

#[cfg(test)]
mod testing;
