//! job-import コマンド
//!
//! エクスポートされた構成バンドルをジョブレジストリに登録し、
//! ローカルデータベースを作成する。

use crate::config::{parse_bool, parse_options, ImportConfig};
use crate::error::Result;
use crate::importer::{ImportRequest, Importer};
use crate::output::ImportSummary;
use crate::prompt;
use crate::registry::JsonJobRegistry;
use crate::storage::SqliteProvisioner;
use clap::ArgAction;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

const PASSPHRASE_PROMPT: &str = "Enter passphrase: ";

#[derive(Debug, Parser)]
pub struct Args {
    /// Exported configuration bundle (plain JSON or encrypted)
    #[arg(value_name = "BUNDLE")]
    pub bundle: PathBuf,

    /// Keep the job metadata stored in the bundle
    #[arg(
        long = "import-metadata",
        value_name = "BOOL",
        required = true,
        action = ArgAction::Set,
        value_parser = parse_bool_arg
    )]
    pub import_metadata: bool,

    /// Advanced options (`key=value` or `--key=value`)
    #[arg(value_name = "KEY=VALUE", allow_hyphen_values = true, trailing_var_arg = true)]
    pub options: Vec<String>,
}

fn parse_bool_arg(value: &str) -> std::result::Result<bool, String> {
    parse_bool(value).ok_or_else(|| format!("expected true or false, got '{}'", value))
}

pub fn run(args: Args) -> Result<()> {
    let options = parse_options(&args.options)?;
    let config = ImportConfig::resolve(&options)?;
    debug!(
        registry = %config.registry_path.display(),
        jobs = %config.jobs_folder.display(),
        "configuration resolved"
    );

    let registry = JsonJobRegistry::new(config.registry_path, config.jobs_folder);
    let mut importer = Importer::new(registry, SqliteProvisioner::new());
    let request = ImportRequest {
        bundle_path: args.bundle,
        strip_metadata: !args.import_metadata,
    };

    let outcome =
        importer.import_configuration(&request, || prompt::read_secret(PASSPHRASE_PROMPT))?;

    println!(
        "{}",
        ImportSummary::format(&outcome, ImportSummary::stdout_supports_color())
    );
    Ok(())
}

#[cfg(test)]
#[path = "import_test.rs"]
mod tests;
