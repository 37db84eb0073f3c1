use crate::commands::import;
use crate::error::ImportError;
use clap::{ArgAction, Parser};

#[derive(Debug, Parser)]
#[command(name = "job-import", version)]
#[command(about = "Import an exported backup job configuration", long_about = None)]
#[command(after_help = "\
OPTIONS (KEY=VALUE or --KEY=VALUE, after --import-metadata):
  server-datafolder=<DIR>  Base folder for the registry and local databases
                           (default: $JOB_IMPORT_DATAFOLDER, else ~/.job-import)
  registry-path=<FILE>     Job registry file (default: <DIR>/registry.json)
  jobs-folder=<DIR>        Local database folder (default: <DIR>/jobs)

ENVIRONMENT:
  JOB_IMPORT_PASSPHRASE    Passphrase for encrypted bundles (skips the prompt)")]
pub struct Cli {
    #[command(flatten)]
    pub args: import::Args,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// clap の解析エラーを 1 行の引数エラーに変換
///
/// clap の表示は複数行（使い方の案内付き）なので見出し行だけを残す。
/// 見出しが `:` で終わる場合は続く項目を連結する。
pub fn argument_error(err: &clap::Error) -> ImportError {
    let rendered = err.render().to_string();
    let mut lines = rendered
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty());
    let headline = lines.next().unwrap_or("invalid arguments");
    let headline = headline.strip_prefix("error:").unwrap_or(headline).trim();

    let message = match headline.strip_suffix(':') {
        Some(head) => {
            let items: Vec<_> = lines
                .take_while(|line| !line.starts_with("Usage:"))
                .collect();
            format!("{}: {}", head, items.join(", "))
        }
        None => headline.to_string(),
    };
    ImportError::Argument(message)
}
