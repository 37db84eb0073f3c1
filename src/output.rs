//! 成功時の標準出力

use crate::importer::ImportOutcome;
use owo_colors::OwoColorize;
use std::io::IsTerminal;

/// インポート結果の 1 行表示
pub struct ImportSummary {
    pub prefix: Option<String>,
    pub message: String,
}

impl ImportSummary {
    pub fn format(outcome: &ImportOutcome, color: bool) -> Self {
        let message = format!(
            "Imported \"{}\" with ID {} and local database at {}.",
            outcome.name,
            outcome.id,
            outcome.db_path.display()
        );
        let prefix = color.then(|| "✓".green().to_string());
        Self { prefix, message }
    }

    /// 標準出力が端末で NO_COLOR が未設定なら色付け
    pub fn stdout_supports_color() -> bool {
        std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
    }
}

impl std::fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{} {}", prefix, self.message),
            None => f.write_str(&self.message),
        }
    }
}
