use std::io::IsTerminal;
use std::sync::OnceLock;

use owo_colors::OwoColorize;
use regex::Regex;

use super::rich::RichError;

/// One rendered line and how it should be styled
enum Line {
    Headline { code: String, message: String },
    Context(String),
    Cause(String),
    Remediation(Vec<String>),
    Warning(String),
    Note(String),
}

/// Renders a RichError for the terminal
///
/// The default form is a single `error[CODE]: message` line. Verbose mode
/// appends context, cause and remediation. Credentials are masked in every form.
pub struct ErrorFormatter {
    verbose: bool,
    use_color: bool,
}

impl ErrorFormatter {
    pub fn new(verbose: bool) -> Self {
        Self::with_color_detection(verbose, stderr_supports_color)
    }

    pub fn with_color_detection(verbose: bool, detect_color: fn() -> bool) -> Self {
        Self {
            verbose,
            use_color: detect_color(),
        }
    }

    pub fn format(&self, error: &RichError) -> String {
        self.lines(error)
            .into_iter()
            .map(|line| self.render(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn lines(&self, error: &RichError) -> Vec<Line> {
        // collaborators may hand back multi-line reasons
        let message = error.message().lines().collect::<Vec<_>>().join(" ");
        let mut lines = vec![Line::Headline {
            code: error.code().to_string(),
            message: mask_sensitive(&message),
        }];
        if !self.verbose {
            return lines;
        }

        lines.extend(
            error
                .context()
                .lines()
                .map(|(label, value)| Line::Context(format!("{}: {}", label, mask_sensitive(value)))),
        );
        lines.push(Line::Cause(error.code().cause().to_string()));
        lines.push(Line::Remediation(
            error
                .code()
                .remediation()
                .iter()
                .map(|step| step.to_string())
                .collect(),
        ));
        if error.orphaned() {
            lines.push(Line::Warning(
                "the registry entry was kept without a local database".to_string(),
            ));
        }
        lines.push(Line::Note(
            "use `job-import --help` for more information".to_string(),
        ));
        lines
    }

    fn render(&self, line: Line) -> String {
        let color = self.use_color;
        match line {
            Line::Headline { code, message } => {
                let prefix = format!("error[{}]", code);
                if color {
                    format!("{}: {}", prefix.red().bold(), message.bold())
                } else {
                    format!("{}: {}", prefix, message)
                }
            }
            Line::Context(text) => {
                let text = format!("  --> {}", text);
                paint(color, text, |t| t.blue().to_string())
            }
            Line::Cause(text) => {
                let text = format!("  |\n  | Cause: {}", text);
                paint(color, text, |t| t.yellow().to_string())
            }
            Line::Remediation(steps) => {
                let mut text = String::from("  |\n  | Remediation:");
                for (i, step) in steps.iter().enumerate() {
                    text.push_str(&format!("\n  |   {}. {}", i + 1, step));
                }
                paint(color, text, |t| t.green().to_string())
            }
            Line::Warning(text) => {
                let text = format!("  = warning: {}", text);
                paint(color, text, |t| t.magenta().to_string())
            }
            Line::Note(text) => {
                let text = format!("  = note: {}", text);
                paint(color, text, |t| t.dimmed().to_string())
            }
        }
    }
}

fn paint(color: bool, text: String, style: impl Fn(&str) -> String) -> String {
    if color {
        text.lines().map(&style).collect::<Vec<_>>().join("\n")
    } else {
        text
    }
}

fn stderr_supports_color() -> bool {
    std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Masks credentials that target URLs and job settings tend to carry
fn mask_sensitive(text: &str) -> String {
    static QUERY: OnceLock<Regex> = OnceLock::new();
    static PASSPHRASE: OnceLock<Regex> = OnceLock::new();

    // ?auth-username=bob&auth-password=xxx -> ?auth-username=***&auth-password=***
    let query = QUERY
        .get_or_init(|| Regex::new(r"([?&])([^=&\s]+)=([^&\s]+)").expect("static pattern"));
    let passphrase = PASSPHRASE.get_or_init(|| {
        Regex::new(r"(?i)(passphrase\s*[=:]\s*)[^\s,;]+").expect("static pattern")
    });

    let masked = query.replace_all(text, "$1$2=***");
    passphrase.replace_all(&masked, "${1}***").into_owned()
}
