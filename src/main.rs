use clap::Parser;
use job_importer::cli::{argument_error, Cli};
use job_importer::commands;
use job_importer::error::{ErrorFormatter, ImportError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help / --version
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => fail(&ErrorFormatter::new(false), argument_error(&err)),
    };
    init_logging(cli.verbose);
    let formatter = ErrorFormatter::new(cli.verbose > 0);

    if let Err(err) = commands::dispatch(cli) {
        fail(&formatter, err);
    }
}

fn fail(formatter: &ErrorFormatter, err: ImportError) -> ! {
    eprintln!("{}", formatter.format(&err.to_rich()));
    std::process::exit(err.exit_code());
}

/// ログ出力を初期化（RUST_LOG があれば優先）
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
