use crate::cli::Cli;
use crate::error::Result;

pub mod import;

pub fn dispatch(cli: Cli) -> Result<()> {
    import::run(cli.args)
}
