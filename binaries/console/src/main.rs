use anyhow::Result;
use clap::Parser;
use dt_console::{
    config::{ConsoleArgs, ConsoleConfig},
    logging::init_logging,
    run_console,
};

fn main() -> Result<()> {
    let args = ConsoleArgs::parse();
    let config = ConsoleConfig::try_from(args)?;
    init_logging(config.log_file.as_deref())?;
    run_console(config)
}
