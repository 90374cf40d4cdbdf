use searchstream::cli::{
    handle_help_command, handle_version_command, parse_args, run, CliCommand, USAGE,
};
use searchstream::config::ClientConfig;
use searchstream::logging::init_logging;

use color_eyre::Result;

fn main() -> Result<()> {
    // Handle flags and argument errors before any initialization
    let options = match parse_args(std::env::args()) {
        Ok(CliCommand::Version) => handle_version_command(),
        Ok(CliCommand::Help) => handle_help_command(),
        Ok(CliCommand::Ask(options)) => options,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    color_eyre::install()?;
    init_logging();

    // Flags override environment, environment overrides defaults
    let config = options.apply(ClientConfig::from_env()?);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(config, options.query))
}
