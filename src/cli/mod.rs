//! Terminal front-end.
//!
//! - Argument parsing
//! - Version and help output
//! - Incremental printing of streaming turns
//! - The interactive session loop
//!
//! # Usage
//!
//! ```ignore
//! use searchstream::cli::{parse_args, run, CliCommand};
//!
//! match parse_args(std::env::args())? {
//!     CliCommand::Ask(options) => runtime.block_on(run(config, options.query))?,
//!     _ => {}
//! }
//! ```

pub mod args;
pub mod printer;
pub mod session;
pub mod version;

pub use args::{parse_args, ArgError, AskOptions, CliCommand, USAGE};
pub use printer::StreamPrinter;
pub use session::{ReplInput, Session};
pub use version::{handle_help_command, handle_version_command, version_string, VERSION};

use color_eyre::Result;

use crate::adapters::ReqwestTransport;
use crate::config::ClientConfig;
use crate::turn::TurnController;

/// Exit status used when Ctrl-C arrives with no turn running.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Map Ctrl-C to cancelling the running turn; exit when idle.
fn setup_interrupt_handler(controller: TurnController) {
    // Ignore errors if a handler is already installed
    let _ = ctrlc::set_handler(move || {
        if !controller.cancel() {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
}

/// Ask `query` once, or run the interactive loop on stdin when `None`.
pub async fn run(config: ClientConfig, query: Option<String>) -> Result<()> {
    tracing::info!(
        endpoint = %config.endpoint(),
        profile = config.profile.as_str(),
        "Starting session"
    );
    let transport = ReqwestTransport::from_config(&config)?;
    let controller = TurnController::from_transport(transport).with_top_k(config.request_top_k());
    setup_interrupt_handler(controller.clone());

    let mut session = Session::new(controller);
    let mut stdout = std::io::stdout();
    match query {
        Some(query) => {
            let snapshot = session.ask(&query, &mut stdout).await?;
            if snapshot.failure().is_some_and(|f| f.is_user_visible_failure()) {
                std::process::exit(1);
            }
            Ok(())
        }
        None => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            session.run_repl(stdin, &mut stdout).await
        }
    }
}
