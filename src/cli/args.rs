//! Command-line argument parsing.

use crate::config::{parse_positive, ClientConfig, ConfigError, Profile};

/// Usage text shown by `--help` and after argument errors.
pub const USAGE: &str = "\
Usage: searchstream [OPTIONS] [QUERY...]

Streams an answer for QUERY. Without a query, reads one query per line
from stdin.

Options:
  --url <URL>          Backend base URL (env: SEARCHSTREAM_URL)
  --profile <NAME>     summary | deep (env: SEARCHSTREAM_PROFILE)
  --top-k <N>          Search results for the summary backend (env: SEARCHSTREAM_TOP_K)
  -V, --version        Print version
  -h, --help           Print this help

Interactive commands:
  /show <channel>      Reprint the last answer from another channel
  /channels            List channels of the last answer
  /history             List previous queries
  /clear               Forget the history
  /quit                Exit";

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Ask one query, or run the interactive loop when no query was given
    Ask(AskOptions),
}

/// Options for asking questions; unset values leave the config untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AskOptions {
    pub url: Option<String>,
    pub profile: Option<Profile>,
    pub top_k: Option<u32>,
    /// Positional words joined by spaces
    pub query: Option<String>,
}

impl AskOptions {
    /// Layer the flags over a config built from defaults and environment.
    pub fn apply(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(url) = &self.url {
            config.base_url = Some(url.clone());
        }
        if let Some(profile) = self.profile {
            config.profile = profile;
        }
        if let Some(top_k) = self.top_k {
            config.top_k = Some(top_k);
        }
        config
    }
}

/// Argument errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArgError {
    #[error("missing value for {0}")]
    MissingValue(String),
    #[error("unknown option: {0}")]
    UnknownFlag(String),
    #[error(transparent)]
    InvalidValue(#[from] ConfigError),
}

/// Parse command-line arguments (including the program name).
///
/// # Examples
///
/// ```
/// use searchstream::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["searchstream".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), Ok(CliCommand::Version));
/// ```
pub fn parse_args<I>(args: I) -> Result<CliCommand, ArgError>
where
    I: Iterator<Item = String>,
{
    let mut options = AskOptions::default();
    let mut words: Vec<String> = Vec::new();
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        if !words.is_empty() || !arg.starts_with('-') || arg == "-" {
            words.push(arg);
            continue;
        }

        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |flag: &str| -> Result<String, ArgError> {
            inline
                .clone()
                .or_else(|| args.next())
                .ok_or_else(|| ArgError::MissingValue(flag.to_string()))
        };

        match flag.as_str() {
            "--version" | "-V" => return Ok(CliCommand::Version),
            "--help" | "-h" => return Ok(CliCommand::Help),
            "--url" => options.url = Some(value("--url")?),
            "--profile" => options.profile = Some(value("--profile")?.parse()?),
            "--top-k" => options.top_k = Some(parse_positive("--top-k", &value("--top-k")?)?),
            "--" => words.extend(args.by_ref()),
            _ => return Err(ArgError::UnknownFlag(arg)),
        }
    }

    let query = words.join(" ");
    if !query.trim().is_empty() {
        options.query = Some(query);
    }
    Ok(CliCommand::Ask(options))
}
