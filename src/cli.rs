use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Parser, Debug)]
#[command(name = "scout")]
#[command(about = "Search apps, commands and the web from one box", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to <config dir>/Scout/config.toml)
    #[arg(long, value_name = "PATH", env = "SCOUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run a single search, print the results and exit
    #[arg(short, long, value_name = "TEXT")]
    pub query: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_headless_query() {
        let cli = Cli::try_parse_from(["scout", "--query", "2 + 2", "-vv"]).expect("valid args");
        assert_eq!(cli.query.as_deref(), Some("2 + 2"));
        assert_eq!(cli.verbose, 2);
    }
}
