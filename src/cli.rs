//! Command-line interface parsing for the IPO terminal
//!
//! This module handles parsing of CLI arguments using clap, including the
//! --view flag for opening directly in a specific screen and the cache
//! control flags.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified view name is not recognized
    #[error("Invalid view: '{0}'. Valid views: tracker, tools, academy")]
    InvalidView(String),
}

/// Screen the application can open in, as named on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewArg {
    /// The IPO tracker dashboard
    #[default]
    Tracker,
    /// The financial calculators
    Tools,
    /// The IPO academy and quiz
    Academy,
}

impl ViewArg {
    /// Parses user input into a ViewArg.
    ///
    /// Matching is case-insensitive and supports aliases:
    /// - "tracker" | "dash" | "dashboard" -> Tracker
    /// - "tools" | "calc" -> Tools
    /// - "academy" | "learn" -> Academy
    ///
    /// Returns `None` if the input doesn't match any view.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<ViewArg> {
        match s.to_lowercase().trim() {
            "tracker" | "dash" | "dashboard" => Some(ViewArg::Tracker),
            "tools" | "calc" => Some(ViewArg::Tools),
            "academy" | "learn" => Some(ViewArg::Academy),
            _ => None,
        }
    }
}

/// IPO terminal - track Indian IPOs, GMP, and subscriptions from the terminal
#[derive(Parser, Debug)]
#[command(name = "ipoterm")]
#[command(about = "Indian IPO tracking dashboard with calculators and academy")]
#[command(version)]
pub struct Cli {
    /// Open directly in a specific view
    ///
    /// Examples:
    ///   ipoterm --view tools      # Open the calculators
    ///   ipoterm --view academy    # Open the academy
    ///
    /// Valid views: tracker, tools, academy
    #[arg(long, value_name = "VIEW")]
    pub view: Option<String>,

    /// Bypass the cache and force a live fetch on startup
    #[arg(long)]
    pub force_refresh: bool,

    /// Never contact the live feed; serve cached or seed data only
    #[arg(long)]
    pub offline: bool,

    /// Override the on-disk store location (defaults to the XDG cache dir)
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    /// View to open in
    pub initial_view: ViewArg,
    /// Whether the first load bypasses the cache
    pub force_refresh: bool,
    /// Whether the live feed is disabled entirely
    pub offline: bool,
    /// Store directory override
    pub data_dir: Option<PathBuf>,
}

/// Parses a view string argument into a ViewArg.
///
/// # Returns
/// * `Ok(ViewArg)` if the string matches a valid view
/// * `Err(CliError::InvalidView)` if the string doesn't match
pub fn parse_view_arg(s: &str) -> Result<ViewArg, CliError> {
    ViewArg::from_str(s).ok_or_else(|| CliError::InvalidView(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if an invalid view was specified
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let initial_view = match &cli.view {
            None => ViewArg::default(),
            Some(view_str) => parse_view_arg(view_str)?,
        };

        Ok(StartupConfig {
            initial_view,
            force_refresh: cli.force_refresh,
            offline: cli.offline,
            data_dir: cli.data_dir.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view_arg_tracker_aliases() {
        assert_eq!(parse_view_arg("tracker").unwrap(), ViewArg::Tracker);
        assert_eq!(parse_view_arg("dash").unwrap(), ViewArg::Tracker);
        assert_eq!(parse_view_arg("dashboard").unwrap(), ViewArg::Tracker);
    }

    #[test]
    fn test_parse_view_arg_tools_aliases() {
        assert_eq!(parse_view_arg("tools").unwrap(), ViewArg::Tools);
        assert_eq!(parse_view_arg("calc").unwrap(), ViewArg::Tools);
    }

    #[test]
    fn test_parse_view_arg_academy_aliases() {
        assert_eq!(parse_view_arg("academy").unwrap(), ViewArg::Academy);
        assert_eq!(parse_view_arg("LEARN").unwrap(), ViewArg::Academy);
    }

    #[test]
    fn test_parse_view_arg_invalid() {
        let result = parse_view_arg("spreadsheet");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Invalid view"));
        assert!(err.to_string().contains("spreadsheet"));
    }

    #[test]
    fn test_startup_config_default() {
        let config = StartupConfig::default();
        assert_eq!(config.initial_view, ViewArg::Tracker);
        assert!(!config.force_refresh);
        assert!(!config.offline);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["ipoterm"]);
        assert!(cli.view.is_none());
        assert!(!cli.force_refresh);
        assert!(!cli.offline);
    }

    #[test]
    fn test_cli_parse_view_with_value() {
        let cli = Cli::parse_from(["ipoterm", "--view", "tools"]);
        assert_eq!(cli.view.as_deref(), Some("tools"));
    }

    #[test]
    fn test_cli_parse_flags() {
        let cli = Cli::parse_from(["ipoterm", "--force-refresh", "--offline"]);
        assert!(cli.force_refresh);
        assert!(cli.offline);
    }

    #[test]
    fn test_cli_parse_data_dir() {
        let cli = Cli::parse_from(["ipoterm", "--data-dir", "/tmp/ipoterm-test"]);
        assert_eq!(
            cli.data_dir.as_deref(),
            Some(std::path::Path::new("/tmp/ipoterm-test"))
        );
    }

    #[test]
    fn test_startup_config_from_cli_defaults() {
        let cli = Cli::parse_from(["ipoterm"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.initial_view, ViewArg::Tracker);
        assert!(!config.force_refresh);
    }

    #[test]
    fn test_startup_config_from_cli_with_view() {
        let cli = Cli::parse_from(["ipoterm", "--view", "academy"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.initial_view, ViewArg::Academy);
    }

    #[test]
    fn test_startup_config_from_cli_invalid_view() {
        let cli = Cli::parse_from(["ipoterm", "--view", "bogus"]);
        let result = StartupConfig::from_cli(&cli);
        assert!(result.is_err());
    }
}
