//! Integration tests for CLI argument handling
//!
//! Tests the --view flag, cache control flags, and view parsing from the
//! command line.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_ipoterm"))
        .args(args)
        .output()
        .expect("Failed to execute ipoterm")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ipoterm"), "Help should mention ipoterm");
    assert!(stdout.contains("view"), "Help should mention --view flag");
    assert!(
        stdout.contains("force-refresh"),
        "Help should mention --force-refresh flag"
    );
}

#[test]
fn test_version_flag_exits_successfully() {
    let output = run_cli(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ipoterm"));
}

#[test]
fn test_invalid_view_prints_error_and_exits() {
    let output = run_cli(&["--view", "spreadsheet"]);
    assert!(!output.status.success(), "Expected invalid view to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid") || stderr.contains("invalid") || stderr.contains("unknown"),
        "Should print error message about invalid view: {}",
        stderr
    );
}

#[test]
fn test_view_tools_is_valid() {
    // This test just verifies the argument is accepted (doesn't error immediately)
    // The actual state transition is tested in unit tests
    let output = run_cli(&["--view", "tools", "--help"]);
    // With --help, it should succeed regardless of other flags
    // This is a workaround since we can't easily test TUI apps
    assert!(output.status.success());
}

#[test]
fn test_offline_flag_is_valid() {
    let output = run_cli(&["--offline", "--help"]);
    assert!(output.status.success());
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use ipoterm::cli::{parse_view_arg, Cli, StartupConfig, ViewArg};

    #[test]
    fn test_cli_no_args_returns_none_view() {
        let cli = Cli::parse_from(["ipoterm"]);
        assert!(cli.view.is_none());
        assert!(!cli.force_refresh);
        assert!(!cli.offline);
        assert!(cli.data_dir.is_none());
    }

    #[test]
    fn test_cli_view_flag_with_tools() {
        let cli = Cli::parse_from(["ipoterm", "--view", "tools"]);
        assert_eq!(cli.view.as_deref(), Some("tools"));
    }

    #[test]
    fn test_cli_view_flag_with_academy() {
        let cli = Cli::parse_from(["ipoterm", "--view", "academy"]);
        assert_eq!(cli.view.as_deref(), Some("academy"));
    }

    #[test]
    fn test_parse_view_arg_tools_returns_tools() {
        let result = parse_view_arg("tools");
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), ViewArg::Tools);
    }

    #[test]
    fn test_parse_view_arg_dash_returns_tracker() {
        let result = parse_view_arg("dash");
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), ViewArg::Tracker);
    }

    #[test]
    fn test_parse_view_arg_invalid_returns_error() {
        let result = parse_view_arg("spreadsheet");
        assert!(result.is_err());
    }

    #[test]
    fn test_startup_config_default_is_tracker() {
        let config = StartupConfig::default();
        assert_eq!(config.initial_view, ViewArg::Tracker);
        assert!(!config.force_refresh);
        assert!(!config.offline);
    }

    #[test]
    fn test_startup_config_from_cli_flags() {
        let cli = Cli::parse_from(["ipoterm", "--force-refresh", "--offline"]);
        let config = StartupConfig::from_cli(&cli);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert!(config.force_refresh);
        assert!(config.offline);
    }

    #[test]
    fn test_startup_config_from_cli_with_view() {
        let cli = Cli::parse_from(["ipoterm", "--view", "learn"]);
        let config = StartupConfig::from_cli(&cli);
        assert!(config.is_ok());
        assert_eq!(config.unwrap().initial_view, ViewArg::Academy);
    }

    #[test]
    fn test_startup_config_from_cli_with_invalid_view() {
        let cli = Cli::parse_from(["ipoterm", "--view", "spreadsheet"]);
        let config = StartupConfig::from_cli(&cli);
        assert!(config.is_err());
    }

    #[test]
    fn test_startup_config_from_cli_with_data_dir() {
        let cli = Cli::parse_from(["ipoterm", "--data-dir", "/tmp/ipoterm-int-test"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(
            config.data_dir.as_deref(),
            Some(std::path::Path::new("/tmp/ipoterm-int-test"))
        );
    }
}
