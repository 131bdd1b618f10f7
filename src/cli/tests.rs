//! Unit tests for CLI commands

use crate::cli::{Cli, Commands};
use clap::Parser;

#[test]
fn test_serve_command_with_addr() {
    let cli = Cli::try_parse_from(["nsrouter", "serve", "--addr", "127.0.0.1:9999"]).unwrap();

    match cli.command {
        Commands::Serve { addr, no_health } => {
            assert_eq!(addr.as_deref(), Some("127.0.0.1:9999"));
            assert!(!no_health);
        }
        Commands::Routes => panic!("Expected Serve command"),
    }
}

#[test]
fn test_serve_no_health_flag() {
    let cli = Cli::try_parse_from(["nsrouter", "serve", "--no-health"]).unwrap();
    assert!(matches!(cli.command, Commands::Serve { no_health: true, .. }));
}

#[test]
fn test_routes_command() {
    let cli = Cli::try_parse_from(["nsrouter", "routes"]).unwrap();
    assert!(matches!(cli.command, Commands::Routes));
}

#[test]
fn test_unknown_command_rejected() {
    assert!(Cli::try_parse_from(["nsrouter", "generate"]).is_err());
}
