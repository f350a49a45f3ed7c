//! CLI argument parsing tests.

use clap::Parser;
use crates_mock::cli::{Cli, Command, DEFAULT_ADDR};

#[test]
fn test_cli_parses_serve_defaults() {
    let cli = Cli::parse_from(["crates-mock", "serve"]);

    assert!(!cli.json);
    match cli.command {
        Command::Serve { addr, empty, .. } => {
            assert_eq!(addr.to_string(), DEFAULT_ADDR);
            assert!(!empty);
        }
        _ => panic!("Expected Serve command"),
    }
}

#[test]
fn test_cli_parses_serve_config() {
    let cli = Cli::parse_from([
        "crates-mock",
        "serve",
        "--addr",
        "0.0.0.0:8888",
        "--config",
        r#"{"timing":0}"#,
        "--empty",
    ]);

    match cli.command {
        Command::Serve {
            addr,
            config,
            empty,
        } => {
            assert_eq!(addr.port(), 8888);
            assert_eq!(config.as_deref(), Some(r#"{"timing":0}"#));
            assert!(empty);
        }
        _ => panic!("Expected Serve command"),
    }
}

#[test]
fn test_cli_parses_docs_link() {
    let cli = Cli::parse_from([
        "crates-mock",
        "docs-link",
        "serde",
        "1.0.0",
        "--documentation",
        "https://docs.rs/serde",
    ]);

    match cli.command {
        Command::DocsLink {
            krate,
            version,
            documentation,
            timeout,
        } => {
            assert_eq!(krate, "serde");
            assert_eq!(version, "1.0.0");
            assert_eq!(documentation.as_deref(), Some("https://docs.rs/serde"));
            assert_eq!(timeout, 10);
        }
        _ => panic!("Expected DocsLink command"),
    }
}

#[test]
fn test_cli_parses_show() {
    let cli = Cli::parse_from(["crates-mock", "show", "foo", "--version", "0.6.2", "--json"]);

    assert!(cli.json);
    match cli.command {
        Command::Show {
            krate,
            version,
            live_docs,
        } => {
            assert_eq!(krate, "foo");
            assert_eq!(version.as_deref(), Some("0.6.2"));
            assert!(!live_docs);
        }
        _ => panic!("Expected Show command"),
    }
}

#[test]
fn test_global_json_flag() {
    let cli = Cli::parse_from(["crates-mock", "--json", "routes"]);
    assert!(cli.json);

    let cli = Cli::parse_from(["crates-mock", "routes", "--json"]);
    assert!(cli.json);
}

#[test]
fn test_docs_link_requires_version() {
    let result = Cli::try_parse_from(["crates-mock", "docs-link", "serde"]);
    assert!(result.is_err());
}
