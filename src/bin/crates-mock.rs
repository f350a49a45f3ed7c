//! crates-mock binary.
//!
//! Runs the mock registry over HTTP and exposes a few inspection commands.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crates_mock::cli::{Cli, Command};
use crates_mock::mock_server::{make_server, Fixtures, Injection, MockServer};
use crates_mock::output::{PrettyPrint, RouteRow, VersionRow};
use crates_mock::{CratePage, DocsRsClient, Fetch, HttpFetcher, ServerConfig};
use serde_json::{json, Map, Value};
use tabled::Table;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> crates_mock::Result<()> {
    match cli.command {
        Command::Serve {
            addr,
            config,
            empty,
        } => handle_serve(addr, config.as_deref(), empty).await,
        Command::Routes => handle_routes(cli.json),
        Command::Show {
            krate,
            version,
            live_docs,
        } => handle_show(&krate, version.as_deref(), live_docs, cli.json).await,
        Command::DocsLink {
            krate,
            version,
            documentation,
            timeout,
        } => handle_docs_link(&krate, &version, documentation.as_deref(), timeout, cli.json).await,
    }
}

/// Parse a configuration override. Anything but a JSON object is ignored.
fn parse_config(raw: Option<&str>) -> crates_mock::Result<Option<Map<String, Value>>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(Some(map)),
        other => {
            tracing::warn!(value = %other, "configuration override is not an object, ignoring");
            Ok(None)
        }
    }
}

async fn handle_serve(
    addr: std::net::SocketAddr,
    config: Option<&str>,
    empty: bool,
) -> crates_mock::Result<()> {
    let injection = match parse_config(config)? {
        Some(config) => Injection::none().with_config(config),
        None => Injection::none(),
    };
    let server = make_server(ServerConfig::default(), injection);
    if !empty {
        *server.db().write().await = Fixtures::default_scenario();
    }

    let listening = server.listen_on(addr).await?;
    println!("Mock registry listening on {}", listening.url());

    tokio::signal::ctrl_c().await?;
    listening.shutdown().await;
    Ok(())
}

fn handle_routes(json: bool) -> crates_mock::Result<()> {
    let server = make_server(ServerConfig::test(), Injection::none());

    if json {
        let rules: Vec<Value> = server
            .routes()
            .signature()
            .into_iter()
            .map(|(method, pattern)| json!({ "method": method, "pattern": pattern }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&rules)?);
    } else {
        let rows: Vec<RouteRow> = server
            .routes()
            .iter()
            .enumerate()
            .map(|(i, rule)| RouteRow::new(i + 1, rule))
            .collect();
        println!("{}", Table::new(rows));
    }
    Ok(())
}

async fn handle_show(
    krate: &str,
    version: Option<&str>,
    live_docs: bool,
    json: bool,
) -> crates_mock::Result<()> {
    let server = Arc::new(mock_registry().await);
    let docs_fetcher: Arc<dyn Fetch> = if live_docs {
        Arc::new(HttpFetcher::new()?)
    } else {
        server.clone()
    };
    let docs_rs = DocsRsClient::new(docs_fetcher);

    let page = CratePage::visit(server.as_ref(), krate, version, &docs_rs).await?;
    let link = page.docs.settled().await;

    if json {
        let output = json!({
            "crate": page.krate,
            "version": page.version,
            "documentation_link": link,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", page.pretty_print());
        let rows: Vec<VersionRow> = page.versions.iter().map(VersionRow::from).collect();
        println!("{}", Table::new(rows));
    }
    Ok(())
}

async fn handle_docs_link(
    krate: &str,
    version: &str,
    documentation: Option<&str>,
    timeout: u64,
    json: bool,
) -> crates_mock::Result<()> {
    let docs_rs = DocsRsClient::new(Arc::new(HttpFetcher::new()?))
        .with_timeout(Duration::from_secs(timeout));
    let link = docs_rs.resolve(krate, version, documentation).await;

    if json {
        println!("{}", json!({ "documentation_link": link }));
    } else {
        match link {
            Some(link) => println!("{link}"),
            None => eprintln!("No documentation link for {krate} {version}"),
        }
    }
    Ok(())
}

/// The sample registry, answering without simulated latency.
async fn mock_registry() -> MockServer {
    let server = make_server(ServerConfig::test(), Injection::none());
    *server.db().write().await = Fixtures::default_scenario();
    server
}
