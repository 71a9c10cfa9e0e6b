//! rdap - command line RDAP lookups
//!
//! Resolves a domain, IP address or AS number through the RDAP bootstrap
//! service and prints the registry's record as JSON.

use anyhow::Context;
use rdap_query::{invalid_argument, Document, QueryOptions, QueryType, RdapClient, RdapError};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

/// Parsed command line
#[derive(Debug)]
struct Command {
    query_type: QueryType,
    identifier: String,
    options: QueryOptions,
    verbose: bool,
}

/// What the command line asks for
#[derive(Debug)]
enum Action {
    Help,
    Version,
    Lookup(Command),
}

#[tokio::main]
async fn main() {
    // Initialize the library
    if let Err(e) = rdap_query::init() {
        eprintln!("❌ Failed to initialize: {}", e);
        process::exit(1);
    }

    let args: Vec<String> = env::args().skip(1).collect();

    let command = match parse_args(&args) {
        Ok(Action::Lookup(command)) => command,
        Ok(Action::Help) => {
            print_help();
            return;
        }
        Ok(Action::Version) => {
            println!("rdap {}", rdap_query::VERSION);
            return;
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            process::exit(2);
        }
    };

    init_logging(command.verbose);

    let document = match run(&command).await {
        Ok(document) => document,
        Err(e) => {
            eprintln!("{}", e.user_message());
            process::exit(if e.is_caller_error() { 2 } else { 1 });
        }
    };

    if let Err(e) = print_document(&document) {
        eprintln!("❌ {:#}", e);
        process::exit(1);
    }
}

/// Install the stderr log subscriber; `RUST_LOG` wins over `--verbose`
fn init_logging(verbose: bool) {
    let default_level = if verbose { "rdap_query=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Flag values are consumed with their flag, so `-H -h` is a header, not a help request
fn parse_args(args: &[String]) -> rdap_query::Result<Action> {
    if args.is_empty() {
        return Ok(Action::Help);
    }

    let mut positional = Vec::new();
    let mut config: Option<String> = None;
    let mut server: Option<String> = None;
    let mut timeout: Option<String> = None;
    let mut max_redirects: Option<String> = None;
    let mut headers: Vec<String> = Vec::new();
    let mut verbose = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--server" | "-s" => server = Some(flag_value(arg, iter.next())?),
            "--timeout" | "-t" => timeout = Some(flag_value(arg, iter.next())?),
            "--max-redirects" => max_redirects = Some(flag_value(arg, iter.next())?),
            "--header" | "-H" => headers.push(flag_value(arg, iter.next())?),
            "--config" | "-c" => config = Some(flag_value(arg, iter.next())?),
            "--verbose" | "-v" => verbose = true,
            "--help" | "-h" => return Ok(Action::Help),
            "--version" | "-V" => return Ok(Action::Version),
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(invalid_argument!("unknown option: {}", flag));
            }
            _ => positional.push(arg.clone()),
        }
    }

    let (query_type, identifier) = match positional.as_slice() {
        [query_type, identifier] => (query_type.parse::<QueryType>()?, identifier.clone()),
        _ => {
            return Err(invalid_argument!(
                "expected <domain|ip|autnum> <IDENTIFIER>, got {} argument(s)",
                positional.len()
            ))
        }
    };

    let mut options = match config {
        Some(path) => QueryOptions::from_file(path)?,
        None => QueryOptions::from_env()?,
    };

    if let Some(server) = server {
        options.server = server;
    }
    if let Some(timeout) = timeout {
        options.timeout = rdap_query::types::parse_timeout(&timeout)?;
    }
    if let Some(max_redirects) = max_redirects {
        options.max_redirects = max_redirects
            .parse()
            .map_err(|_| invalid_argument!("--max-redirects is not a number: {}", max_redirects))?;
    }
    for header in headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| invalid_argument!("header must look like 'Name: value', got '{}'", header))?;
        options.headers.insert(name.trim().to_string(), value.trim().to_string());
    }

    Ok(Action::Lookup(Command {
        query_type,
        identifier,
        options,
        verbose,
    }))
}

fn flag_value(flag: &str, value: Option<&String>) -> rdap_query::Result<String> {
    value
        .cloned()
        .ok_or_else(|| RdapError::invalid_argument(format!("{} requires a value", flag)))
}

async fn run(command: &Command) -> rdap_query::Result<Document> {
    let client = RdapClient::new()?;
    client
        .lookup(&command.identifier, command.query_type, &command.options)
        .await
}

fn print_document(document: &Document) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(document).context("Failed to render RDAP document")?;
    println!("{}", rendered);
    Ok(())
}

/// Print help information
fn print_help() {
    println!("rdap - Registration Data Access Protocol lookups");
    println!();
    println!("USAGE:");
    println!("    rdap <domain|ip|autnum> <IDENTIFIER> [OPTIONS]");
    println!();
    println!("EXAMPLES:");
    println!("    rdap domain google.com");
    println!("    rdap ip 2620:119:35::35");
    println!("    rdap autnum 16276");
    println!("    rdap domain google.com --server https://rdap.verisign.com/com/v1");
    println!();
    println!("OPTIONS:");
    println!("    -s, --server <URL>        Base server (default: {})", rdap_query::BOOTSTRAP_SERVER);
    println!("    -t, --timeout <SECS>      Connect and read timeout (default: 5)");
    println!("        --max-redirects <N>   Redirects to follow (default: 5)");
    println!("    -H, --header <H: V>       Extra request header, may repeat");
    println!("    -c, --config <FILE>       JSON options file");
    println!("    -v, --verbose             Log requests and redirects to stderr");
    println!("    -h, --help                Print help");
    println!("    -V, --version             Print version");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("    RDAP_SERVER         Base server");
    println!("    RDAP_TIMEOUT        Timeout in seconds");
    println!("    RDAP_MAX_REDIRECTS  Redirect budget");
    println!("    RDAP_USER_AGENT     User-Agent header");
    println!("    RUST_LOG            Log filter");
}
