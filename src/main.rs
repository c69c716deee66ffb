use cep_chain::config::Config;
use cep_chain::lookup::LookupError;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// cep — Brazilian postal code lookup with provider fallback
///
/// Tries ViaCEP, BrasilAPI and OpenCEP in priority order until one
/// of them knows the CEP.
///
/// Examples:
///   cep 01310-930
///   cep 01310930 --providers brasilapi,opencep --timeout 5
///   cep --list-providers
///   cep --serve --port 8080
#[derive(Parser)]
#[command(name = "cep", version, about, long_about = None)]
struct Cli {
    /// CEP to resolve, with or without hyphen.
    #[arg(index = 1)]
    cep: Option<String>,

    /// Comma-separated provider ids (viacep, brasilapi, opencep).
    #[arg(long, value_delimiter = ',')]
    providers: Option<Vec<String>>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Config file. Defaults to ~/.cep/config.json.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the provider chain in resolution order and exit.
    #[arg(long)]
    list_providers: bool,

    /// Run the HTTP API instead of a single lookup.
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Log every step of the chain to stderr.
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // ── Configuration: file, then flags ─────────────────────────

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .with_overrides(cli.providers.clone(), cli.timeout);

    let resolver = config.build_resolver();

    // ── Provider listing ────────────────────────────────────────

    if cli.list_providers {
        for (i, d) in resolver.descriptors().iter().enumerate() {
            println!(
                "{}. {:<10} priority={:<4} fallback={:<5} format={}",
                i + 1,
                d.name,
                d.priority,
                d.has_fallback,
                d.required_format,
            );
        }
        return;
    }

    // ── Server mode ─────────────────────────────────────────────

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("Error: Cannot start async runtime: {}", e);
            std::process::exit(1);
        });
        if let Err(e) = runtime.block_on(cep_chain::server::start(&cli.host, cli.port, resolver)) {
            eprintln!("Error: Server failed on {}:{}: {}", cli.host, cli.port, e);
            std::process::exit(1);
        }
        return;
    }

    // ── Single lookup ───────────────────────────────────────────

    let Some(cep) = cli.cep.as_deref() else {
        eprintln!("Error: No CEP specified.");
        eprintln!();
        eprintln!("Usage:");
        eprintln!("  cep 01310-930");
        eprintln!("  cep --list-providers");
        eprintln!("  cep --serve --port 8080");
        std::process::exit(2);
    };

    match resolver.lookup(cep) {
        Ok(record) => {
            eprintln!("  \u{1F4CD} {}", record.display_line());
            match serde_json::to_string_pretty(&record) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e @ LookupError::InvalidCep(_)) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
