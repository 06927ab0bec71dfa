//! Atlas CLI application
//!
//! Command-line client for the Atlas mapping-data API. Parsing, credential
//! checks and request execution all funnel their failures here: the only
//! place that prints a fatal message and sets the exit code.

use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use atlas_cli::auth::{CredentialStore, StoreConfig};
use atlas_cli::cli::{commands, expand_flag_prefixes, Cli, Commands};
use atlas_cli::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    // Single fatal print-and-exit site; server rejections already put
    // their error body on stderr, so only the exit code is left to set
    if let Err(e) = result {
        if !e.is_reported() {
            eprintln!("{}", e);
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Expand abbreviated long flags before clap sees the argv
    let argv: Vec<String> = std::env::args().collect();
    let argv = expand_flag_prefixes(&argv)?;
    let cli = Cli::parse_from(argv);

    init_logging(&cli);
    info!("Atlas CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let store = CredentialStore::new(StoreConfig::resolve()?);

    match cli.command {
        Commands::Login(args) => commands::handle_login(args, &store).await,
        Commands::ResetPassword(args) => commands::handle_reset_password(args, &store).await,
        Commands::Create(args) => commands::handle_create(args, &store).await,
        Commands::Download(args) => commands::handle_download(args, &store).await,
        Commands::List(args) => commands::handle_list(args, &store).await,
        Commands::Search(args) => commands::handle_search(args, &store).await,
        Commands::Invite(args) => commands::handle_invite(args, &store).await,
        Commands::Get(args) => commands::handle_get(args, &store).await,
        Commands::Edit(args) => commands::handle_edit(args, &store).await,
        Commands::Delete(args) => commands::handle_delete(args, &store).await,
    }
}

/// Initialize logging based on CLI verbosity settings
fn init_logging(cli: &Cli) {
    let log_level = cli.log_level();

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("atlas_cli={}", log_level).parse().unwrap());

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
