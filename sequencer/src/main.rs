use anyhow::Result;
use clap::Parser;
use sequencer::cli::{Cli, Commands};
use sequencer::{commands, Sequencer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let seq = Sequencer::load(cli.vault.clone(), cli.quiet).await;

    match cli.command {
        Commands::Link(args) => commands::handle_link(args, seq).await?,
        Commands::Show(args) => commands::handle_show(args, seq).await?,
        Commands::Nav(args) => commands::handle_nav(args, seq).await?,
        Commands::Suggest(args) => commands::handle_suggest(args, seq).await?,
        Commands::Config(args) => commands::handle_config(args, seq).await?,
        Commands::Vault(args) => commands::handle_vault(args, seq).await?,
    }

    Ok(())
}

/// `RUST_LOG` wins over the verbosity flags when set.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
