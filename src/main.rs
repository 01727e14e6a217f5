use clap::Parser;
use tracing_subscriber::EnvFilter;

use fileid_reconcile::{cli, web};

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("fileid_reconcile=debug,info")
    } else {
        EnvFilter::new("fileid_reconcile=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Consolidate(args) => {
            cli::consolidate::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Tree(args) => {
            cli::tree::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Serve(args) => {
            web::server::run(args)?;
        }
    }

    Ok(())
}
