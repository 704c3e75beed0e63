use anyhow::{Context, Result};
use tracing::error;

use relaygate_core::cli::{self, Cli};
use relaygate_core::{ProxyServer, RelayError};

fn main() {
    let cli = cli::parse_or_exit(std::env::args_os());

    if let Err(e) = relaygate_core::logging::init(cli.verbose) {
        eprintln!("relaygate: {e:#}");
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        match e.downcast_ref::<RelayError>() {
            Some(err) if cli::is_usage_error(err) => {
                eprintln!("error: {err}\n\n{}", cli::usage());
            }
            _ => error!("{:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = cli.into_settings().context("invalid arguments")?;
    let server = ProxyServer::bind(settings).context("failed to set up listeners")?;
    let handle = server.start().context("failed to start relay threads")?;
    handle.join().context("relay stopped")
}
