//! Command line interface.
//!
//! Argument syntax errors are reported by clap. Addresses are only resolved
//! in [`Cli::into_settings`], so a well-formed but unresolvable address
//! fails there and is reported with [`usage`].

use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::config::{resolve_endpoint, ProxySettings, DEFAULT_BUFFER_SIZE, DEFAULT_IO_THREADS};
use crate::error::{RelayError, Result};
use crate::poll::PollerKind;

#[derive(Parser, Debug)]
#[command(
    name = "relaygate",
    version,
    about = "Relay TCP connections from local listen addresses to one remote endpoint"
)]
pub struct Cli {
    /// Local address to listen on (repeatable)
    #[arg(short = 'l', value_name = "HOST:PORT", required = true)]
    pub listen: Vec<String>,

    /// Remote address to relay to
    #[arg(short = 'r', value_name = "HOST:PORT")]
    pub remote: String,

    /// Staging buffer size per connection, in bytes
    #[arg(short = 'b', value_name = "BYTES", default_value_t = DEFAULT_BUFFER_SIZE, value_parser = parse_positive)]
    pub buffer_size: usize,

    /// Set TCP_NODELAY on client and remote sockets
    #[arg(short = 'n')]
    pub no_delay: bool,

    /// Number of I/O threads
    #[arg(short = 't', value_name = "THREADS", default_value_t = DEFAULT_IO_THREADS, value_parser = parse_positive)]
    pub io_threads: usize,

    /// Pin I/O threads to CPU cores
    #[arg(short = 'p', long)]
    pub pin_threads: bool,

    /// Readiness backend (defaults to the platform's native one)
    #[arg(long, value_enum)]
    pub poller: Option<PollerArg>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PollerArg {
    Epoll,
    Kqueue,
    Poll,
}

impl From<PollerArg> for PollerKind {
    fn from(arg: PollerArg) -> Self {
        match arg {
            PollerArg::Epoll => PollerKind::Epoll,
            PollerArg::Kqueue => PollerKind::Kqueue,
            PollerArg::Poll => PollerKind::Poll,
        }
    }
}

fn parse_positive(value: &str) -> std::result::Result<usize, String> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("'{value}' is not a positive integer")),
    }
}

impl Cli {
    /// Resolves every address and builds the proxy settings.
    pub fn into_settings(self) -> Result<ProxySettings> {
        let listen_addrs = self
            .listen
            .iter()
            .map(|addr| resolve_endpoint(addr))
            .collect::<Result<Vec<_>>>()?;
        let remote_addr = resolve_endpoint(&self.remote)?;

        let mut settings = ProxySettings::new(listen_addrs, remote_addr);
        settings.buffer_size = self.buffer_size;
        settings.no_delay = self.no_delay;
        settings.io_threads = self.io_threads;
        settings.pin_threads = self.pin_threads;
        if let Some(poller) = self.poller {
            settings.poller = poller.into();
        }
        Ok(settings)
    }
}

/// Usage line for the binary.
pub fn usage() -> String {
    Cli::command().render_usage().to_string()
}

/// Returns true for errors caused by a bad argument value.
pub fn is_usage_error(err: &RelayError) -> bool {
    matches!(
        err,
        RelayError::Resolve { .. } | RelayError::InvalidArgument(_)
    )
}

/// Parses `args`, exiting with status 1 on any usage error.
///
/// `--help` and `--version` print and exit with status 0.
pub fn parse_or_exit<I, T>(args: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("relaygate").chain(args.iter().copied()))
    }

    #[test]
    fn test_minimal_arguments() {
        let cli = parse(&["-l", "127.0.0.1:9000", "-r", "127.0.0.1:9001"]).unwrap();
        assert_eq!(cli.listen, vec!["127.0.0.1:9000"]);
        assert_eq!(cli.buffer_size, 16384);
        assert_eq!(cli.io_threads, 1);
        assert!(!cli.no_delay);

        let settings = cli.into_settings().unwrap();
        assert_eq!(settings.remote_addr, "127.0.0.1:9001".parse::<std::net::SocketAddr>().unwrap());
        assert_eq!(settings.poller, PollerKind::native());
    }

    #[test]
    fn test_all_flags() {
        let cli = parse(&[
            "-l", "127.0.0.1:9000", "-l", "[::1]:9000", "-r", "127.0.0.1:9001", "-b", "4", "-n",
            "-t", "2", "-p", "--poller", "poll", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);

        let settings = cli.into_settings().unwrap();
        assert_eq!(settings.listen_addrs.len(), 2);
        assert_eq!(settings.buffer_size, 4);
        assert!(settings.no_delay);
        assert_eq!(settings.io_threads, 2);
        assert!(settings.pin_threads);
        assert_eq!(settings.poller, PollerKind::Poll);
    }

    #[test]
    fn test_missing_addresses_rejected() {
        assert!(parse(&["-r", "127.0.0.1:9001"]).is_err());
        assert!(parse(&["-l", "127.0.0.1:9000"]).is_err());
    }

    #[test]
    fn test_second_remote_rejected() {
        let err = parse(&["-l", "127.0.0.1:9000", "-r", "127.0.0.1:1", "-r", "127.0.0.1:2"]);
        assert!(err.is_err());
    }

    #[test]
    fn test_non_positive_numbers_rejected() {
        for flag in ["-b", "-t"] {
            for value in ["0", "-1", "x"] {
                let result = parse(&["-l", "127.0.0.1:9000", "-r", "127.0.0.1:9001", flag, value]);
                assert!(result.is_err(), "{flag} {value}");
            }
        }
    }

    #[test]
    fn test_bad_address_fails_settings() {
        let cli = parse(&["-l", "nonsense", "-r", "127.0.0.1:9001"]).unwrap();
        let err = cli.into_settings().unwrap_err();
        assert!(is_usage_error(&err), "{err}");
    }

    #[test]
    fn test_usage_names_required_flags() {
        let usage = usage();
        assert!(usage.contains("relaygate"), "{usage}");
        assert!(usage.contains("-l <HOST:PORT>"), "{usage}");
        assert!(usage.contains("-r <HOST:PORT>"), "{usage}");
    }

    #[test]
    fn test_startup_errors_are_not_usage_errors() {
        let err = RelayError::Bind {
            addr: "127.0.0.1:1".parse().unwrap(),
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        };
        assert!(!is_usage_error(&err));
    }
}
