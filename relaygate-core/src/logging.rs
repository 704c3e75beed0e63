//! Log output.
//!
//! Every line has the shape `<timestamp> [<thread-name>] <message>`, with a
//! local timestamp carrying microseconds. Thread names come from the OS
//! thread (`main`, `acceptor`, `io-N`), which the thread builder assigns at
//! spawn time.

use std::fmt;

use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "RELAYGATE_LOG";

/// strftime-style format for the line prefix.
pub const TIMESTAMP_FORMAT: &str = "%Y-%b-%d %H:%M:%S%.6f";

/// Event formatter producing `<timestamp> [<thread-name>] <message>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RelayFormat;

impl<S, N> FormatEvent<S, N> for RelayFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let now = chrono::Local::now();
        let thread = std::thread::current();
        write!(
            writer,
            "{} [{}] ",
            now.format(TIMESTAMP_FORMAT),
            thread.name().unwrap_or("unknown")
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Installs the process-wide subscriber writing to stdout.
///
/// `RELAYGATE_LOG` overrides the default level, which is `info` or `debug`
/// when `verbose` is set.
pub fn init(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_ansi(false)
        .event_format(RelayFormat)
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))
}
