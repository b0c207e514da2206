use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const CRATES: [&str; 4] = ["tsuiseki", "tsuiseki_core", "tsuiseki_api", "tsuiseki_parse"];

/// `RUST_LOG` wins; otherwise our own crates at `info`, or `debug` when verbose.
fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        let directives: Vec<String> = CRATES.iter().map(|c| format!("{c}={level}")).collect();
        EnvFilter::new(directives.join(","))
    })
}

/// Log to stderr and to a daily file under `log_dir`.
///
/// The returned guard flushes the file writer on drop. Without a usable log
/// directory only stderr is set up.
pub fn init(verbose: bool, log_dir: &Path) -> Option<WorkerGuard> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("tsuiseki")
        .filename_suffix("log")
        .build(log_dir);

    let (file_layer, guard, file_error) = match appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(file_layer)
        .with(filter(verbose))
        .init();

    if let Some(e) = file_error {
        tracing::warn!(dir = %log_dir.display(), error = %e, "File logging disabled");
    }
    guard
}
