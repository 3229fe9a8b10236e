//! CLI entry point for `mailsplit`.

use std::path::PathBuf;

use clap::Parser;

use mailsplit::config::{self, Config};
use mailsplit::pipeline::{self, RunOptions};

/// Split one email read from stdin into framed JSON and blob parts on stdout.
///
/// The process exits 0 whenever its arguments parse: success or failure is
/// reported inside the stream, as a final `done` or `error` block.
#[derive(Parser)]
#[command(name = "mailsplit", version, about)]
struct Cli {
    /// Frame boundary token; must not occur in any part's content
    #[arg(value_name = "BOUNDARY")]
    boundary: String,

    /// Request JSON: filename, languageCode, wantOcr, wantSplitByPage, metadata
    #[arg(value_name = "INPUT_JSON")]
    input_json: String,

    /// Verbose logging to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file
    #[arg(long, value_name = "PATH", env = "MAILSPLIT_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for the staged copy of the input
    #[arg(long, value_name = "DIR")]
    staging_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, source) = config::load_config(cli.config.as_deref());

    // Configure logging: stderr + optional log file. Stdout is the stream.
    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);
    source.log();

    if let Some(dir) = cli.staging_dir {
        config.staging.dir = Some(dir);
    }

    let options = RunOptions {
        boundary: cli.boundary,
        request_json: cli.input_json,
        staging: config.staging,
    };
    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();
    let summary = pipeline::run(&options, stdin, stdout);

    if let Some(error) = &summary.error {
        tracing::debug!(%error, parts = summary.parts_emitted, "Run ended with an error block");
    }
    Ok(())
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = config::cache_dir(config);
    if config.general.log_to_file && std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mailsplit.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
        tracing::debug!(path = %config::log_file_path(config).display(), "Logging to file");
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}
