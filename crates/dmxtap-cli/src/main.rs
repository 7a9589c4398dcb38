use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dmxtap_core::{ARTNET_PORT, Receiver, summarize};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("DMXTAP_BUILD_COMMIT"),
    ", ",
    env!("DMXTAP_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "dmxtap")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Passive Art-Net capture tap: observe the DMX frames a lighting controller actually emits.",
    long_about = None,
    after_help = "Examples:\n  dmxtap listen -o report.json\n  dmxtap listen --port 6455 --duration 5 --stdout --pretty\n  RUST_LOG=dmxtap_core=trace dmxtap listen --stdout"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Capture ArtDMX traffic for a fixed window and emit a versioned JSON report.
    #[command(
        after_help = "Examples:\n  dmxtap listen -o report.json\n  dmxtap listen --port 0 --duration 1 --stdout"
    )]
    Listen {
        /// UDP port to listen on (0 requests an OS-assigned port)
        #[arg(short = 'p', long, default_value_t = ARTNET_PORT)]
        port: u16,

        /// Capture window in seconds
        #[arg(short = 'd', long, default_value_t = 2.0)]
        duration: f64,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if no ArtDMX frames were observed
        #[arg(long)]
        expect_frames: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Listen {
            port,
            duration,
            report,
            stdout,
            pretty,
            compact,
            quiet,
            expect_frames,
        } => cmd_listen(
            port,
            duration,
            report,
            stdout,
            pretty,
            compact,
            quiet,
            expect_frames,
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(err.to_string(), None)
    }
}

fn cmd_listen(
    port: u16,
    duration: f64,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
    expect_frames: bool,
) -> Result<(), CliError> {
    if !duration.is_finite() || duration < 0.0 {
        return Err(CliError::new(
            format!("invalid capture duration: {duration}"),
            Some("pass a non-negative number of seconds".to_string()),
        ));
    }
    let window = Duration::from_secs_f64(duration);

    let mut receiver = Receiver::new(port);
    receiver.start().map_err(|err| {
        CliError::new(
            err.to_string(),
            Some(format!(
                "port {port} may be bound by another process; stop it or pass --port 0 for an OS-assigned port"
            )),
        )
    })?;
    let bound_port = receiver.local_port().unwrap_or(port);

    if !quiet {
        eprintln!("listening on UDP port {bound_port} for {duration}s ...");
    }
    let frames = receiver.capture_for(window);
    receiver.stop();

    let rep = summarize(&frames, bound_port, window);
    let json = serialize_report(&rep, pretty, compact)?;

    if stdout {
        print!("{}", json);
    } else {
        let report = report.expect("report required when not using stdout");
        if let Some(parent) = report.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory: {}", parent.display())
                })?;
            }
        }
        fs::write(&report, json)
            .with_context(|| format!("Failed to write report: {}", report.display()))?;
        if !quiet {
            eprintln!("OK: report written -> {}", report.display());
        }
    }

    if expect_frames && frames.is_empty() {
        return Err(CliError::new(
            "no ArtDMX frames observed",
            Some("check that the controller outputs to this host and port".to_string()),
        ));
    }
    Ok(())
}

fn serialize_report(
    rep: &dmxtap_core::CaptureReport,
    pretty: bool,
    compact: bool,
) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}
