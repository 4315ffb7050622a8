//! atomicappend CLI
//!
//! Appends one line, made of the message tokens joined by spaces, to a file
//! shared with other concurrent invocations.

use std::ffi::OsString;
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;
use std::process;

use atomicappend::error::EXIT_USAGE;
use atomicappend::{Appender, Config};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// atomicappend
#[derive(Parser, Debug)]
#[command(name = "atomicappend")]
#[command(about = "Atomically append a line to a file shared by concurrent writers")]
#[command(override_usage = "atomicappend <FILE> <MESSAGE>...")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Args {
    /// File to append to (created with mode 0644 if missing)
    #[arg(value_parser = clap::value_parser!(PathBuf))]
    file: PathBuf,

    /// Message tokens, joined with single spaces into one line
    #[arg(
        required = true,
        num_args = 1..,
        allow_hyphen_values = true,
        value_parser = clap::value_parser!(OsString)
    )]
    messages: Vec<OsString>,
}

impl Args {
    /// Parse the process arguments with every one of them taken as a value.
    ///
    /// A leading `--` ends option parsing before the first user argument, so
    /// `-x`, `--help` or a later `--` reach the engine unchanged.
    fn parse_verbatim() -> Result<Self, clap::Error> {
        let mut argv = std::env::args_os();
        let bin = argv.next().unwrap_or_else(|| OsString::from("atomicappend"));
        let verbatim = [bin, OsString::from("--")].into_iter().chain(argv);
        Self::try_parse_from(verbatim)
    }
}

fn main() {
    // Logs go to stderr; stdout stays untouched
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("atomicappend v{}", atomicappend::VERSION);

    let args = match Args::parse_verbatim() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            process::exit(EXIT_USAGE);
        }
    };

    let messages: Vec<&[u8]> = args.messages.iter().map(|m| m.as_bytes()).collect();

    let appender = Appender::new(Config::default());
    match appender.append(&args.file, &messages) {
        Ok(report) => {
            tracing::debug!(
                offset = report.offset,
                bytes = report.bytes_written,
                attempts = report.lock_attempts,
                "append complete"
            );
        }
        Err(e) => {
            eprintln!("atomicappend: {}", e);
            process::exit(e.exit_code());
        }
    }
}
