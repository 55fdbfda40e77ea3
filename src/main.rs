use clap::Parser;
use pid_sync::normalize::CanonicalKey;
use pid_sync::parse::Environment;
use pid_sync::sync::{PidSync, PidSyncOptions, SyncEvent};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
  name = "pid-sync",
  about = "Sync process ids from docs/PIDs.md into the scripts that reference them",
  version,
  author
)]
struct Cli {
  /// Environment section to read from the document
  #[arg(long, value_enum, default_value_t = Environment::Test)]
  env: Environment,

  /// Repository root containing docs/ and contracts/ (defaults to the current directory)
  #[arg(long)]
  root: Option<PathBuf>,

  /// Verbose output (-v for verbose, -vv for very verbose)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

fn setup_tracing(verbose: u8) {
  use tracing_subscriber::fmt;
  use tracing_subscriber::prelude::*;

  let log_level = match verbose {
    1 => "debug",
    2 => "trace",
    _ => "info",
  };

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(tracing_subscriber::EnvFilter::new(
      std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
    ))
    .init();
}

fn missing_warning(missing: &[CanonicalKey]) -> String {
  let names: Vec<&str> = missing.iter().map(|key| key.as_str()).collect();
  format!(
    "Warning: missing PIDs for [{}]; will skip those updates.",
    names.join(", ")
  )
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  setup_tracing(cli.verbose);

  let options = PidSyncOptions {
    root: cli.root,
    env: cli.env,
  };

  let result = PidSync::sync_with_progress(options, |event| match event {
    SyncEvent::Loaded { missing } if !missing.is_empty() => eprintln!("{}", missing_warning(missing)),
    SyncEvent::Loaded { .. } => {}
    SyncEvent::Updated(outcome) => println!("Updated: {}", outcome.path.display()),
  });

  match result {
    Ok(_) => {
      println!("Done. Review changes with 'git diff' and commit.");
      ExitCode::SUCCESS
    }
    Err(err) => {
      eprintln!("Error: {err}");
      ExitCode::FAILURE
    }
  }
}
