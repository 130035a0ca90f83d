mod checks;
mod commands;
mod core;
mod release;
mod stage;
mod ui;
mod utils;

use clap::{Args, Parser, Subcommand};
use crate::core::config::SettingsOverrides;
use crate::core::context::StageContext;
use crate::core::error::{StageError, print_error};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Stage signed, checksummed release candidates and draft the vote email
#[derive(Parser)]
#[command(name = "stagehand")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  #[command(subcommand)]
  command: Commands,

  #[command(flatten)]
  run: RunArgs,

  /// Log progress details
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Log everything, including each external command
  #[arg(long, global = true)]
  debug: bool,
}

/// Per-run settings (flag > environment > stage.toml)
#[derive(Args)]
struct RunArgs {
  /// Date the release is staged, YYYY-MM-DD (default: today)
  #[arg(long, env = "STAGE_DATE", global = true)]
  stage_date: Option<String>,

  /// Release-candidate suffix appended to the remote directory (e.g. -rc1)
  #[arg(long, env = "RC", global = true)]
  rc: Option<String>,

  /// Signing identity passed to gpg --local-user
  #[arg(long, env = "GPG_USER", global = true)]
  gpg_user: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
  /// Initialize stage.toml for this project
  Init {
    /// Project name (default: directory name)
    #[arg(long)]
    project: Option<String>,
    /// Release version (default: newest CHANGELOG entry)
    #[arg(long = "release", value_name = "VERSION")]
    release_version: Option<String>,
    /// Overwrite an existing configuration
    #[arg(long)]
    force: bool,
  },

  /// Sync the version file and run every precondition (fail-fast)
  Prepare,

  /// Prepare, then build, sign, upload, and draft the vote email
  Stage {
    /// Run prepare and show the staging plan without executing it
    #[arg(long)]
    dry_run: bool,
    /// Output the dry-run plan in JSON format
    #[arg(long, requires = "dry_run")]
    json: bool,
  },

  /// Run every precondition and report all results
  Check {
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Remove the staging directory and the vote email draft
  Clobber,

  /// Print the changelog entry for a version as it would be staged
  Changes {
    /// Version to show (default: the release version)
    #[arg(value_name = "VERSION")]
    release_version: Option<String>,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_tracing(verbose: bool, debug: bool) {
  let filter_layer = if debug {
    tracing_subscriber::EnvFilter::new("debug")
  } else if verbose {
    tracing_subscriber::EnvFilter::new("info")
  } else {
    tracing_subscriber::EnvFilter::new("warn")
  };

  // stdout carries command output (including JSON); diagnostics go to stderr
  tracing_subscriber::registry()
    .with(filter_layer)
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose, cli.debug);
  info!("stagehand v{}", env!("CARGO_PKG_VERSION"));

  let workspace_root = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(1);
    }
  };

  // init runs before stage.toml exists
  if let Commands::Init {
    project,
    release_version,
    force,
  } = cli.command
  {
    if let Err(err) = commands::run_init(&workspace_root, project, release_version, force) {
      handle_error(err);
    }
    return;
  }

  let overrides = SettingsOverrides {
    stage_date: cli.run.stage_date,
    rc: cli.run.rc,
    signer: cli.run.gpg_user,
    // Never accepted as a flag so it stays out of process listings
    passphrase: std::env::var("GPG_PASS").ok(),
  };

  let ctx = match StageContext::build(&workspace_root, &overrides) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let result = match cli.command {
    Commands::Init { .. } => Ok(()),
    Commands::Prepare => commands::run_prepare(&ctx),
    Commands::Stage { dry_run, json } => commands::run_stage(&ctx, dry_run, json),
    Commands::Check { json } => commands::run_check(&ctx, json),
    Commands::Clobber => commands::run_clobber(&ctx),
    Commands::Changes { release_version } => commands::run_changes(&ctx, release_version),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: StageError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
