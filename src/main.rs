use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::Parser;

use rotalog::config::LogConfig;
use rotalog::logging::{
    default_name, resolve_default_directory, ConsoleEcho, Log, FLAG_DONT_ECHO, TIMESTAMP_FORMAT,
};

/// Write a few lines to a rotated log file
#[derive(Debug, Parser)]
#[command(name = "rotalog", version)]
struct Args {
    /// Config file (TOML); defaults apply when it does not exist
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log directory, overrides the config file
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Log name without extension, overrides the config file
    #[arg(long)]
    name: Option<String>,

    /// Number of files to keep, overrides the config file
    #[arg(long)]
    retention: Option<usize>,

    /// Do not echo messages to the console
    #[arg(long)]
    quiet: bool,

    /// Message written as the last line before "Done."
    message: Option<String>,
}

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rotalog=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => LogConfig::load_from(path)?,
        None => LogConfig::default(),
    };
    if let Some(dir) = args.dir {
        config.directory = Some(dir);
    }
    if let Some(name) = args.name {
        config.name = Some(name);
    }
    if let Some(retention) = args.retention {
        config.retention = retention;
    }

    let mut log = ConsoleEcho::new(config.open()?);
    if args.quiet {
        log.echo_messages = false;
        log.echo_details = false;
    }

    if let Some(path) = log.inner().path() {
        tracing::info!("Logging to: {}", path.display());
    }

    log.write(
        FLAG_DONT_ECHO,
        &format!("Started {}", Local::now().format(TIMESTAMP_FORMAT)),
    )?;
    log.detail(&format!(
        "Default Directory: {}",
        resolve_default_directory().display()
    ))?;
    log.detail(&format!("Default Name: {}", default_name()))?;
    log.detail(&format!("Retention: {}", config.retention))?;
    log.message(&format!(
        "Arg: {}",
        args.message.as_deref().unwrap_or("none")
    ))?;
    log.message("Done.")?;

    Ok(())
}
