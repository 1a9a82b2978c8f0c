use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use ironlog::{
    catalog,
    config::{Config, Settings},
    db,
    store::Store,
    types::OutputFmt,
};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

fn init_logging(verbose: bool) {
    // stdout is reserved for command output (and --json), so logs go to stderr.
    let filter = if verbose {
        EnvFilter::new("ironlog=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn open_store(config_path: &Path) -> Result<(Store, Settings)> {
    let cfg = Config::load(config_path)?;
    let settings = Settings::from_config(&cfg);

    let pool = db::open(&settings.db_path)
        .await
        .with_context(|| format!("opening database `{}`", settings.db_path))?;
    let store = Store::new(pool);
    catalog::seed_if_empty(&store).await?;
    Ok((store, settings))
}

async fn run(cli: Cli) -> Result<()> {
    let fmt = OutputFmt::from_flag(cli.json);
    let config_path = Config::default_path()?;

    // Config edits never touch the database.
    let cmd = match cli.cmd {
        Commands::Config(cmd) => return commands::config::handle(cmd, &config_path, fmt),
        other => other,
    };
    let (store, settings) = open_store(&config_path).await?;

    match cmd {
        Commands::Plan(cmd) => commands::plan::handle(cmd, &store, fmt).await?,
        Commands::Session(cmd) => commands::session::handle(cmd, &store, &settings, fmt).await?,
        Commands::Diary(cmd) => commands::diary::handle(cmd, &store, fmt).await?,
        Commands::Coach(cmd) => commands::coach::handle(cmd, &store, &settings, fmt).await?,
        Commands::Exercise(cmd) => commands::exercise::handle(cmd, &store, fmt).await?,
        Commands::Data(cmd) => commands::data::handle(cmd, &store, fmt).await?,
        Commands::Config(cmd) => commands::config::handle(cmd, &config_path, fmt)?,
    }

    Ok(())
}

fn report_failure(e: &anyhow::Error) {
    tracing::error!(error = %e, "command failed");
    eprintln!("{} {:#}", "error:".red().bold(), e);
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        report_failure(&e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failures_are_logged_at_error_level() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("error"))
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            report_failure(&anyhow::anyhow!("database is locked"));
        });

        let logged = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("ERROR"), "{logged}");
        assert!(logged.contains("command failed"));
        assert!(logged.contains("database is locked"));
    }
}
