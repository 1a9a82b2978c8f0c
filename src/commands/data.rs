use std::{
    fs::{File, read_to_string},
    io::{self, BufRead, BufWriter, Write},
};

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use ironlog::{
    error::ImportError,
    export::{self, Snapshot},
    store::Store,
    types::{OutputFmt, emit},
};

use super::today;
use crate::cli::DataCmd;

#[derive(Serialize)]
struct Counts {
    workout_plans: usize,
    workout_sessions: usize,
    diary_entries: usize,
    exercises: usize,
    coach_messages: usize,
}

impl From<&Snapshot> for Counts {
    fn from(s: &Snapshot) -> Self {
        Self {
            workout_plans: s.workout_plans.len(),
            workout_sessions: s.workout_sessions.len(),
            diary_entries: s.diary_entries.len(),
            exercises: s.exercises.len(),
            coach_messages: s.coach_messages.len(),
        }
    }
}

fn print_counts(c: &Counts) {
    println!("  plans: {}", c.workout_plans);
    println!("  sessions: {}", c.workout_sessions);
    println!("  diary entries: {}", c.diary_entries);
    println!("  exercises: {}", c.exercises);
    println!("  coach messages: {}", c.coach_messages);
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} {} [y/N] ", "warning:".yellow().bold(), prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub async fn handle(cmd: DataCmd, store: &Store, fmt: OutputFmt) -> Result<()> {
    match cmd {
        DataCmd::Export { file } => {
            let path = file.unwrap_or_else(|| export::backup_file_name(today()));
            if path == "-" {
                export::export_to_writer(store, io::stdout().lock()).await?;
                return Ok(());
            }

            let out = File::create(&path).with_context(|| format!("creating `{path}`"))?;
            let snapshot = export::export_to_writer(store, BufWriter::new(out))
                .await
                .with_context(|| format!("writing `{path}`"))?;
            let counts = Counts::from(&snapshot);
            emit(fmt, &counts, || {
                println!("{} exported to `{}`", "ok:".green().bold(), path);
                print_counts(&counts);
            });
        }

        DataCmd::Import { file } => {
            let json = match read_to_string(&file) {
                Ok(s) => s,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    println!("{} cannot open file `{}` – file not found", "error:".red().bold(), file);
                    return Ok(());
                }
                Err(e) => return Err(e).with_context(|| format!("reading `{file}`")),
            };

            match export::import_snapshot(store, &json).await {
                Ok(snapshot) => {
                    let counts = Counts::from(&snapshot);
                    emit(fmt, &counts, || {
                        println!("{} imported `{}`", "ok:".green().bold(), file);
                        print_counts(&counts);
                    });
                }
                Err(ImportError::InvalidFormat) => {
                    println!("{} `{}`: invalid backup file format", "error:".red().bold(), file);
                }
                Err(e) => return Err(e.into()),
            }
        }

        DataCmd::Reset { yes } => {
            if !yes && !confirm("delete ALL plans, sessions, diary entries and chat history?")? {
                println!("{} nothing deleted", "info:".blue().bold());
                return Ok(());
            }
            export::delete_all(store).await?;
            println!("{} all data deleted, exercise catalog restored", "ok:".green().bold());
        }
    }

    Ok(())
}
