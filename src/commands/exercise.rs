use anyhow::Result;
use colored::Colorize;
use itertools::Itertools;
use serde::Serialize;

use ironlog::{
    catalog::{self, Resolved},
    models::Exercise,
    store::Store,
    types::{OutputFmt, emit},
};

use super::plain_len;
use crate::cli::ExerciseCmd;

#[derive(Serialize)]
struct ExJson<'a> {
    idx: usize,
    #[serde(flatten)]
    exercise: &'a Exercise,
}

fn pretty_list(rows: &[ExJson]) {
    if rows.is_empty() {
        println!("{}", "  (no exercises match)".dimmed());
        return;
    }

    println!("{}", "Exercises:".cyan().bold());
    let idx_w = rows.iter().map(|r| r.idx.to_string().len()).max().unwrap_or(1);
    let left: Vec<String> = rows
        .iter()
        .map(|r| {
            format!(
                " {} • {}",
                format!("{:>width$}", r.idx, width = idx_w).yellow(),
                r.exercise.name.bold()
            )
        })
        .collect();

    let pad_plain = left.iter().map(|s| plain_len(s)).max().unwrap_or(0);
    for (l, r) in left.iter().zip(rows) {
        let pad = pad_plain + (l.len() - plain_len(l));
        let muscles = r.exercise.primary_muscles.join(", ");
        println!(
            "{:<pad$} {} {} {}",
            l,
            "|".blue(),
            format!("{:<10}", r.exercise.category.to_string()).cyan(),
            muscles.dimmed(),
            pad = pad
        );
    }
}

fn pretty_show(ex: &Exercise) {
    println!("{} {}", "Exercise:".cyan().bold(), ex.name.bold());
    println!("  {} {}", "category:".dimmed(), ex.category);
    println!("  {} {}", "equipment:".dimmed(), ex.equipment);
    println!("  {} {}", "primary:".dimmed(), ex.primary_muscles.join(", "));
    if !ex.secondary_muscles.is_empty() {
        println!("  {} {}", "secondary:".dimmed(), ex.secondary_muscles.join(", "));
    }
    if !ex.video_url.is_empty() {
        println!("  {} {}", "video:".dimmed(), ex.video_url.underline());
    }

    if !ex.instructions.is_empty() {
        println!("\n{}", "How to:".cyan().bold());
        for (i, step) in ex.instructions.iter().enumerate() {
            println!(" {} {}", format!("{}.", i + 1).yellow(), step);
        }
    }
}

pub async fn handle(cmd: ExerciseCmd, store: &Store, fmt: OutputFmt) -> Result<()> {
    let all = catalog::load(store).await?;

    match cmd {
        ExerciseCmd::List { query, category } => {
            // Keep catalog positions so `exercise show <N>` and `plan add-ex` agree.
            let rows: Vec<ExJson> = catalog::filter(&all, query.as_deref(), category)
                .into_iter()
                .filter_map(|ex| {
                    let idx = all.iter().position(|e| e.id == ex.id)? + 1;
                    Some(ExJson { idx, exercise: ex })
                })
                .collect();
            emit(fmt, &rows, || pretty_list(&rows));
        }

        ExerciseCmd::Show { exercise } => {
            let input = exercise.iter().join(" ");
            if input.trim().is_empty() {
                println!("{} no exercise given", "error:".red().bold());
                return Ok(());
            }

            match catalog::resolve(&all, &input) {
                Resolved::Found(ex) => emit(fmt, ex, || pretty_show(ex)),
                Resolved::Suggestion(ex) => println!(
                    "{} no exercise `{}` (did you mean `{}`?)",
                    "error:".red().bold(),
                    input,
                    ex.name
                ),
                Resolved::Missing => println!(
                    "{} no exercise `{}`, use `ironlog exercise list` to browse",
                    "error:".red().bold(),
                    input
                ),
            }
        }
    }

    Ok(())
}
