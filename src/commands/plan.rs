use anyhow::Result;
use colored::Colorize;
use itertools::Itertools;
use serde::Serialize;

use ironlog::{
    catalog::{self, Resolved},
    error::PlanError,
    models::{WorkoutDay, WorkoutPlan},
    plans::{PlanRepository, PlannedExerciseDraft},
    store::Store,
    types::{OutputFmt, emit},
};

use super::{by_index_or_name, plain_len};
use crate::cli::PlanCmd;

#[derive(Serialize)]
struct PlanJson<'a> {
    idx: usize,
    id: &'a str,
    name: &'a str,
    days: usize,
    created_at: String,
}

fn find_plan<'a>(plans: &'a [WorkoutPlan], input: &str) -> Option<&'a WorkoutPlan> {
    let found = by_index_or_name(plans, input, |p| &p.name);
    if found.is_none() {
        println!("{} no plan `{}`", "error:".red().bold(), input);
    }
    found
}

fn find_day<'a>(plan: &'a WorkoutPlan, input: &str) -> Option<&'a WorkoutDay> {
    let found = by_index_or_name(&plan.days, input, |d| &d.name);
    if found.is_none() {
        println!(
            "{} plan `{}` has no day `{}`",
            "error:".red().bold(),
            plan.name,
            input
        );
    }
    found
}

fn pretty_list(plans: &[WorkoutPlan]) {
    if plans.is_empty() {
        println!("{}", "  (no plans yet, try `ironlog plan create <NAME>`)".dimmed());
        return;
    }

    println!("{}", "Plans:".cyan().bold());

    let idx_w = plans.len().to_string().len();
    let mut left = Vec::<String>::new();
    let mut right = Vec::<String>::new();

    for (i, p) in plans.iter().enumerate() {
        let idx = format!("{:>width$}", i + 1, width = idx_w).yellow();
        left.push(format!(" {} • {}", idx, p.name.bold()));
        right.push(
            format!("added {}", p.created_at.format("%Y-%m-%d"))
                .dimmed()
                .to_string(),
        );

        for (j, d) in p.days.iter().enumerate() {
            let connector = if j + 1 == p.days.len() { "└─" } else { "├─" };
            let d_idx = format!("{:>width$}", j + 1, width = idx_w).yellow();
            left.push(format!(
                " {}   {} {} • {} {}",
                " ".repeat(idx_w),
                connector,
                d_idx,
                d.name.bold(),
                format!("({} exercises)", d.exercises.len()).dimmed()
            ));
            right.push(String::new());
        }
    }

    let pad_plain = left.iter().map(|s| plain_len(s)).max().unwrap_or(0);
    for (l, r) in left.into_iter().zip(right) {
        let pad = pad_plain + (l.len() - plain_len(&l));
        if r.is_empty() {
            println!("{}", l);
        } else {
            println!("{:<pad$} {} {}", l, "|".blue(), r, pad = pad);
        }
    }
}

fn pretty_show(plan: &WorkoutPlan) {
    println!(
        "{} {} {}",
        "Plan:".cyan().bold(),
        plan.name.bold(),
        format!("(updated {})", plan.updated_at.format("%Y-%m-%d %H:%M")).dimmed()
    );

    if plan.days.is_empty() {
        println!("{}", "  (no days)".dimmed());
        return;
    }

    for (i, day) in plan.days.iter().enumerate() {
        println!("\n {} • {}", (i + 1).to_string().yellow(), day.name.bold());
        if day.exercises.is_empty() {
            println!("     {}", "(no exercises)".dimmed());
        }
        for (j, ex) in day.exercises.iter().enumerate() {
            println!(
                "     {}. {} {}",
                j + 1,
                ex.exercise_name,
                format!("{} × {}-{}", ex.sets, ex.rep_range_min, ex.rep_range_max).dimmed()
            );
        }
    }
}

pub async fn handle(cmd: PlanCmd, store: &Store, fmt: OutputFmt) -> Result<()> {
    let repo = PlanRepository::new(store);

    match cmd {
        PlanCmd::Create { name } => {
            let name = name.trim();
            if name.is_empty() {
                println!("{} plan name must not be empty", "error:".red().bold());
                return Ok(());
            }
            let plan = repo.create_plan(name).await?;
            emit(fmt, &plan, || {
                println!("{} created plan `{}`", "ok:".green().bold(), plan.name)
            });
        }

        PlanCmd::List => {
            let plans = repo.list().await?;
            let rows: Vec<PlanJson> = plans
                .iter()
                .enumerate()
                .map(|(i, p)| PlanJson {
                    idx: i + 1,
                    id: &p.id,
                    name: &p.name,
                    days: p.days.len(),
                    created_at: p.created_at.to_rfc3339(),
                })
                .collect();
            emit(fmt, &rows, || pretty_list(&plans));
        }

        PlanCmd::Show { plan } => {
            let plans = repo.list().await?;
            if let Some(p) = find_plan(&plans, &plan) {
                emit(fmt, p, || pretty_show(p));
            }
        }

        PlanCmd::Rename { plan, name } => {
            let plans = repo.list().await?;
            let Some(p) = find_plan(&plans, &plan) else {
                return Ok(());
            };
            let old = p.name.clone();
            let updated = repo
                .update_plan(WorkoutPlan {
                    name: name.clone(),
                    ..p.clone()
                })
                .await?;
            emit(fmt, &updated, || {
                println!("{} renamed `{}` to `{}`", "ok:".green().bold(), old, name)
            });
        }

        PlanCmd::Delete { plan } => {
            let plans = repo.list().await?;
            if let Some(p) = find_plan(&plans, &plan) {
                repo.delete_plan(&p.id).await?;
                println!("{} deleted plan `{}`", "ok:".green().bold(), p.name);
            }
        }

        PlanCmd::AddDay { plan, name } => {
            let plans = repo.list().await?;
            let Some(p) = find_plan(&plans, &plan) else {
                return Ok(());
            };
            if let Some(updated) = repo.add_day_to_plan(&p.id, &name).await? {
                emit(fmt, &updated, || {
                    println!(
                        "{} added day {} `{}` to `{}`",
                        "ok:".green().bold(),
                        updated.days.len(),
                        name,
                        updated.name
                    )
                });
            }
        }

        PlanCmd::RenameDay { plan, day, name } => {
            let plans = repo.list().await?;
            let Some(p) = find_plan(&plans, &plan) else {
                return Ok(());
            };
            let Some(d) = find_day(p, &day) else {
                return Ok(());
            };
            let renamed = WorkoutDay {
                name: name.clone(),
                ..d.clone()
            };
            if let Some(updated) = repo.update_day(&p.id, renamed).await? {
                emit(fmt, &updated, || {
                    println!("{} renamed day `{}` to `{}`", "ok:".green().bold(), d.name, name)
                });
            }
        }

        PlanCmd::RemoveDay { plan, day } => {
            let plans = repo.list().await?;
            let Some(p) = find_plan(&plans, &plan) else {
                return Ok(());
            };
            let Some(d) = find_day(p, &day) else {
                return Ok(());
            };
            if let Some(updated) = repo.remove_day_from_plan(&p.id, &d.id).await? {
                emit(fmt, &updated, || {
                    println!("{} removed day `{}`", "ok:".green().bold(), d.name)
                });
            }
        }

        PlanCmd::AddEx {
            plan,
            day,
            exercise,
            sets,
            min,
            max,
        } => {
            let plans = repo.list().await?;
            let Some(p) = find_plan(&plans, &plan) else {
                return Ok(());
            };
            let Some(d) = find_day(p, &day) else {
                return Ok(());
            };
            let exercises = catalog::load(store).await?;
            let ex = match catalog::resolve(&exercises, &exercise) {
                Resolved::Found(ex) => ex,
                Resolved::Suggestion(ex) => {
                    println!(
                        "{} no exercise `{}` (did you mean `{}`?)",
                        "error:".red().bold(),
                        exercise,
                        ex.name
                    );
                    return Ok(());
                }
                Resolved::Missing => {
                    println!("{} no exercise `{}`", "error:".red().bold(), exercise);
                    return Ok(());
                }
            };

            let draft = PlannedExerciseDraft {
                exercise_id: ex.id.clone(),
                exercise_name: ex.name.clone(),
                sets,
                rep_range_min: min,
                rep_range_max: max,
            };
            match repo.add_exercise_to_day(&p.id, &d.id, draft).await {
                Ok(Some(updated)) => emit(fmt, &updated, || {
                    println!(
                        "{} added {} ({} × {}-{}) to `{}`",
                        "ok:".green().bold(),
                        ex.name.bold(),
                        sets,
                        min,
                        max,
                        d.name
                    )
                }),
                Ok(None) => {}
                Err(e @ (PlanError::InvalidRepRange { .. } | PlanError::InvalidSetCount { .. })) => {
                    println!("{} {}", "error:".red().bold(), e)
                }
                Err(e) => return Err(e.into()),
            }
        }

        PlanCmd::RemoveEx {
            plan,
            day,
            exercise,
        } => {
            let plans = repo.list().await?;
            let Some(p) = find_plan(&plans, &plan) else {
                return Ok(());
            };
            let Some(d) = find_day(p, &day) else {
                return Ok(());
            };
            let Some(planned) = by_index_or_name(&d.exercises, &exercise, |e| &e.exercise_name) else {
                let names = d.exercises.iter().map(|e| e.exercise_name.as_str()).join(", ");
                println!(
                    "{} day `{}` has no exercise `{}` (has: {})",
                    "error:".red().bold(),
                    d.name,
                    exercise,
                    if names.is_empty() { "none" } else { names.as_str() }
                );
                return Ok(());
            };
            if let Some(updated) = repo.remove_exercise_from_day(&p.id, &d.id, &planned.id).await? {
                emit(fmt, &updated, || {
                    println!(
                        "{} removed {} from `{}`",
                        "ok:".green().bold(),
                        planned.exercise_name,
                        d.name
                    )
                });
            }
        }
    }

    Ok(())
}
