use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use itertools::Itertools;
use serde::Serialize;

use ironlog::{
    config::Settings,
    error::SessionError,
    models::WorkoutSession,
    plans::PlanRepository,
    pr::best_volume,
    session::{SessionManager, SetUpdate, prefill_exercises},
    store::Store,
    types::{OutputFmt, Units, emit},
    utils::{display_weight, format_duration, weight_from_input},
};

use super::by_index_or_name;
use crate::cli::SessionCmd;

#[derive(Serialize)]
struct HistoryJson<'a> {
    idx: usize,
    id: &'a str,
    day_name: &'a str,
    started_at: String,
    duration_secs: i64,
    volume: f64,
    completed_sets: usize,
}

/// 1-based CLI index to 0-based; 0 maps to an index that never exists.
fn zero_based(idx: usize) -> usize {
    idx.checked_sub(1).unwrap_or(usize::MAX)
}

fn completed_sets(s: &WorkoutSession) -> usize {
    s.exercises
        .iter()
        .flat_map(|e| &e.sets)
        .filter(|set| set.is_completed)
        .count()
}

fn print_session(session: &WorkoutSession, history: &[WorkoutSession], units: Units) {
    let end = session.completed_at.unwrap_or_else(Utc::now);
    println!(
        "{} {} (started {}, duration: {})",
        "Session:".cyan().bold(),
        session.day_name.bold(),
        session.started_at.format("%Y-%m-%d %H:%M"),
        format_duration(end - session.started_at)
    );

    println!("\n{}", "Exercises:".cyan().bold());
    for (i, ex) in session.exercises.iter().enumerate() {
        let best = best_volume(history, &ex.exercise_id)
            .map(|v| format!("(best volume {})", display_weight(v, units)).dimmed().to_string())
            .unwrap_or_default();
        println!(" {} • {} {}", (i + 1).to_string().yellow(), ex.exercise_name.bold(), best);

        for set in &ex.sets {
            let mark = if set.is_completed { "✓".green() } else { "·".dimmed() };
            let pr = if set.is_pr { " PR".yellow().bold().to_string() } else { String::new() };
            println!(
                "     {} {} {} × {}{}",
                set.set_number.to_string().yellow(),
                mark,
                display_weight(set.weight, units),
                set.reps,
                pr
            );
        }
    }
    println!();
}

fn print_history(history: &[WorkoutSession], limit: usize, units: Units) {
    if history.is_empty() {
        println!("{}", "  (no completed sessions)".dimmed());
        return;
    }

    println!("{}", "Sessions:".cyan().bold());
    let idx_w = history.len().min(limit).to_string().len();
    for (i, s) in history.iter().take(limit).enumerate() {
        let duration = s
            .completed_at
            .map(|c| format_duration(c - s.started_at))
            .unwrap_or_else(|| "--:--:--".into());
        println!(
            " {} • {} {} {} {}",
            format!("{:>width$}", i + 1, width = idx_w).yellow(),
            s.started_at.format("%Y-%m-%d"),
            s.day_name.bold(),
            format!("({duration}, {} sets)", completed_sets(s)).dimmed(),
            format!("volume {}", display_weight(s.volume(), units)).dimmed()
        );
    }
}

async fn save_draft(mgr: &SessionManager, store: &Store) -> Result<()> {
    if let Some(active) = mgr.active() {
        store.save_active_session(active).await?;
    }
    Ok(())
}

fn no_active() {
    println!("{} no active session", "error:".red().bold());
}

pub async fn handle(cmd: SessionCmd, store: &Store, settings: &Settings, fmt: OutputFmt) -> Result<()> {
    let units = settings.units;
    let mut mgr = SessionManager::load(store).await?;
    if let Some(draft) = store.load_active_session().await? {
        if !mgr.restore(draft)? {
            store.clear_active_session().await?;
        }
    }

    match cmd {
        SessionCmd::Start { plan, day } => {
            let plans = PlanRepository::new(store).list().await?;
            let Some(p) = by_index_or_name(&plans, &plan, |p| &p.name) else {
                println!("{} no plan `{}`", "error:".red().bold(), plan);
                return Ok(());
            };
            let Some(d) = by_index_or_name(&p.days, &day, |d| &d.name) else {
                println!("{} plan `{}` has no day `{}`", "error:".red().bold(), p.name, day);
                return Ok(());
            };
            if d.exercises.is_empty() {
                println!("{} day `{}` has no exercises", "warning:".yellow().bold(), d.name);
            }

            let exercises = prefill_exercises(mgr.previous_session(&p.id, &d.id), d);
            let session = match mgr.start_session(&p.id, &d.id, &d.name, exercises) {
                Ok(s) => s.clone(),
                Err(SessionError::AlreadyActive { .. }) => {
                    println!(
                        "{} a session is already active, finish or cancel it first",
                        "error:".red().bold()
                    );
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };
            store.save_active_session(&session).await?;

            emit(fmt, &session, || {
                println!("{} started `{}` from `{}`", "ok:".green().bold(), d.name, p.name);
                print_session(&session, mgr.history(), units);
            });
        }

        SessionCmd::Show => match mgr.active() {
            Some(active) => emit(fmt, active, || print_session(active, mgr.history(), units)),
            None => no_active(),
        },

        SessionCmd::Set {
            exercise,
            set,
            weight,
            reps,
        } => {
            if !mgr.is_active() {
                no_active();
                return Ok(());
            }
            if weight.is_none() && reps.is_none() {
                println!("{} nothing to change, pass --weight and/or --reps", "warning:".yellow().bold());
                return Ok(());
            }
            if weight.is_some_and(|w| !w.is_finite() || w < 0.0) {
                println!("{} invalid weight: {}", "error:".red().bold(), weight.unwrap_or_default());
                return Ok(());
            }

            let update = SetUpdate {
                weight: weight.map(|w| weight_from_input(w, units)),
                reps,
            };
            if !mgr.update_set(zero_based(exercise), zero_based(set), update) {
                println!("{} no set {} for exercise {}", "error:".red().bold(), set, exercise);
                return Ok(());
            }
            save_draft(&mgr, store).await?;
            println!("{} updated set {} of exercise {}", "ok:".green().bold(), set, exercise);
        }

        SessionCmd::AddSet { exercise } => match mgr.add_set(zero_based(exercise)) {
            Some(n) => {
                save_draft(&mgr, store).await?;
                println!("{} added set {} to exercise {}", "ok:".green().bold(), n, exercise);
            }
            None if !mgr.is_active() => no_active(),
            None => println!("{} no exercise at index {}", "error:".red().bold(), exercise),
        },

        SessionCmd::Done { exercise, set } => {
            let Some(logged) = mgr.complete_set(zero_based(exercise), zero_based(set)).cloned() else {
                if mgr.is_active() {
                    println!("{} no set {} for exercise {}", "error:".red().bold(), set, exercise);
                } else {
                    no_active();
                }
                return Ok(());
            };
            save_draft(&mgr, store).await?;

            emit(fmt, &logged, || {
                if logged.is_completed {
                    println!(
                        "{} set {} done: {} × {}",
                        "ok:".green().bold(),
                        logged.set_number,
                        display_weight(logged.weight, units),
                        logged.reps
                    );
                } else {
                    println!("{} set {} reopened", "ok:".green().bold(), logged.set_number);
                }
                if logged.is_pr {
                    println!("{} new personal record!", "note:".yellow().bold());
                }
            });
        }

        SessionCmd::Finish => match mgr.finish_session(store).await? {
            Some(done) => {
                store.clear_active_session().await?;
                let prs = done
                    .exercises
                    .iter()
                    .flat_map(|e| &e.sets)
                    .filter(|s| s.is_pr)
                    .count();
                emit(fmt, &done, || {
                    println!(
                        "{} saved `{}`: {} sets, volume {}",
                        "ok:".green().bold(),
                        done.day_name,
                        completed_sets(&done),
                        display_weight(done.volume(), units)
                    );
                    if prs > 0 {
                        println!("{} {} personal record(s) this session", "note:".yellow().bold(), prs);
                    }
                });
            }
            None => no_active(),
        },

        SessionCmd::Cancel => match mgr.cancel_session() {
            Some(cancelled) => {
                store.clear_active_session().await?;
                println!("{} session cancelled (id: {})", "ok:".green().bold(), cancelled.id);
            }
            None => println!("{} no active session to cancel", "error:".red().bold()),
        },

        SessionCmd::History { limit } => {
            let rows: Vec<HistoryJson> = mgr
                .history()
                .iter()
                .take(limit)
                .enumerate()
                .map(|(i, s)| HistoryJson {
                    idx: i + 1,
                    id: &s.id,
                    day_name: &s.day_name,
                    started_at: s.started_at.to_rfc3339(),
                    duration_secs: s
                        .completed_at
                        .map_or(0, |c| (c - s.started_at).num_seconds()),
                    volume: s.volume(),
                    completed_sets: completed_sets(s),
                })
                .collect();
            emit(fmt, &rows, || print_history(mgr.history(), limit, units));
        }

        SessionCmd::Log { index, date } => {
            let history = mgr.history();
            let found: Vec<&WorkoutSession> = match (index, date) {
                (_, Some(d)) => history.iter().filter(|s| s.started_at.date_naive() == d).collect(),
                (Some(i), None) => history.get(zero_based(i)).into_iter().collect(),
                (None, None) => history.first().into_iter().collect(),
            };

            if found.is_empty() {
                let what = match (index, date) {
                    (_, Some(d)) => format!("on {d}"),
                    (Some(i), None) => format!("at index {i}"),
                    (None, None) => "yet".to_string(),
                };
                println!("{} no completed session {}", "error:".red().bold(), what);
                return Ok(());
            }

            emit(fmt, &found, || {
                for s in &found {
                    print_session(s, history, units);
                }
                if found.len() > 1 {
                    println!(
                        "{} {} sessions: {}",
                        "info:".blue().bold(),
                        found.len(),
                        found.iter().map(|s| s.day_name.as_str()).join(", ")
                    );
                }
            });
        }
    }

    Ok(())
}
