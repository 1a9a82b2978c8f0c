use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;

use ironlog::{
    diary::{Diary, WeeklySummary, count_workouts, week_dates},
    models::DiaryEntry,
    session::SessionManager,
    store::Store,
    types::{Mood, OutputFmt, emit},
};

use super::today;
use crate::cli::{DiaryCmd, GoalCmd};

fn mood_face(mood: Mood) -> &'static str {
    match mood {
        Mood::Awful => "😞",
        Mood::Low => "😕",
        Mood::Neutral => "😐",
        Mood::Good => "🙂",
        Mood::Great => "😄",
    }
}

fn print_entry(date: NaiveDate, entry: Option<&DiaryEntry>) {
    println!("{} {}", "Diary:".cyan().bold(), date.format("%A %Y-%m-%d").to_string().bold());
    let Some(e) = entry else {
        println!("{}", "  (no entry)".dimmed());
        return;
    };

    println!("  mood: {} {}", mood_face(e.mood), e.mood);
    if e.content.is_empty() {
        println!("  {}", "(no notes)".dimmed());
    } else {
        for line in e.content.lines() {
            println!("  {}", line);
        }
    }

    if !e.goals.is_empty() {
        println!("\n{}", "Goals:".cyan().bold());
        for (i, g) in e.goals.iter().enumerate() {
            let mark = if g.is_completed { "[x]".green() } else { "[ ]".normal() };
            println!(" {} {} {}", (i + 1).to_string().yellow(), mark, g.text);
        }
    }
}

fn print_week(week: &[NaiveDate; 7], summary: &WeeklySummary) {
    println!(
        "{} {} to {}",
        "Week:".cyan().bold(),
        week[0].format("%Y-%m-%d"),
        week[6].format("%Y-%m-%d")
    );
    for (date, mood) in week.iter().zip(summary.moods) {
        let face = mood.map(mood_face).unwrap_or("·");
        println!("  {} {}", date.format("%a").to_string().dimmed(), face);
    }
    println!("  goals completed: {}%", summary.goal_completion_rate);
    println!("  workouts: {}", summary.workout_count);
}

/// The goal id behind a 1-based index on `date`'s entry.
fn goal_id(diary: &Diary, date: NaiveDate, goal: usize) -> Option<String> {
    diary
        .entry_for(date)?
        .goals
        .get(goal.checked_sub(1)?)
        .map(|g| g.id.clone())
}

pub async fn handle(cmd: DiaryCmd, store: &Store, fmt: OutputFmt) -> Result<()> {
    let mut diary = Diary::load(store).await?;

    match cmd {
        DiaryCmd::Show { date } => {
            let date = date.unwrap_or_else(today);
            let entry = diary.entry_for(date);
            emit(fmt, &entry, || print_entry(date, entry));
        }

        DiaryCmd::Mood { mood, date } => {
            let date = date.unwrap_or_else(today);
            let mood = Mood::try_from(mood).map_err(anyhow::Error::msg)?;
            let entry = diary.set_mood(date, mood).await?;
            emit(fmt, &entry, || {
                println!("{} mood for {} set to {} {}", "ok:".green().bold(), date, mood_face(mood), mood)
            });
        }

        DiaryCmd::Write { date, text } => {
            let date = date.unwrap_or_else(today);
            let entry = diary.update_content(date, &text.join(" ")).await?;
            emit(fmt, &entry, || println!("{} saved notes for {}", "ok:".green().bold(), date));
        }

        DiaryCmd::Goal(GoalCmd::Add { date, text }) => {
            let date = date.unwrap_or_else(today);
            let text = text.join(" ");
            if text.trim().is_empty() {
                println!("{} goal text must not be empty", "error:".red().bold());
                return Ok(());
            }
            let entry = diary.add_goal(date, text.trim()).await?;
            emit(fmt, &entry, || {
                println!("{} added goal {} for {}", "ok:".green().bold(), entry.goals.len(), date)
            });
        }

        DiaryCmd::Goal(GoalCmd::Toggle { goal, date }) => {
            let date = date.unwrap_or_else(today);
            let Some(id) = goal_id(&diary, date, goal) else {
                println!("{} no goal {} on {}", "error:".red().bold(), goal, date);
                return Ok(());
            };
            if let Some(entry) = diary.toggle_goal(date, &id).await? {
                emit(fmt, &entry, || print_entry(date, Some(&entry)));
            }
        }

        DiaryCmd::Goal(GoalCmd::Rm { goal, date }) => {
            let date = date.unwrap_or_else(today);
            let Some(id) = goal_id(&diary, date, goal) else {
                println!("{} no goal {} on {}", "error:".red().bold(), goal, date);
                return Ok(());
            };
            if let Some(entry) = diary.remove_goal(date, &id).await? {
                emit(fmt, &entry, || println!("{} removed goal {}", "ok:".green().bold(), goal));
            }
        }

        DiaryCmd::Week { date } => {
            let week = week_dates(date.unwrap_or_else(today));
            let sessions = SessionManager::load(store).await?;
            let summary = diary.weekly_summary(&week, count_workouts(sessions.history(), &week));
            emit(fmt, &summary, || print_week(&week, &summary));
        }
    }

    Ok(())
}
