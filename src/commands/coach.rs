use anyhow::Result;
use colored::Colorize;

use ironlog::{
    coach::Coach,
    config::Settings,
    models::CoachMessage,
    store::Store,
    types::{OutputFmt, Role, emit},
};

use crate::cli::CoachCmd;

fn print_message(m: &CoachMessage) {
    let who = match m.role {
        Role::User => "you:".blue().bold(),
        Role::Assistant => "coach:".green().bold(),
    };
    println!("{} {}", who, format!("({})", m.timestamp.format("%Y-%m-%d %H:%M")).dimmed());
    for line in m.content.lines() {
        println!("  {}", line);
    }
    println!();
}

pub async fn handle(cmd: CoachCmd, store: &Store, settings: &Settings, fmt: OutputFmt) -> Result<()> {
    let coach = Coach::new(store, settings)?;

    match cmd {
        CoachCmd::Ask { message } => {
            let message = message.join(" ");
            if message.trim().is_empty() {
                println!("{} message must not be empty", "error:".red().bold());
                return Ok(());
            }
            if !coach.is_online() {
                tracing::debug!("coach is offline, using the built-in reply");
            }
            let reply = coach.send_message(message.trim()).await;
            emit(fmt, &reply, || print_message(&reply));
        }

        CoachCmd::History => {
            let history = coach.history().await?;
            emit(fmt, &history, || {
                if history.is_empty() {
                    println!("{}", "  (no messages yet, try `ironlog coach ask <MESSAGE>`)".dimmed());
                }
                history.iter().for_each(print_message);
            });
        }

        CoachCmd::Clear => {
            coach.clear_messages().await?;
            println!("{} conversation cleared", "ok:".green().bold());
        }
    }

    Ok(())
}
