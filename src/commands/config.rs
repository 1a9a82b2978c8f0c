use std::{collections::BTreeMap, path::Path};

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;

use ironlog::{
    config::{Config, KEY_COACH_API_KEY, KEY_COACH_MODE, KEY_UNITS, KNOWN_KEYS},
    types::{CoachMode, OutputFmt, Units, emit},
};

use crate::cli::ConfigCmd;

fn masked<'a>(key: &str, val: &'a str) -> std::borrow::Cow<'a, str> {
    if key == KEY_COACH_API_KEY && val.chars().count() > 4 {
        format!("{}…", val.chars().take(4).collect::<String>()).into()
    } else {
        val.into()
    }
}

pub fn handle(cmd: ConfigCmd, config_path: &Path, fmt: OutputFmt) -> Result<()> {
    let mut cfg = Config::load(config_path)?;

    match cmd {
        ConfigCmd::List => {
            let shown: BTreeMap<&str, String> = cfg
                .map
                .iter()
                .map(|(k, v)| (k.as_str(), masked(k, v).into_owned()))
                .collect();
            emit(fmt, &shown, || {
                if cfg.map.is_empty() {
                    println!("{}", "(no config set)".dimmed());
                } else {
                    println!("{} {}", "Config:".cyan().bold(), config_path.display().to_string().dimmed());
                    for (k, v) in &shown {
                        println!("  {} = {}", k.green(), v);
                    }
                }
            });
        }

        ConfigCmd::Get { key } => match cfg.map.get(&key) {
            Some(val) => println!("{}", val),
            None => println!("{} key `{}` not found", "warning:".yellow().bold(), key),
        },

        ConfigCmd::Set { key, val } => {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                println!(
                    "{} `{}` is not a key ironlog reads (known: {})",
                    "warning:".yellow().bold(),
                    key,
                    KNOWN_KEYS.join(", ")
                );
            }
            let valid = match key.as_str() {
                KEY_COACH_MODE => <CoachMode as ValueEnum>::from_str(&val, true).is_ok(),
                KEY_UNITS => <Units as ValueEnum>::from_str(&val, true).is_ok(),
                _ => true,
            };
            if !valid {
                println!("{} invalid value `{}` for `{}`", "error:".red().bold(), val, key);
                return Ok(());
            }

            cfg.map.insert(key.clone(), val.clone());
            cfg.save(config_path)?;

            println!("{} set `{}` = `{}`", "info:".blue().bold(), key.green(), masked(&key, &val));
        }

        ConfigCmd::Unset { key } => {
            if cfg.map.remove(&key).is_some() {
                cfg.save(config_path)?;
                println!("{} removed `{}`", "info:".blue().bold(), key.green());
            } else {
                println!("{} key `{}` not found", "warning:".yellow().bold(), key);
            }
        }
    }

    Ok(())
}
