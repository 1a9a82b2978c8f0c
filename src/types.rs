use std::fmt::Display;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseCategory {
    Chest,
    Back,
    Shoulders,
    Arms,
    Legs,
    Core,
    Cardio,
    FullBody,
}

impl Display for ExerciseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Chest => "chest",
            Self::Back => "back",
            Self::Shoulders => "shoulders",
            Self::Arms => "arms",
            Self::Legs => "legs",
            Self::Core => "core",
            Self::Cardio => "cardio",
            Self::FullBody => "full-body",
        };

        write!(f, "{}", s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Cable,
    Machine,
    Bodyweight,
    Band,
    Kettlebell,
}

impl Display for Equipment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Barbell => "barbell",
            Self::Dumbbell => "dumbbell",
            Self::Cable => "cable",
            Self::Machine => "machine",
            Self::Bodyweight => "bodyweight",
            Self::Band => "band",
            Self::Kettlebell => "kettlebell",
        };

        write!(f, "{}", s)
    }
}

/// Diary mood rating, 1 (worst) to 5 (best). Serialized as the bare integer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Mood {
    Awful = 1,
    Low = 2,
    #[default]
    Neutral = 3,
    Good = 4,
    Great = 5,
}

impl TryFrom<u8> for Mood {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Awful),
            2 => Ok(Self::Low),
            3 => Ok(Self::Neutral),
            4 => Ok(Self::Good),
            5 => Ok(Self::Great),
            other => Err(format!("mood must be between 1 and 5, got {other}")),
        }
    }
}

impl From<Mood> for u8 {
    fn from(mood: Mood) -> Self {
        mood as u8
    }
}

impl Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Awful => "awful",
            Self::Low => "low",
            Self::Neutral => "neutral",
            Self::Good => "good",
            Self::Great => "great",
        };

        write!(f, "{}", s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// Where coach replies come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CoachMode {
    #[default]
    Builtin,
    Api,
}

/// Display/input unit for weights. Storage is always kilograms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Units {
    #[default]
    Kg,
    Lbs,
}

impl Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kg => write!(f, "kg"),
            Self::Lbs => write!(f, "lbs"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFmt {
    Pretty,
    Json,
}

impl OutputFmt {
    pub fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Pretty }
    }
}

/// Prints `value` as JSON or runs the pretty printer, depending on `fmt`.
pub fn emit<T: Serialize + ?Sized>(fmt: OutputFmt, value: &T, pretty: impl FnOnce()) {
    match fmt {
        OutputFmt::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{s}"),
            Err(e) => tracing::error!(error = %e, "failed to encode JSON output"),
        },
        OutputFmt::Pretty => pretty(),
    }
}
