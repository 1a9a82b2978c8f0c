use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ironlog::{plans::MAX_SETS, types::ExerciseCategory};

#[derive(Parser)]
#[command(name = "ironlog", version, about = "Plan workouts, log sessions and keep a training diary")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Emit machine-readable JSON instead of colorful text.
    #[arg(global = true, long)]
    pub json: bool,

    /// Log debug output to stderr.
    #[arg(global = true, long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Workout plan management
    #[command(subcommand, visible_alias = "p")]
    Plan(PlanCmd),

    /// Session-scoped commands
    #[command(subcommand, visible_alias = "s")]
    Session(SessionCmd),

    /// Training diary
    #[command(subcommand, visible_alias = "d")]
    Diary(DiaryCmd),

    /// Chat with the coach
    #[command(subcommand, visible_alias = "c")]
    Coach(CoachCmd),

    /// Browse the exercise catalog
    #[command(subcommand, visible_alias = "ex")]
    Exercise(ExerciseCmd),

    /// Backup, restore or wipe all data
    #[command(subcommand)]
    Data(DataCmd),

    /// View or edit ironlog config
    #[command(subcommand)]
    Config(ConfigCmd),
}

//
// Commands
//

#[derive(Subcommand)]
pub enum PlanCmd {
    /// Create an empty plan
    #[command(visible_alias = "c")]
    Create { name: String },

    /// List plans
    #[command(visible_alias = "l")]
    List,

    /// Show a single plan in detail
    #[command(visible_alias = "s")]
    Show {
        /// Plan index (from `plan list`) or name
        plan: String,
    },

    /// Rename a plan
    Rename { plan: String, name: String },

    /// Delete a plan with all its days
    #[command(visible_alias = "d")]
    Delete { plan: String },

    /// Append a day to a plan
    AddDay { plan: String, name: String },

    /// Rename a day
    RenameDay {
        plan: String,
        /// Day index or name
        day: String,
        name: String,
    },

    /// Remove a day from a plan
    RemoveDay { plan: String, day: String },

    /// Schedule a catalog exercise on a day - Usage: plan add-ex PLAN DAY EXERCISE
    #[command(override_usage = "plan add-ex <PLAN> <DAY> <EXERCISE> [--sets N] [--min N] [--max N]")]
    AddEx {
        plan: String,
        day: String,

        /// Exercise index (from `exercise list`), id or name
        exercise: String,

        /// Number of sets
        #[arg(long, short = 's', default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=MAX_SETS as i64))]
        sets: u32,

        /// Lower bound of the rep range
        #[arg(long, default_value_t = 8)]
        min: u32,

        /// Upper bound of the rep range
        #[arg(long, default_value_t = 12)]
        max: u32,
    },

    /// Remove an exercise from a day
    RemoveEx {
        plan: String,
        day: String,

        /// Exercise index within the day, or name
        exercise: String,
    },
}

#[derive(Subcommand)]
pub enum SessionCmd {
    /// Start a session for a plan day
    #[command(visible_alias = "s")]
    Start { plan: String, day: String },

    /// Show current session details
    #[command(visible_alias = "i")]
    Show,

    /// Edit a set in the current session - Usage: session set EXERCISE SET [--weight W] [--reps R]
    #[command(visible_alias = "e")]
    #[command(override_usage = "session set <EXERCISE> <SET> [--weight W] [--reps R]")]
    Set {
        /// 1-based exercise index (same order shown in `session show`)
        #[arg(value_name = "EXERCISE")]
        exercise: usize,

        /// 1-based set index
        #[arg(value_name = "SET")]
        set: usize,

        /// Weight in the configured unit
        #[arg(long, short = 'w')]
        weight: Option<f64>,

        /// Number of reps
        #[arg(long, short = 'r')]
        reps: Option<u32>,
    },

    /// Append a set to an exercise
    AddSet {
        #[arg(value_name = "EXERCISE")]
        exercise: usize,
    },

    /// Mark a set done, or undo it
    #[command(visible_alias = "x")]
    Done {
        #[arg(value_name = "EXERCISE")]
        exercise: usize,

        #[arg(value_name = "SET")]
        set: usize,
    },

    /// Save the current session
    #[command(visible_alias = "f")]
    Finish,

    /// Cancel the current session
    #[command(visible_alias = "c")]
    Cancel,

    /// List completed sessions, newest first
    #[command(visible_alias = "h")]
    History {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Show details of a completed session
    Log {
        /// Index from `session history`
        #[arg(conflicts_with = "date")]
        index: Option<usize>,

        /// Date in YYYY-MM-DD format
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
pub enum DiaryCmd {
    /// Show the entry for a date (defaults to today)
    Show {
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Rate the day, 1 (awful) to 5 (great)
    Mood {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        mood: u8,

        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Replace the entry text
    #[command(trailing_var_arg = true)]
    Write {
        #[arg(short, long)]
        date: Option<NaiveDate>,

        text: Vec<String>,
    },

    /// Manage the goal checklist
    #[command(subcommand)]
    Goal(GoalCmd),

    /// Summary of the week containing a date
    Week {
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
pub enum GoalCmd {
    /// Add a goal
    #[command(trailing_var_arg = true)]
    Add {
        #[arg(short, long)]
        date: Option<NaiveDate>,

        text: Vec<String>,
    },

    /// Flip a goal between open and done
    Toggle {
        /// 1-based goal index (from `diary show`)
        goal: usize,

        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Remove a goal
    Rm {
        goal: usize,

        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
pub enum CoachCmd {
    /// Send a message and print the reply
    #[command(visible_alias = "a", trailing_var_arg = true)]
    Ask { message: Vec<String> },

    /// Print the conversation
    #[command(visible_alias = "h")]
    History,

    /// Delete the conversation
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum ExerciseCmd {
    /// List catalog exercises
    #[command(visible_alias = "l")]
    List {
        /// Match name or primary muscle
        #[arg(short, long)]
        query: Option<String>,

        #[arg(short, long, value_enum)]
        category: Option<ExerciseCategory>,
    },

    /// Show detailed exercise information
    #[command(visible_alias = "s", trailing_var_arg = true)]
    Show {
        /// Exercise index, id or name
        exercise: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum DataCmd {
    /// Export everything to a JSON file
    Export {
        /// Output file path (defaults to ironlog-backup-<date>.json, `-` for stdout)
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Replace everything with the contents of a backup
    Import { file: String },

    /// Delete all data and restore the stock exercise catalog
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Show all config keys
    List,

    /// Get the value of a key
    Get { key: String },

    /// Set or override a key
    Set { key: String, val: String },

    /// Remove a key
    Unset { key: String },
}
