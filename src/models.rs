use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    store::{Collection, Document, timestamp_key},
    types::{Equipment, ExerciseCategory, Mood, Role},
    utils::new_id,
};

/// A named training plan made of ordered days.
/// Persisted as one document; days and planned exercises live inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    pub id: String,
    pub name: String,
    pub days: Vec<WorkoutDay>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDay {
    pub id: String,
    pub name: String,
    pub exercises: Vec<PlannedExercise>,
    pub order: u32,
}

/// A catalog exercise scheduled on a day, with its set and rep targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedExercise {
    pub id: String,
    pub exercise_id: String,
    pub exercise_name: String,
    pub sets: u32,
    pub rep_range_min: u32,
    pub rep_range_max: u32,
    pub order: u32,
}

/// A logged workout. `completed_at` is `None` while the session is active;
/// only completed sessions are stored in the sessions collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,
    pub plan_id: String,
    pub day_id: String,
    pub day_name: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub exercises: Vec<LoggedExercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedExercise {
    pub id: String,
    pub exercise_id: String,
    pub exercise_name: String,
    pub sets: Vec<LoggedSet>,
}

/// One set of a logged exercise. Weight is kilograms.
/// `is_pr` is only ever true on a completed set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedSet {
    pub id: String,
    pub set_number: u32,
    pub weight: f64,
    pub reps: u32,
    pub is_completed: bool,
    #[serde(rename = "isPR")]
    pub is_pr: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    pub id: String,
    pub date: NaiveDate,
    pub content: String,
    pub goals: Vec<DiaryGoal>,
    pub mood: Mood,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryGoal {
    pub id: String,
    pub text: String,
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub category: ExerciseCategory,
    pub equipment: Equipment,
    pub video_url: String,
    pub thumbnail_url: String,
    pub instructions: Vec<String>,
    pub primary_muscles: Vec<String>,
    pub secondary_muscles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

//
// Constructors
//

impl WorkoutPlan {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            name: name.into(),
            days: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl WorkoutSession {
    pub fn new(
        plan_id: impl Into<String>,
        day_id: impl Into<String>,
        day_name: impl Into<String>,
        exercises: Vec<LoggedExercise>,
    ) -> Self {
        Self {
            id: new_id(),
            plan_id: plan_id.into(),
            day_id: day_id.into(),
            day_name: day_name.into(),
            started_at: Utc::now(),
            completed_at: None,
            exercises,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Sum of weight × reps over completed sets.
    pub fn volume(&self) -> f64 {
        self.exercises
            .iter()
            .flat_map(|e| &e.sets)
            .filter(|s| s.is_completed)
            .map(LoggedSet::volume)
            .sum()
    }
}

impl LoggedSet {
    /// A fresh, incomplete set.
    pub fn new(set_number: u32, weight: f64, reps: u32) -> Self {
        Self {
            id: new_id(),
            set_number,
            weight,
            reps,
            is_completed: false,
            is_pr: false,
        }
    }

    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps)
    }
}

impl DiaryEntry {
    /// An empty entry for `date` with the default mood.
    pub fn new(date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            date,
            content: String::new(),
            goals: Vec::new(),
            mood: Mood::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl CoachMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

//
// Collections
//

impl Document for WorkoutPlan {
    const COLLECTION: Collection = Collection::WorkoutPlans;

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_key(&self) -> String {
        timestamp_key(&self.created_at)
    }
}

impl Document for WorkoutSession {
    const COLLECTION: Collection = Collection::WorkoutSessions;

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_key(&self) -> String {
        timestamp_key(&self.started_at)
    }
}

impl Document for DiaryEntry {
    const COLLECTION: Collection = Collection::DiaryEntries;

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

impl Document for Exercise {
    const COLLECTION: Collection = Collection::Exercises;

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_key(&self) -> String {
        self.name.to_lowercase()
    }
}

impl Document for CoachMessage {
    const COLLECTION: Collection = Collection::CoachMessages;

    fn id(&self) -> &str {
        &self.id
    }

    fn sort_key(&self) -> String {
        timestamp_key(&self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logged_set_uses_pr_field_name() {
        let set = LoggedSet::new(1, 100.0, 5);
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["setNumber"], 1);
        assert_eq!(json["isCompleted"], false);
        assert_eq!(json["isPR"], false);
    }

    #[test]
    fn session_volume_counts_completed_sets_only() {
        let mut done = LoggedSet::new(1, 100.0, 5);
        done.is_completed = true;
        let pending = LoggedSet::new(2, 100.0, 5);
        let session = WorkoutSession::new(
            "p",
            "d",
            "Push",
            vec![LoggedExercise {
                id: new_id(),
                exercise_id: "bench".into(),
                exercise_name: "Bench Press".into(),
                sets: vec![done, pending],
            }],
        );
        assert_eq!(session.volume(), 500.0);
    }

    #[test]
    fn diary_date_is_iso() {
        let entry = DiaryEntry::new(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["date"], "2024-03-05");
        assert_eq!(json["mood"], 3);
        assert_eq!(entry.sort_key(), "2024-03-05");
    }
}
