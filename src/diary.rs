//! Training diary: one entry per calendar date with free text, a mood and a
//! goal checklist. Entries are created on their first edit and never deleted
//! one by one.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::{
    error::StoreError,
    models::{DiaryEntry, DiaryGoal, WorkoutSession},
    store::{Order, Store},
    types::Mood,
    utils::new_id,
};

/// Fields to overwrite on a diary entry. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub content: Option<String>,
    pub goals: Option<Vec<DiaryGoal>>,
    pub mood: Option<Mood>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySummary {
    /// Monday first; `None` where the date has no entry.
    pub moods: [Option<Mood>; 7],
    /// Percent of the week's goals that are completed, 0 when there are none.
    pub goal_completion_rate: u32,
    pub workout_count: usize,
}

/// The Monday-to-Sunday week containing `reference`.
pub fn week_dates(reference: NaiveDate) -> [NaiveDate; 7] {
    let monday = reference - Duration::days(i64::from(reference.weekday().num_days_from_monday()));
    std::array::from_fn(|i| monday + Duration::days(i as i64))
}

/// Completed sessions that started (UTC date) within `week`.
pub fn count_workouts(history: &[WorkoutSession], week: &[NaiveDate; 7]) -> usize {
    history
        .iter()
        .filter(|s| s.is_completed() && week.contains(&s.started_at.date_naive()))
        .count()
}

pub struct Diary<'a> {
    store: &'a Store,
    entries: Vec<DiaryEntry>,
}

impl<'a> Diary<'a> {
    pub async fn load(store: &'a Store) -> Result<Self, StoreError> {
        let entries = store.ordered(Order::Asc).await?;
        Ok(Self { store, entries })
    }

    pub fn entries(&self) -> &[DiaryEntry] {
        &self.entries
    }

    pub fn entry_for(&self, date: NaiveDate) -> Option<&DiaryEntry> {
        self.entries.iter().find(|e| e.date == date)
    }

    /// Upserts the entry for `date`: an existing entry takes the patch and a
    /// new `updated_at`, otherwise a fresh entry is created from the patch.
    pub async fn save_entry(&mut self, date: NaiveDate, patch: EntryPatch) -> Result<DiaryEntry, StoreError> {
        let existing = self.entry_for(date).cloned();
        let base = match &existing {
            Some(e) => DiaryEntry {
                updated_at: Utc::now(),
                ..e.clone()
            },
            None => DiaryEntry::new(date),
        };
        let entry = DiaryEntry {
            content: patch.content.unwrap_or(base.content.clone()),
            goals: patch.goals.unwrap_or(base.goals.clone()),
            mood: patch.mood.unwrap_or(base.mood),
            ..base
        };

        self.store.put(&entry).await?;
        match existing {
            Some(_) => {
                if let Some(slot) = self.entries.iter_mut().find(|e| e.id == entry.id) {
                    *slot = entry.clone();
                }
            }
            None => self.entries.push(entry.clone()),
        }
        debug!(date = %date, "saved diary entry");
        Ok(entry)
    }

    pub async fn set_mood(&mut self, date: NaiveDate, mood: Mood) -> Result<DiaryEntry, StoreError> {
        self.save_entry(date, EntryPatch { mood: Some(mood), ..Default::default() })
            .await
    }

    pub async fn update_content(&mut self, date: NaiveDate, content: &str) -> Result<DiaryEntry, StoreError> {
        self.save_entry(
            date,
            EntryPatch {
                content: Some(content.to_string()),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn add_goal(&mut self, date: NaiveDate, text: &str) -> Result<DiaryEntry, StoreError> {
        let mut goals = self.entry_for(date).map(|e| e.goals.clone()).unwrap_or_default();
        goals.push(DiaryGoal {
            id: new_id(),
            text: text.to_string(),
            is_completed: false,
        });
        self.save_entry(date, EntryPatch { goals: Some(goals), ..Default::default() })
            .await
    }

    /// `Ok(None)` when there is no entry for `date`.
    pub async fn toggle_goal(&mut self, date: NaiveDate, goal_id: &str) -> Result<Option<DiaryEntry>, StoreError> {
        let Some(existing) = self.entry_for(date) else {
            return Ok(None);
        };
        let goals = existing
            .goals
            .iter()
            .map(|g| DiaryGoal {
                is_completed: if g.id == goal_id { !g.is_completed } else { g.is_completed },
                ..g.clone()
            })
            .collect();
        self.save_entry(date, EntryPatch { goals: Some(goals), ..Default::default() })
            .await
            .map(Some)
    }

    /// `Ok(None)` when there is no entry for `date`.
    pub async fn remove_goal(&mut self, date: NaiveDate, goal_id: &str) -> Result<Option<DiaryEntry>, StoreError> {
        let Some(existing) = self.entry_for(date) else {
            return Ok(None);
        };
        let goals = existing.goals.iter().filter(|g| g.id != goal_id).cloned().collect();
        self.save_entry(date, EntryPatch { goals: Some(goals), ..Default::default() })
            .await
            .map(Some)
    }

    pub fn weekly_summary(&self, week: &[NaiveDate; 7], workout_count: usize) -> WeeklySummary {
        let week_entries: Vec<&DiaryEntry> = week.iter().filter_map(|d| self.entry_for(*d)).collect();
        let moods = (*week).map(|d| self.entry_for(d).map(|e| e.mood));

        let total: usize = week_entries.iter().map(|e| e.goals.len()).sum();
        let completed: usize = week_entries
            .iter()
            .map(|e| e.goals.iter().filter(|g| g.is_completed).count())
            .sum();
        let goal_completion_rate = if total == 0 {
            0
        } else {
            (100.0 * completed as f64 / total as f64).round() as u32
        };

        WeeklySummary {
            moods,
            goal_completion_rate,
            workout_count,
        }
    }
}
