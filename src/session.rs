//! Workout session lifecycle.
//!
//! `SessionManager` owns at most one active session plus the completed
//! session history (newest first) that personal-record detection scans.
//!
//! ```text
//! Idle ──start──▶ Active ──finish──▶ Idle   (stored in history)
//!                   │
//!                   └────cancel────▶ Idle   (discarded)
//! ```

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::{
    error::{SessionError, StoreError},
    models::{LoggedExercise, LoggedSet, WorkoutDay, WorkoutSession},
    pr::is_personal_record,
    store::{Order, Store},
    utils::new_id,
};

/// Fields of a set that `update_set` may replace. `None` leaves the field as is.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SetUpdate {
    pub weight: Option<f64>,
    pub reps: Option<u32>,
}

/// Builds the logged exercises for a new session of `day`.
///
/// Each planned exercise gets its target number of sets. Weight and reps are
/// copied by position from the same exercise in `previous`, or zero when there
/// is no such exercise or set.
pub fn prefill_exercises(previous: Option<&WorkoutSession>, day: &WorkoutDay) -> Vec<LoggedExercise> {
    day.exercises
        .iter()
        .map(|pe| {
            let prev = previous.and_then(|s| s.exercises.iter().find(|e| e.exercise_id == pe.exercise_id));
            let sets = (0..pe.sets as usize)
                .map(|i| {
                    let (weight, reps) = prev
                        .and_then(|e| e.sets.get(i))
                        .map_or((0.0, 0), |s| (s.weight, s.reps));
                    LoggedSet::new(i as u32 + 1, weight, reps)
                })
                .collect();

            LoggedExercise {
                id: new_id(),
                exercise_id: pe.exercise_id.clone(),
                exercise_name: pe.exercise_name.clone(),
                sets,
            }
        })
        .collect()
}

#[derive(Debug, Default)]
pub struct SessionManager {
    active: Option<WorkoutSession>,
    history: Vec<WorkoutSession>,
}

impl SessionManager {
    /// `history` must be newest first.
    pub fn new(history: Vec<WorkoutSession>) -> Self {
        Self {
            active: None,
            history,
        }
    }

    /// Loads completed sessions from the store, newest first.
    pub async fn load(store: &Store) -> Result<Self, StoreError> {
        let history: Vec<WorkoutSession> = store.ordered(Order::Desc).await?;
        debug!(sessions = history.len(), "loaded session history");
        Ok(Self::new(history))
    }

    pub fn active(&self) -> Option<&WorkoutSession> {
        self.active.as_ref()
    }

    pub fn history(&self) -> &[WorkoutSession] {
        &self.history
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The most recent completed session of this plan and day.
    pub fn previous_session(&self, plan_id: &str, day_id: &str) -> Option<&WorkoutSession> {
        self.history
            .iter()
            .find(|s| s.plan_id == plan_id && s.day_id == day_id && s.is_completed())
    }

    /// Makes a new active session. Refuses to replace one that is already
    /// active, so unsaved progress is never dropped silently.
    pub fn start_session(
        &mut self,
        plan_id: &str,
        day_id: &str,
        day_name: &str,
        exercises: Vec<LoggedExercise>,
    ) -> Result<&WorkoutSession, SessionError> {
        if let Some(active) = &self.active {
            return Err(SessionError::AlreadyActive {
                id: active.id.clone(),
            });
        }

        let session = WorkoutSession::new(plan_id, day_id, day_name, exercises);
        info!(id = %session.id, plan_id, day_id, "started session");
        Ok(self.active.insert(session))
    }

    /// Re-installs a session saved earlier as a draft. Returns false, leaving
    /// nothing active, when the draft was already finished into history.
    pub fn restore(&mut self, session: WorkoutSession) -> Result<bool, SessionError> {
        if let Some(active) = &self.active {
            return Err(SessionError::AlreadyActive {
                id: active.id.clone(),
            });
        }
        if self.history.iter().any(|s| s.id == session.id) {
            warn!(id = %session.id, "stale draft of a finished session");
            return Ok(false);
        }
        self.active = Some(session);
        Ok(true)
    }

    fn set_mut(&mut self, exercise_index: usize, set_index: usize) -> Option<&mut LoggedSet> {
        self.active
            .as_mut()?
            .exercises
            .get_mut(exercise_index)?
            .sets
            .get_mut(set_index)
    }

    /// Replaces the given fields of one set. Returns false, changing nothing,
    /// when there is no active session, the indices are out of range or the
    /// weight is negative.
    pub fn update_set(&mut self, exercise_index: usize, set_index: usize, update: SetUpdate) -> bool {
        if let Some(w) = update.weight {
            if !w.is_finite() || w < 0.0 {
                warn!(weight = w, "ignoring invalid weight");
                return false;
            }
        }

        let Some(set) = self.set_mut(exercise_index, set_index) else {
            debug!(exercise_index, set_index, "update_set: nothing to update");
            return false;
        };
        if let Some(w) = update.weight {
            set.weight = w;
        }
        if let Some(r) = update.reps {
            set.reps = r;
        }
        true
    }

    /// Appends an empty set to one exercise and returns its set number.
    pub fn add_set(&mut self, exercise_index: usize) -> Option<u32> {
        let exercise = self.active.as_mut()?.exercises.get_mut(exercise_index)?;
        let set_number = exercise.sets.len() as u32 + 1;
        exercise.sets.push(LoggedSet::new(set_number, 0.0, 0));
        Some(set_number)
    }

    /// Toggles completion of one set.
    ///
    /// Completing a set runs personal-record detection against the history;
    /// un-completing it always clears the record flag.
    pub fn complete_set(&mut self, exercise_index: usize, set_index: usize) -> Option<&LoggedSet> {
        let exercise = self.active.as_mut()?.exercises.get_mut(exercise_index)?;
        let exercise_id = exercise.exercise_id.clone();
        let set = exercise.sets.get_mut(set_index)?;

        if set.is_completed {
            set.is_completed = false;
            set.is_pr = false;
        } else {
            set.is_completed = true;
            set.is_pr = is_personal_record(&self.history, &exercise_id, set.weight, set.reps);
            if set.is_pr {
                info!(exercise_id = %exercise_id, weight = set.weight, reps = set.reps, "new personal record");
            }
        }
        Some(&*set)
    }

    /// Stamps the completion time, stores the session and returns to idle.
    ///
    /// Sets do not need to be complete. If the store write fails the session
    /// stays active and the error is returned.
    pub async fn finish_session(&mut self, store: &Store) -> Result<Option<WorkoutSession>, StoreError> {
        let Some(active) = &self.active else {
            return Ok(None);
        };

        let completed = WorkoutSession {
            completed_at: Some(Utc::now()),
            ..active.clone()
        };
        store.insert(&completed).await?;

        self.active = None;
        self.history.insert(0, completed.clone());
        info!(id = %completed.id, "finished session");
        Ok(Some(completed))
    }

    /// Drops the active session without storing it.
    pub fn cancel_session(&mut self) -> Option<WorkoutSession> {
        let cancelled = self.active.take();
        if let Some(s) = &cancelled {
            info!(id = %s.id, "cancelled session");
        }
        cancelled
    }
}
