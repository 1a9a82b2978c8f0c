//! Workout plan repository.
//!
//! A plan is one aggregate: every edit builds a new `WorkoutPlan` value from
//! the stored one and writes the whole document back. Edits are not wrapped
//! in a transaction, so two overlapping edits of the same plan resolve as
//! last write wins.

use chrono::Utc;
use tracing::{debug, info};

use crate::{
    error::{PlanError, StoreError},
    models::{PlannedExercise, WorkoutDay, WorkoutPlan},
    store::{Order, Store},
    utils::new_id,
};

/// Upper bound on planned sets per exercise.
pub const MAX_SETS: u32 = 50;

/// What the caller supplies when scheduling an exercise on a day.
/// Identity and position are assigned by the repository.
#[derive(Debug, Clone)]
pub struct PlannedExerciseDraft {
    pub exercise_id: String,
    pub exercise_name: String,
    pub sets: u32,
    pub rep_range_min: u32,
    pub rep_range_max: u32,
}

impl WorkoutPlan {
    /// Appends a day at the end, `order = days.len()`.
    pub fn with_day(mut self, name: impl Into<String>) -> Self {
        let order = self.days.len() as u32;
        self.days.push(WorkoutDay {
            id: new_id(),
            name: name.into(),
            exercises: Vec::new(),
            order,
        });
        self
    }

    /// Drops the day and renumbers the rest `0..`.
    pub fn without_day(self, day_id: &str) -> Self {
        let days = self
            .days
            .into_iter()
            .filter(|d| d.id != day_id)
            .enumerate()
            .map(|(i, d)| WorkoutDay { order: i as u32, ..d })
            .collect();
        Self { days, ..self }
    }

    /// Swaps in `day` for the day with the same id.
    pub fn with_day_replaced(self, day: WorkoutDay) -> Self {
        let days = self
            .days
            .into_iter()
            .map(|d| if d.id == day.id { day.clone() } else { d })
            .collect();
        Self { days, ..self }
    }

    pub fn day(&self, day_id: &str) -> Option<&WorkoutDay> {
        self.days.iter().find(|d| d.id == day_id)
    }
}

impl WorkoutDay {
    pub fn with_exercise(mut self, draft: PlannedExerciseDraft) -> Self {
        let order = self.exercises.len() as u32;
        self.exercises.push(PlannedExercise {
            id: new_id(),
            exercise_id: draft.exercise_id,
            exercise_name: draft.exercise_name,
            sets: draft.sets,
            rep_range_min: draft.rep_range_min,
            rep_range_max: draft.rep_range_max,
            order,
        });
        self
    }

    /// Drops the planned exercise and renumbers the rest `0..`.
    pub fn without_exercise(self, planned_id: &str) -> Self {
        let exercises = self
            .exercises
            .into_iter()
            .filter(|e| e.id != planned_id)
            .enumerate()
            .map(|(i, e)| PlannedExercise { order: i as u32, ..e })
            .collect();
        Self { exercises, ..self }
    }
}

pub struct PlanRepository<'a> {
    store: &'a Store,
}

impl<'a> PlanRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// All plans, oldest first.
    pub async fn list(&self) -> Result<Vec<WorkoutPlan>, StoreError> {
        self.store.ordered(Order::Asc).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<WorkoutPlan>, StoreError> {
        self.store.get(id).await
    }

    pub async fn create_plan(&self, name: &str) -> Result<WorkoutPlan, StoreError> {
        let plan = WorkoutPlan::new(name);
        self.store.insert(&plan).await?;
        info!(id = %plan.id, name, "created plan");
        Ok(plan)
    }

    /// Stores a full snapshot of `plan`, stamping `updated_at`.
    pub async fn update_plan(&self, plan: WorkoutPlan) -> Result<WorkoutPlan, StoreError> {
        let updated = WorkoutPlan {
            updated_at: Utc::now(),
            ..plan
        };
        self.store.put(&updated).await?;
        debug!(id = %updated.id, "updated plan");
        Ok(updated)
    }

    pub async fn delete_plan(&self, id: &str) -> Result<(), StoreError> {
        if self.store.delete::<WorkoutPlan>(id).await? {
            info!(id, "deleted plan");
        }
        Ok(())
    }

    /// `Ok(None)` when the plan does not exist.
    pub async fn add_day_to_plan(
        &self,
        plan_id: &str,
        name: &str,
    ) -> Result<Option<WorkoutPlan>, StoreError> {
        let Some(plan) = self.get(plan_id).await? else {
            return Ok(None);
        };
        self.update_plan(plan.with_day(name)).await.map(Some)
    }

    pub async fn remove_day_from_plan(
        &self,
        plan_id: &str,
        day_id: &str,
    ) -> Result<Option<WorkoutPlan>, StoreError> {
        let Some(plan) = self.get(plan_id).await? else {
            return Ok(None);
        };
        self.update_plan(plan.without_day(day_id)).await.map(Some)
    }

    pub async fn update_day(
        &self,
        plan_id: &str,
        day: WorkoutDay,
    ) -> Result<Option<WorkoutPlan>, StoreError> {
        let Some(plan) = self.get(plan_id).await? else {
            return Ok(None);
        };
        self.update_plan(plan.with_day_replaced(day)).await.map(Some)
    }

    pub async fn add_exercise_to_day(
        &self,
        plan_id: &str,
        day_id: &str,
        draft: PlannedExerciseDraft,
    ) -> Result<Option<WorkoutPlan>, PlanError> {
        if !(1..=MAX_SETS).contains(&draft.sets) {
            return Err(PlanError::InvalidSetCount {
                sets: draft.sets,
                max: MAX_SETS,
            });
        }
        if draft.rep_range_min > draft.rep_range_max {
            return Err(PlanError::InvalidRepRange {
                min: draft.rep_range_min,
                max: draft.rep_range_max,
            });
        }

        let Some(plan) = self.get(plan_id).await? else {
            return Ok(None);
        };
        let Some(day) = plan.day(day_id).cloned() else {
            return Ok(None);
        };
        Ok(self.update_day(plan_id, day.with_exercise(draft)).await?)
    }

    pub async fn remove_exercise_from_day(
        &self,
        plan_id: &str,
        day_id: &str,
        planned_id: &str,
    ) -> Result<Option<WorkoutPlan>, StoreError> {
        let Some(plan) = self.get(plan_id).await? else {
            return Ok(None);
        };
        let Some(day) = plan.day(day_id).cloned() else {
            return Ok(None);
        };
        self.update_day(plan_id, day.without_exercise(planned_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn store() -> Store {
        Store::new(db::open_in_memory().await.unwrap())
    }

    fn draft(name: &str) -> PlannedExerciseDraft {
        PlannedExerciseDraft {
            exercise_id: name.to_lowercase(),
            exercise_name: name.to_string(),
            sets: 3,
            rep_range_min: 8,
            rep_range_max: 12,
        }
    }

    fn orders(plan: &WorkoutPlan) -> Vec<u32> {
        plan.days.iter().map(|d| d.order).collect()
    }

    #[tokio::test]
    async fn create_and_list() {
        let store = store().await;
        let repo = PlanRepository::new(&store);
        let a = repo.create_plan("Upper/Lower").await.unwrap();
        assert!(a.days.is_empty());
        repo.create_plan("Full Body").await.unwrap();

        let plans = repo.list().await.unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].name, "Upper/Lower");
    }

    #[tokio::test]
    async fn days_append_with_next_order() {
        let store = store().await;
        let repo = PlanRepository::new(&store);
        let plan = repo.create_plan("PPL").await.unwrap();
        for name in ["Push", "Pull", "Legs"] {
            repo.add_day_to_plan(&plan.id, name).await.unwrap().unwrap();
        }

        let plan = repo.get(&plan.id).await.unwrap().unwrap();
        assert_eq!(orders(&plan), [0, 1, 2]);
        assert!(plan.updated_at >= plan.created_at);
    }

    #[tokio::test]
    async fn removing_a_day_keeps_orders_contiguous() {
        let store = store().await;
        let repo = PlanRepository::new(&store);
        let plan = repo.create_plan("PPL").await.unwrap();
        for name in ["Push", "Pull", "Legs", "Arms"] {
            repo.add_day_to_plan(&plan.id, name).await.unwrap();
        }
        let plan = repo.get(&plan.id).await.unwrap().unwrap();
        let pull = plan.days[1].id.clone();

        let plan = repo
            .remove_day_from_plan(&plan.id, &pull)
            .await
            .unwrap()
            .unwrap();
        let names: Vec<_> = plan.days.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["Push", "Legs", "Arms"]);
        assert_eq!(orders(&plan), [0, 1, 2]);
    }

    #[tokio::test]
    async fn removing_an_exercise_keeps_orders_contiguous() {
        let store = store().await;
        let repo = PlanRepository::new(&store);
        let plan = repo.create_plan("PPL").await.unwrap();
        let plan = repo.add_day_to_plan(&plan.id, "Push").await.unwrap().unwrap();
        let day_id = plan.days[0].id.clone();
        for name in ["Bench", "Incline", "Dips"] {
            repo.add_exercise_to_day(&plan.id, &day_id, draft(name))
                .await
                .unwrap()
                .unwrap();
        }
        let plan = repo.get(&plan.id).await.unwrap().unwrap();
        let first = plan.days[0].exercises[0].id.clone();

        let plan = repo
            .remove_exercise_from_day(&plan.id, &day_id, &first)
            .await
            .unwrap()
            .unwrap();
        let day = &plan.days[0];
        let names: Vec<_> = day.exercises.iter().map(|e| e.exercise_name.as_str()).collect();
        assert_eq!(names, ["Incline", "Dips"]);
        let orders: Vec<_> = day.exercises.iter().map(|e| e.order).collect();
        assert_eq!(orders, [0, 1]);
    }

    #[tokio::test]
    async fn invalid_rep_range_is_rejected() {
        let store = store().await;
        let repo = PlanRepository::new(&store);
        let plan = repo.create_plan("PPL").await.unwrap();
        let plan = repo.add_day_to_plan(&plan.id, "Push").await.unwrap().unwrap();

        let mut bad = draft("Bench");
        bad.rep_range_min = 12;
        bad.rep_range_max = 8;
        let err = repo
            .add_exercise_to_day(&plan.id, &plan.days[0].id, bad)
            .await
            .unwrap_err();
        assert!(matches!(err, PlanError::InvalidRepRange { min: 12, max: 8 }));
    }

    #[tokio::test]
    async fn set_count_is_bounded() {
        let store = store().await;
        let repo = PlanRepository::new(&store);
        let plan = repo.create_plan("PPL").await.unwrap();
        let plan = repo.add_day_to_plan(&plan.id, "Push").await.unwrap().unwrap();
        let day_id = plan.days[0].id.clone();

        for sets in [0, MAX_SETS + 1, u32::MAX] {
            let mut bad = draft("Bench");
            bad.sets = sets;
            let err = repo.add_exercise_to_day(&plan.id, &day_id, bad).await.unwrap_err();
            assert!(matches!(err, PlanError::InvalidSetCount { sets: s, .. } if s == sets));
        }

        let mut ok = draft("Bench");
        ok.sets = MAX_SETS;
        let plan = repo.add_exercise_to_day(&plan.id, &day_id, ok).await.unwrap().unwrap();
        assert_eq!(plan.days[0].exercises[0].sets, MAX_SETS);
    }

    #[tokio::test]
    async fn missing_plan_is_a_no_op() {
        let store = store().await;
        let repo = PlanRepository::new(&store);
        assert!(repo.add_day_to_plan("nope", "Push").await.unwrap().is_none());
        assert!(repo.remove_day_from_plan("nope", "x").await.unwrap().is_none());
        repo.delete_plan("nope").await.unwrap();
    }

    #[tokio::test]
    async fn delete_removes_days_with_plan() {
        let store = store().await;
        let repo = PlanRepository::new(&store);
        let plan = repo.create_plan("PPL").await.unwrap();
        repo.add_day_to_plan(&plan.id, "Push").await.unwrap();
        repo.delete_plan(&plan.id).await.unwrap();
        assert!(repo.get(&plan.id).await.unwrap().is_none());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_day_renames_in_place() {
        let store = store().await;
        let repo = PlanRepository::new(&store);
        let plan = repo.create_plan("PPL").await.unwrap();
        let plan = repo.add_day_to_plan(&plan.id, "Push").await.unwrap().unwrap();
        let day = WorkoutDay {
            name: "Chest & Tris".into(),
            ..plan.days[0].clone()
        };
        let plan = repo.update_day(&plan.id, day).await.unwrap().unwrap();
        assert_eq!(plan.days[0].name, "Chest & Tris");
        assert_eq!(plan.days[0].order, 0);
    }
}
