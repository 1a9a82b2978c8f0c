//! Whole-database backup: a single JSON document holding every collection.

use std::io::Write;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::{
    catalog,
    error::{ImportError, StoreError},
    models::{CoachMessage, DiaryEntry, Exercise, WorkoutPlan, WorkoutSession},
    store::{self, Collection, Store},
};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    pub workout_plans: Vec<WorkoutPlan>,
    #[serde(default)]
    pub workout_sessions: Vec<WorkoutSession>,
    #[serde(default)]
    pub diary_entries: Vec<DiaryEntry>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub coach_messages: Vec<CoachMessage>,
}

/// `ironlog-backup-2024-03-15.json`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("ironlog-backup-{}.json", date.format("%Y-%m-%d"))
}

pub async fn export_snapshot(store: &Store) -> Result<Snapshot, StoreError> {
    Ok(Snapshot {
        version: FORMAT_VERSION,
        exported_at: Some(Utc::now()),
        workout_plans: store.all().await?,
        workout_sessions: store.all().await?,
        diary_entries: store.all().await?,
        exercises: store.all().await?,
        coach_messages: store.all().await?,
    })
}

/// Writes the snapshot as pretty-printed JSON.
pub async fn export_to_writer<W: Write>(store: &Store, mut out: W) -> Result<Snapshot, ImportError> {
    let snapshot = export_snapshot(store).await?;
    serde_json::to_writer_pretty(&mut out, &snapshot).map_err(StoreError::from)?;
    writeln!(out)?;
    out.flush()?;
    info!(
        plans = snapshot.workout_plans.len(),
        sessions = snapshot.workout_sessions.len(),
        "exported data"
    );
    Ok(snapshot)
}

/// Checks the backup header before anything is touched: `version` must be a
/// non-zero number and `workoutPlans` an array.
fn parse_snapshot(json: &str) -> Result<Snapshot, ImportError> {
    let value: Value = serde_json::from_str(json).map_err(|e| {
        warn!(error = %e, "backup is not valid JSON");
        ImportError::InvalidFormat
    })?;

    let version_ok = value
        .get("version")
        .and_then(Value::as_f64)
        .is_some_and(|v| v != 0.0);
    let plans_ok = value.get("workoutPlans").is_some_and(Value::is_array);
    if !version_ok || !plans_ok {
        return Err(ImportError::InvalidFormat);
    }

    serde_json::from_value(value).map_err(|e| {
        warn!(error = %e, "backup records do not match the expected shape");
        ImportError::InvalidFormat
    })
}

/// Replaces every collection with the backup's contents in one transaction.
/// A malformed backup leaves the database untouched.
pub async fn import_snapshot(store: &Store, json: &str) -> Result<Snapshot, ImportError> {
    let snapshot = parse_snapshot(json)?;

    let mut tx = store.pool().begin().await.map_err(StoreError::from)?;
    for collection in Collection::ALL {
        store::clear_in(&mut tx, collection).await?;
    }
    store::insert_many(&mut tx, &snapshot.workout_plans).await?;
    store::insert_many(&mut tx, &snapshot.workout_sessions).await?;
    store::insert_many(&mut tx, &snapshot.diary_entries).await?;
    store::insert_many(&mut tx, &snapshot.exercises).await?;
    store::insert_many(&mut tx, &snapshot.coach_messages).await?;
    tx.commit().await.map_err(|e| {
        error!(error = %e, "import commit failed");
        StoreError::from(e)
    })?;

    info!(
        plans = snapshot.workout_plans.len(),
        sessions = snapshot.workout_sessions.len(),
        diary = snapshot.diary_entries.len(),
        exercises = snapshot.exercises.len(),
        messages = snapshot.coach_messages.len(),
        "imported backup"
    );
    Ok(snapshot)
}

/// Empties every collection and the active-session draft, then puts the
/// stock exercise catalog back.
pub async fn delete_all(store: &Store) -> Result<(), StoreError> {
    let mut tx = store.pool().begin().await?;
    for collection in Collection::ALL {
        store::clear_in(&mut tx, collection).await?;
    }
    tx.commit().await?;

    store.clear_active_session().await?;
    catalog::seed_if_empty(store).await?;
    info!("deleted all data");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, models::DiaryEntry, plans::PlanRepository};

    async fn store() -> Store {
        let store = Store::new(db::open_in_memory().await.unwrap());
        catalog::seed_if_empty(&store).await.unwrap();
        store
    }

    #[test]
    fn file_name_carries_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(backup_file_name(date), "ironlog-backup-2024-03-15.json");
    }

    #[tokio::test]
    async fn export_writes_camel_case_header() {
        let store = store().await;
        PlanRepository::new(&store).create_plan("PPL").await.unwrap();

        let mut buf = Vec::new();
        export_to_writer(&store, &mut buf).await.unwrap();
        let value: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["version"], 1);
        assert!(value["exportedAt"].is_string());
        assert_eq!(value["workoutPlans"][0]["name"], "PPL");
        assert_eq!(
            value["exercises"].as_array().unwrap().len(),
            catalog::SEED_EXERCISES.len()
        );
    }

    #[tokio::test]
    async fn invalid_backup_leaves_data_alone() {
        let store = store().await;
        PlanRepository::new(&store).create_plan("Keep me").await.unwrap();

        for bad in [
            r#"{"workoutPlans": []}"#,
            r#"{"version": 0, "workoutPlans": []}"#,
            r#"{"version": 1}"#,
            r#"{"version": 1, "workoutPlans": {}}"#,
            "not json",
        ] {
            let err = import_snapshot(&store, bad).await.unwrap_err();
            assert!(matches!(err, ImportError::InvalidFormat), "{bad}");
        }

        assert_eq!(store.count(Collection::WorkoutPlans).await.unwrap(), 1);
        assert!(store.count(Collection::Exercises).await.unwrap() > 0);
    }

    #[tokio::test]
    async fn failed_reload_rolls_back_the_clears() {
        let store = store().await;
        PlanRepository::new(&store).create_plan("Keep me").await.unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let backup = Snapshot {
            version: FORMAT_VERSION,
            exported_at: None,
            workout_plans: Vec::new(),
            workout_sessions: Vec::new(),
            diary_entries: vec![DiaryEntry::new(date), DiaryEntry::new(date)],
            exercises: Vec::new(),
            coach_messages: Vec::new(),
        };
        let json = serde_json::to_string(&backup).unwrap();

        // Two entries for one date break the unique index mid-reload.
        let err = import_snapshot(&store, &json).await.unwrap_err();
        assert!(matches!(err, ImportError::Store(_)), "{err:?}");

        assert_eq!(store.count(Collection::WorkoutPlans).await.unwrap(), 1);
        assert_eq!(
            store.count(Collection::Exercises).await.unwrap(),
            catalog::SEED_EXERCISES.len() as i64
        );
        assert_eq!(store.count(Collection::DiaryEntries).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn minimal_backup_empties_other_collections() {
        let store = store().await;
        let snapshot = import_snapshot(&store, r#"{"version": 1, "workoutPlans": []}"#)
            .await
            .unwrap();
        assert!(snapshot.exported_at.is_none());
        for collection in Collection::ALL {
            assert_eq!(store.count(collection).await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn delete_all_reseeds_catalog() {
        let store = store().await;
        PlanRepository::new(&store).create_plan("PPL").await.unwrap();
        store.clear(Collection::Exercises).await.unwrap();

        delete_all(&store).await.unwrap();
        assert_eq!(store.count(Collection::WorkoutPlans).await.unwrap(), 0);
        assert_eq!(
            store.count(Collection::Exercises).await.unwrap(),
            catalog::SEED_EXERCISES.len() as i64
        );
        assert!(store.load_active_session().await.unwrap().is_none());
    }
}
