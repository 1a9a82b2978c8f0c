use ironlog::{
    catalog, db,
    diary::{Diary, count_workouts, week_dates},
    export,
    models::WorkoutSession,
    plans::{PlanRepository, PlannedExerciseDraft},
    session::{SessionManager, SetUpdate, prefill_exercises},
    store::Store,
    types::Mood,
};

async fn open(dir: &tempfile::TempDir) -> Store {
    let path = dir.path().join("ironlog.db");
    let pool = db::open(path.to_str().unwrap()).await.unwrap();
    let store = Store::new(pool);
    catalog::seed_if_empty(&store).await.unwrap();
    store
}

/// Plan with one "Push" day holding a bench press.
async fn push_plan(store: &Store) -> (String, String) {
    let repo = PlanRepository::new(store);
    let plan = repo.create_plan("PPL").await.unwrap();
    let plan = repo.add_day_to_plan(&plan.id, "Push").await.unwrap().unwrap();
    let day_id = plan.days[0].id.clone();
    repo.add_exercise_to_day(
        &plan.id,
        &day_id,
        PlannedExerciseDraft {
            exercise_id: "barbell-bench-press".into(),
            exercise_name: "Barbell Bench Press".into(),
            sets: 2,
            rep_range_min: 6,
            rep_range_max: 10,
        },
    )
    .await
    .unwrap()
    .unwrap();
    (plan.id, day_id)
}

async fn run_session(store: &Store, plan_id: &str, day_id: &str, weight: f64, reps: u32) -> WorkoutSession {
    let plan = PlanRepository::new(store).get(plan_id).await.unwrap().unwrap();
    let day = plan.day(day_id).unwrap();

    let mut mgr = SessionManager::load(store).await.unwrap();
    let exercises = prefill_exercises(mgr.previous_session(plan_id, day_id), day);
    mgr.start_session(plan_id, day_id, &day.name, exercises).unwrap();

    assert!(mgr.update_set(0, 0, SetUpdate { weight: Some(weight), reps: Some(reps) }));
    mgr.complete_set(0, 0).unwrap();
    mgr.finish_session(store).await.unwrap().unwrap()
}

#[tokio::test]
async fn sessions_survive_reopen_and_prefill_from_last_time() {
    let dir = tempfile::tempdir().unwrap();
    let (plan_id, day_id) = {
        let store = open(&dir).await;
        let ids = push_plan(&store).await;
        let first = run_session(&store, &ids.0, &ids.1, 80.0, 8).await;
        assert!(first.exercises[0].sets[0].is_pr);
        ids
    };

    let store = open(&dir).await;
    let mgr = SessionManager::load(&store).await.unwrap();
    assert_eq!(mgr.history().len(), 1);

    let plan = PlanRepository::new(&store).get(&plan_id).await.unwrap().unwrap();
    let prefilled = prefill_exercises(mgr.previous_session(&plan_id, &day_id), plan.day(&day_id).unwrap());
    assert_eq!(prefilled[0].sets.len(), 2);
    assert_eq!(prefilled[0].sets[0].weight, 80.0);
    assert_eq!(prefilled[0].sets[0].reps, 8);
    assert!(!prefilled[0].sets[0].is_completed);
    assert_eq!(prefilled[0].sets[1].weight, 0.0);

    // Same volume is not a record, more is.
    let tie = run_session(&store, &plan_id, &day_id, 64.0, 10).await;
    assert!(!tie.exercises[0].sets[0].is_pr);
    let better = run_session(&store, &plan_id, &day_id, 82.5, 8).await;
    assert!(better.exercises[0].sets[0].is_pr);
}

#[tokio::test]
async fn active_session_draft_is_restored() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir).await;
    let (plan_id, day_id) = push_plan(&store).await;
    let plan = PlanRepository::new(&store).get(&plan_id).await.unwrap().unwrap();

    let mut mgr = SessionManager::load(&store).await.unwrap();
    let exercises = prefill_exercises(None, plan.day(&day_id).unwrap());
    let started = mgr.start_session(&plan_id, &day_id, "Push", exercises).unwrap().clone();
    store.save_active_session(&started).await.unwrap();

    let mut again = SessionManager::load(&store).await.unwrap();
    let draft = store.load_active_session().await.unwrap().unwrap();
    assert!(again.restore(draft).unwrap());
    assert_eq!(again.active().unwrap().id, started.id);
    assert!(again.start_session(&plan_id, &day_id, "Push", Vec::new()).is_err());

    again.cancel_session().unwrap();
    store.clear_active_session().await.unwrap();
    assert!(store.load_active_session().await.unwrap().is_none());
    assert!(SessionManager::load(&store).await.unwrap().history().is_empty());
}

#[tokio::test]
async fn export_import_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir).await;
    let (plan_id, day_id) = push_plan(&store).await;
    run_session(&store, &plan_id, &day_id, 60.0, 10).await;

    let mut diary = Diary::load(&store).await.unwrap();
    let day = chrono::NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    diary.set_mood(day, Mood::Good).await.unwrap();
    diary.add_goal(day, "Sleep 8h").await.unwrap();

    let mut buf = Vec::new();
    let before = export::export_to_writer(&store, &mut buf).await.unwrap();

    let other_dir = tempfile::tempdir().unwrap();
    let other = open(&other_dir).await;
    let imported = export::import_snapshot(&other, std::str::from_utf8(&buf).unwrap())
        .await
        .unwrap();
    assert_eq!(imported.workout_plans, before.workout_plans);

    let after = export::export_snapshot(&other).await.unwrap();
    assert_eq!(after.workout_plans, before.workout_plans);
    assert_eq!(after.workout_sessions, before.workout_sessions);
    assert_eq!(after.diary_entries, before.diary_entries);
    assert_eq!(after.exercises, before.exercises);
    assert_eq!(after.coach_messages, before.coach_messages);

    // Apart from the export timestamp the backups are the same document.
    let strip = |mut s: export::Snapshot| {
        s.exported_at = None;
        serde_json::to_value(&s).unwrap()
    };
    assert_eq!(strip(after), strip(before));
}

#[tokio::test]
async fn week_summary_counts_finished_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&dir).await;
    let (plan_id, day_id) = push_plan(&store).await;
    let session = run_session(&store, &plan_id, &day_id, 50.0, 5).await;

    let week = week_dates(session.started_at.date_naive());
    let history = SessionManager::load(&store).await.unwrap();
    let diary = Diary::load(&store).await.unwrap();
    let summary = diary.weekly_summary(&week, count_workouts(history.history(), &week));
    assert_eq!(summary.workout_count, 1);
    assert_eq!(summary.goal_completion_rate, 0);
}
