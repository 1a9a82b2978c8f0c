//! Personal-record detection.
//!
//! A set is compared by volume (weight × reps) against every completed set
//! of the same exercise in the completed-session history. Two different
//! weight/rep pairs with the same product count as equally good.

use crate::models::WorkoutSession;

/// Returns true when `weight × reps` beats every completed historical set of
/// `exercise_id`. A tie is not a record; zero weight or zero reps never is.
pub fn is_personal_record(
    history: &[WorkoutSession],
    exercise_id: &str,
    weight: f64,
    reps: u32,
) -> bool {
    if weight <= 0.0 || reps == 0 {
        return false;
    }

    let volume = weight * f64::from(reps);
    !history
        .iter()
        .flat_map(|s| &s.exercises)
        .filter(|e| e.exercise_id == exercise_id)
        .flat_map(|e| &e.sets)
        .any(|s| s.is_completed && s.volume() >= volume)
}

/// Best completed volume ever logged for `exercise_id`, if any.
pub fn best_volume(history: &[WorkoutSession], exercise_id: &str) -> Option<f64> {
    history
        .iter()
        .flat_map(|s| &s.exercises)
        .filter(|e| e.exercise_id == exercise_id)
        .flat_map(|e| &e.sets)
        .filter(|s| s.is_completed)
        .map(|s| s.volume())
        .fold(None, |best, v| Some(best.map_or(v, |b: f64| b.max(v))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{LoggedExercise, LoggedSet},
        utils::new_id,
    };

    fn history(exercise_id: &str, sets: &[(f64, u32, bool)]) -> Vec<WorkoutSession> {
        let sets = sets
            .iter()
            .enumerate()
            .map(|(i, &(w, r, done))| {
                let mut s = LoggedSet::new(i as u32 + 1, w, r);
                s.is_completed = done;
                s
            })
            .collect();
        let mut session = WorkoutSession::new(
            "plan",
            "day",
            "Push",
            vec![LoggedExercise {
                id: new_id(),
                exercise_id: exercise_id.to_string(),
                exercise_name: exercise_id.to_string(),
                sets,
            }],
        );
        session.completed_at = Some(session.started_at);
        vec![session]
    }

    #[test]
    fn tie_is_not_a_record() {
        let h = history("bench", &[(100.0, 5, true)]);
        assert!(!is_personal_record(&h, "bench", 100.0, 5));
    }

    #[test]
    fn higher_volume_is_a_record() {
        let h = history("bench", &[(100.0, 5, true)]);
        assert!(is_personal_record(&h, "bench", 110.0, 5));
    }

    #[test]
    fn equal_product_with_different_pair_is_not_a_record() {
        let h = history("bench", &[(100.0, 5, true)]);
        assert!(!is_personal_record(&h, "bench", 50.0, 10));
    }

    #[test]
    fn zero_weight_or_reps_is_never_a_record() {
        assert!(!is_personal_record(&[], "bench", 0.0, 10));
        assert!(!is_personal_record(&[], "bench", 100.0, 0));
        assert!(!is_personal_record(&[], "bench", -5.0, 10));
    }

    #[test]
    fn empty_history_makes_any_positive_set_a_record() {
        assert!(is_personal_record(&[], "squat", 20.0, 1));
    }

    #[test]
    fn incomplete_and_other_exercise_sets_are_ignored() {
        let mut h = history("bench", &[(200.0, 10, false)]);
        h.extend(history("squat", &[(200.0, 10, true)]));
        assert!(is_personal_record(&h, "bench", 60.0, 5));
    }

    #[test]
    fn best_volume_picks_max_completed() {
        let h = history("bench", &[(100.0, 5, true), (80.0, 8, true), (200.0, 8, false)]);
        assert_eq!(best_volume(&h, "bench"), Some(640.0));
        assert_eq!(best_volume(&h, "squat"), None);
    }
}
