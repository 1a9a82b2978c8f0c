use once_cell::sync::Lazy;
use strsim::jaro_winkler;
use tracing::info;

use crate::{
    error::StoreError,
    models::Exercise,
    store::{Collection, Order, Store},
    types::{Equipment, ExerciseCategory},
};

struct SeedDef {
    id: &'static str,
    name: &'static str,
    category: ExerciseCategory,
    equipment: Equipment,
    instructions: &'static [&'static str],
    primary: &'static [&'static str],
    secondary: &'static [&'static str],
}

const SEED_DEFS: &[SeedDef] = &[
    SeedDef {
        id: "barbell-bench-press",
        name: "Barbell Bench Press",
        category: ExerciseCategory::Chest,
        equipment: Equipment::Barbell,
        instructions: &[
            "Lie on the bench with eyes under the bar",
            "Grip slightly wider than shoulder width",
            "Lower the bar to mid-chest",
            "Press back up to lockout",
        ],
        primary: &["chest"],
        secondary: &["triceps", "front delts"],
    },
    SeedDef {
        id: "incline-dumbbell-press",
        name: "Incline Dumbbell Press",
        category: ExerciseCategory::Chest,
        equipment: Equipment::Dumbbell,
        instructions: &[
            "Set the bench to 30-45 degrees",
            "Press the dumbbells up over the upper chest",
            "Lower under control to chest level",
        ],
        primary: &["upper chest"],
        secondary: &["triceps", "front delts"],
    },
    SeedDef {
        id: "push-up",
        name: "Push-Up",
        category: ExerciseCategory::Chest,
        equipment: Equipment::Bodyweight,
        instructions: &[
            "Hands under shoulders, body in a straight line",
            "Lower until the chest nearly touches the floor",
            "Push back up",
        ],
        primary: &["chest"],
        secondary: &["triceps", "core"],
    },
    SeedDef {
        id: "barbell-row",
        name: "Barbell Row",
        category: ExerciseCategory::Back,
        equipment: Equipment::Barbell,
        instructions: &[
            "Hinge forward with a flat back",
            "Pull the bar to the lower ribs",
            "Lower with control",
        ],
        primary: &["lats", "upper back"],
        secondary: &["biceps", "rear delts"],
    },
    SeedDef {
        id: "pull-up",
        name: "Pull-Up",
        category: ExerciseCategory::Back,
        equipment: Equipment::Bodyweight,
        instructions: &[
            "Hang with an overhand grip",
            "Pull until the chin clears the bar",
            "Lower to a full hang",
        ],
        primary: &["lats"],
        secondary: &["biceps"],
    },
    SeedDef {
        id: "lat-pulldown",
        name: "Lat Pulldown",
        category: ExerciseCategory::Back,
        equipment: Equipment::Cable,
        instructions: &[
            "Grip the bar wider than shoulders",
            "Pull the bar to the upper chest",
            "Return slowly to full stretch",
        ],
        primary: &["lats"],
        secondary: &["biceps", "rear delts"],
    },
    SeedDef {
        id: "overhead-press",
        name: "Overhead Press",
        category: ExerciseCategory::Shoulders,
        equipment: Equipment::Barbell,
        instructions: &[
            "Start with the bar on the front delts",
            "Press overhead, moving the head through",
            "Lower back to the shoulders",
        ],
        primary: &["front delts"],
        secondary: &["triceps", "upper chest"],
    },
    SeedDef {
        id: "lateral-raise",
        name: "Lateral Raise",
        category: ExerciseCategory::Shoulders,
        equipment: Equipment::Dumbbell,
        instructions: &[
            "Raise the dumbbells out to the sides",
            "Stop at shoulder height",
            "Lower slowly",
        ],
        primary: &["side delts"],
        secondary: &[],
    },
    SeedDef {
        id: "barbell-curl",
        name: "Barbell Curl",
        category: ExerciseCategory::Arms,
        equipment: Equipment::Barbell,
        instructions: &[
            "Stand with elbows at your sides",
            "Curl the bar to shoulder height",
            "Lower under control",
        ],
        primary: &["biceps"],
        secondary: &["forearms"],
    },
    SeedDef {
        id: "triceps-pushdown",
        name: "Triceps Pushdown",
        category: ExerciseCategory::Arms,
        equipment: Equipment::Cable,
        instructions: &[
            "Keep elbows pinned to your sides",
            "Push the handle down to full extension",
            "Let it rise back to 90 degrees",
        ],
        primary: &["triceps"],
        secondary: &[],
    },
    SeedDef {
        id: "barbell-back-squat",
        name: "Barbell Back Squat",
        category: ExerciseCategory::Legs,
        equipment: Equipment::Barbell,
        instructions: &[
            "Bar on the upper back, feet shoulder width",
            "Sit down between the hips until thighs are parallel",
            "Drive up through the whole foot",
        ],
        primary: &["quads", "glutes"],
        secondary: &["hamstrings", "core"],
    },
    SeedDef {
        id: "romanian-deadlift",
        name: "Romanian Deadlift",
        category: ExerciseCategory::Legs,
        equipment: Equipment::Barbell,
        instructions: &[
            "Hold the bar at the hips",
            "Push the hips back with soft knees",
            "Stand up by driving the hips forward",
        ],
        primary: &["hamstrings", "glutes"],
        secondary: &["lower back"],
    },
    SeedDef {
        id: "leg-press",
        name: "Leg Press",
        category: ExerciseCategory::Legs,
        equipment: Equipment::Machine,
        instructions: &[
            "Feet shoulder width on the platform",
            "Lower until knees reach 90 degrees",
            "Press back up without locking the knees",
        ],
        primary: &["quads"],
        secondary: &["glutes"],
    },
    SeedDef {
        id: "plank",
        name: "Plank",
        category: ExerciseCategory::Core,
        equipment: Equipment::Bodyweight,
        instructions: &[
            "Forearms on the floor under the shoulders",
            "Hold a straight line from head to heels",
        ],
        primary: &["abs"],
        secondary: &["lower back"],
    },
    SeedDef {
        id: "kettlebell-swing",
        name: "Kettlebell Swing",
        category: ExerciseCategory::FullBody,
        equipment: Equipment::Kettlebell,
        instructions: &[
            "Hinge and hike the bell back between the legs",
            "Snap the hips forward to float the bell to chest height",
            "Let it fall back into the next hinge",
        ],
        primary: &["glutes", "hamstrings"],
        secondary: &["core", "shoulders"],
    },
    SeedDef {
        id: "band-pull-apart",
        name: "Band Pull-Apart",
        category: ExerciseCategory::Shoulders,
        equipment: Equipment::Band,
        instructions: &[
            "Hold the band at shoulder height, arms straight",
            "Pull the band apart until it touches the chest",
        ],
        primary: &["rear delts"],
        secondary: &["upper back"],
    },
    SeedDef {
        id: "rowing-machine",
        name: "Rowing Machine",
        category: ExerciseCategory::Cardio,
        equipment: Equipment::Machine,
        instructions: &[
            "Drive with the legs first",
            "Lean back slightly and pull the handle to the ribs",
            "Return arms, body, then legs",
        ],
        primary: &["legs", "back"],
        secondary: &["arms"],
    },
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The built-in exercise catalog.
pub static SEED_EXERCISES: Lazy<Vec<Exercise>> = Lazy::new(|| {
    SEED_DEFS
        .iter()
        .map(|d| Exercise {
            id: d.id.to_string(),
            name: d.name.to_string(),
            category: d.category,
            equipment: d.equipment,
            video_url: String::new(),
            thumbnail_url: String::new(),
            instructions: strings(d.instructions),
            primary_muscles: strings(d.primary),
            secondary_muscles: strings(d.secondary),
        })
        .collect()
});

/// Inserts the built-in catalog when the collection is empty.
/// Returns how many exercises were added.
pub async fn seed_if_empty(store: &Store) -> Result<usize, StoreError> {
    if store.count(Collection::Exercises).await? > 0 {
        return Ok(0);
    }
    store.bulk_insert(SEED_EXERCISES.as_slice()).await?;
    info!(count = SEED_EXERCISES.len(), "seeded exercise catalog");
    Ok(SEED_EXERCISES.len())
}

/// The catalog ordered by name.
pub async fn load(store: &Store) -> Result<Vec<Exercise>, StoreError> {
    store.ordered(Order::Asc).await
}

/// Case-insensitive match on name or primary muscle, optionally limited to
/// one category.
pub fn filter<'a>(
    exercises: &'a [Exercise],
    query: Option<&str>,
    category: Option<ExerciseCategory>,
) -> Vec<&'a Exercise> {
    let q = query.map(str::to_lowercase).filter(|q| !q.is_empty());
    exercises
        .iter()
        .filter(|ex| category.is_none_or(|c| ex.category == c))
        .filter(|ex| match &q {
            None => true,
            Some(q) => {
                ex.name.to_lowercase().contains(q)
                    || ex.primary_muscles.iter().any(|m| m.to_lowercase().contains(q))
            }
        })
        .collect()
}

#[derive(Debug, PartialEq)]
pub enum Resolved<'a> {
    Found(&'a Exercise),
    Suggestion(&'a Exercise),
    Missing,
}

/// Looks an exercise up by 1-based index, id, or name (case-insensitive).
/// When nothing matches, offers the closest name if it is similar enough and
/// clearly better than the runner-up.
pub fn resolve<'a>(exercises: &'a [Exercise], input: &str) -> Resolved<'a> {
    let input = input.trim();
    if let Ok(idx) = input.parse::<usize>() {
        return match idx.checked_sub(1).and_then(|i| exercises.get(i)) {
            Some(ex) => Resolved::Found(ex),
            None => Resolved::Missing,
        };
    }

    let lower = input.to_lowercase();
    if let Some(ex) = exercises
        .iter()
        .find(|e| e.id == input || e.name.to_lowercase() == lower)
    {
        return Resolved::Found(ex);
    }

    let mut scores: Vec<(&Exercise, f64)> = exercises
        .iter()
        .map(|e| (e, jaro_winkler(&lower, &e.name.to_lowercase())))
        .collect();
    scores.sort_by(|a, b| b.1.total_cmp(&a.1));

    const MIN_SCORE: f64 = 0.80;
    const GAP: f64 = 0.02;

    match scores.as_slice() {
        [] => Resolved::Missing,
        [(best, score)] if *score >= MIN_SCORE => Resolved::Suggestion(*best),
        [(best, score), (_, second), ..] if *score >= MIN_SCORE && score - second >= GAP => {
            Resolved::Suggestion(*best)
        }
        _ => Resolved::Missing,
    }
}
