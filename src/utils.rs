use uuid::Uuid;

use crate::types::Units;

const LBS_PER_KG: f64 = 2.20462;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn format_duration(duration: chrono::Duration) -> String {
    let hours = duration.num_hours();
    let minutes = duration.num_minutes() % 60;
    let seconds = duration.num_seconds() % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Rounded to one decimal.
pub fn kg_to_lbs(kg: f64) -> f64 {
    (kg * LBS_PER_KG * 10.0).round() / 10.0
}

/// Rounded to one decimal.
pub fn lbs_to_kg(lbs: f64) -> f64 {
    (lbs / LBS_PER_KG * 10.0).round() / 10.0
}

/// Converts a user-entered weight into stored kilograms.
pub fn weight_from_input(value: f64, units: Units) -> f64 {
    match units {
        Units::Kg => value,
        Units::Lbs => lbs_to_kg(value),
    }
}

/// Renders a stored kilogram weight in the user's units, e.g. `102.5kg`.
pub fn display_weight(kg: f64, units: Units) -> String {
    let value = match units {
        Units::Kg => kg,
        Units::Lbs => kg_to_lbs(kg),
    };
    format!("{}{}", value, units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(chrono::Duration::zero()), "00:00:00");
        assert_eq!(format_duration(chrono::Duration::seconds(90)), "00:01:30");
        assert_eq!(format_duration(chrono::Duration::seconds(3661)), "01:01:01");
    }

    #[test]
    fn converts_units() {
        assert_eq!(kg_to_lbs(100.0), 220.5);
        assert_eq!(lbs_to_kg(220.0), 99.8);
        assert_eq!(weight_from_input(50.0, Units::Kg), 50.0);
        assert_eq!(display_weight(100.0, Units::Lbs), "220.5lbs");
        assert_eq!(display_weight(60.0, Units::Kg), "60kg");
    }
}
