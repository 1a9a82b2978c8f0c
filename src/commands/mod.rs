use chrono::{Local, NaiveDate};

pub mod coach;
pub mod config;
pub mod data;
pub mod diary;
pub mod exercise;
pub mod plan;
pub mod session;

/// Looks `input` up as a 1-based index first, then as a case-insensitive name.
pub fn by_index_or_name<'a, T>(items: &'a [T], input: &str, name: impl Fn(&T) -> &str) -> Option<&'a T> {
    let input = input.trim();
    if let Ok(idx) = input.parse::<usize>() {
        return idx.checked_sub(1).and_then(|i| items.get(i));
    }
    items.iter().find(|it| name(it).eq_ignore_ascii_case(input))
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Visible width of a string that may carry ANSI color codes.
pub fn plain_len(s: &str) -> usize {
    let mut n = 0;
    let mut esc = false;
    for c in s.chars() {
        match (esc, c) {
            (true, 'm') => esc = false,
            (true, _) => {}
            (false, '\x1b') => esc = true,
            (false, _) => n += 1,
        }
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_wins_over_name() {
        let items = ["Push", "Pull", "3"];
        let found = by_index_or_name(&items, "2", |s| *s);
        assert_eq!(found, Some(&"Pull"));
        assert_eq!(by_index_or_name(&items, "push", |s| *s), Some(&"Push"));
        assert_eq!(by_index_or_name(&items, "0", |s| *s), None);
        assert_eq!(by_index_or_name(&items, "Legs", |s| *s), None);
    }

    #[test]
    fn plain_len_skips_escapes() {
        assert_eq!(plain_len("\x1b[1mPush\x1b[0m"), 4);
        assert_eq!(plain_len("Push"), 4);
    }
}
