use chrono::NaiveDate;

use crate::models::Unit;

/// Lowercase and collapse runs of whitespace, for search comparisons
pub fn normalize_search(s: &str) -> String {
    s.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Case- and whitespace-insensitive substring match. An empty needle matches
/// everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    normalize_search(haystack).contains(&normalize_search(needle))
}

/// Format a weight stored in kilograms for display in `unit`
pub fn format_weight(weight_kg: Option<f64>, unit: Unit) -> String {
    match weight_kg {
        Some(kg) => {
            let value = unit.from_kg(kg);
            let rounded = (value * 10.0).round() / 10.0;
            if rounded.fract() == 0.0 {
                format!("{:.0} {}", rounded, unit)
            } else {
                format!("{:.1} {}", rounded, unit)
            }
        }
        None => "-".to_string(),
    }
}

/// Format a workout date the way history listings show it
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %d, %Y").to_string()
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
