use std::collections::BTreeSet;

/// Trim, drop blanks, deduplicate and sort exercise names.
///
/// Ordering is plain ordinal string order with no case folding, so "Squat"
/// and "squat" are kept as two entries.
pub fn normalize_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .filter_map(|name| {
            let trimmed = name.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
