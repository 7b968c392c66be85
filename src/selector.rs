use crate::dataset::{Row, Table};
use crate::error::DataError;

/// A blank query keeps every name; otherwise the query is matched as typed
/// against the lowercase form of each name.
pub fn filter_by_name_substring<I, S>(names: I, query: &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = if query.trim().is_empty() {
        names.into_iter().map(|n| n.as_ref().to_string()).collect()
    } else {
        let needle = query.to_lowercase();
        names
            .into_iter()
            .filter(|n| n.as_ref().to_lowercase().contains(&needle))
            .map(|n| n.as_ref().to_string())
            .collect()
    };
    out.sort();
    out.dedup();
    out
}

pub fn resolve_row<'a>(table: &'a Table, key: &str) -> Result<Row<'a>, DataError> {
    table
        .rows()
        .find(|row| row.name() == Some(key))
        .ok_or_else(|| DataError::NotFound(key.to_string()))
}
