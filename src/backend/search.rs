use indexmap::IndexSet;

use super::Record;
use super::config::Configuration;

const SUMMARY_MAX_LEN: usize = 40;

/// The search term and the column subset it matches against. An empty
/// `active_fields` set means "search all available fields", never "search
/// nothing". Invariant: active fields are a subset of the available fields.
#[derive(Clone, Debug, Default)]
pub struct SearchState {
    pub term: String,
    pub active_fields: IndexSet<String>,
}

impl SearchState {
    pub fn set_term(&mut self, term: impl Into<String>) {
        self.term = term.into();
    }

    /// Adds or removes a field from the active set. Unknown fields are
    /// ignored to preserve the subset invariant.
    pub fn toggle_field(&mut self, field: &str, available: &IndexSet<String>) {
        if self.active_fields.shift_remove(field) {
            return;
        }
        if available.contains(field) {
            self.active_fields.insert(field.to_string());
        }
    }

    pub fn clear_fields(&mut self) {
        self.active_fields.clear();
    }

    /// Replaces the active set with the configuration's declared search
    /// columns, or every available field when the configuration has no
    /// search map.
    pub fn use_configured_fields(
        &mut self,
        config: Option<&Configuration>,
        available: &IndexSet<String>,
    ) {
        self.active_fields.clear();
        match config {
            Some(config) if !config.search.is_empty() => {
                for column in config.search.values() {
                    if available.contains(column) {
                        self.active_fields.insert(column.clone());
                    }
                }
            }
            _ => {
                self.active_fields = available.clone();
            }
        }
    }
}

/// Recomputes the filtered view as indices into `records`, preserving load
/// order. A blank term matches everything; otherwise a record matches when
/// any effective search field contains the term, case-insensitively.
pub fn filter(
    records: &[Record],
    state: &SearchState,
    available: &IndexSet<String>,
) -> Vec<usize> {
    let term = state.term.trim().to_lowercase();
    if term.is_empty() {
        return (0..records.len()).collect();
    }

    let fields: Vec<&String> = if state.active_fields.is_empty() {
        available.iter().collect()
    } else {
        state.active_fields.iter().collect()
    };

    records
        .iter()
        .enumerate()
        .filter(|(_, record)| {
            fields.iter().any(|field| {
                record
                    .get(field.as_str())
                    .is_some_and(|value| value.to_lowercase().contains(&term))
            })
        })
        .map(|(i, _)| i)
        .collect()
}

/// One-line description of the active search fields for the filter control:
/// configured display labels when they apply, raw field names otherwise,
/// truncated past 40 characters.
pub fn summary(
    state: &SearchState,
    config: Option<&Configuration>,
    available: &IndexSet<String>,
) -> String {
    if state.active_fields.is_empty() {
        return "Select Filters".to_string();
    }
    if state.active_fields.len() == available.len() {
        return "All fields".to_string();
    }

    let labels: Vec<&str> = config
        .map(|config| {
            config
                .search
                .iter()
                .filter(|(_, column)| state.active_fields.contains(*column))
                .map(|(label, _)| label.as_str())
                .collect()
        })
        .unwrap_or_default();

    if !labels.is_empty() {
        return if labels.len() <= 2 {
            labels.join(", ")
        } else {
            format!("{}, +{} more", labels[..2].join(", "), labels.len() - 2)
        };
    }

    let names: Vec<&str> = state.active_fields.iter().take(2).map(String::as_str).collect();
    let mut summary = names.join(", ");
    if state.active_fields.len() > 2 {
        summary.push_str(&format!(", +{} more", state.active_fields.len() - 2));
    }
    if summary.len() > SUMMARY_MAX_LEN {
        summary.truncate(SUMMARY_MAX_LEN - 3);
        summary.push_str("...");
    }
    summary
}
