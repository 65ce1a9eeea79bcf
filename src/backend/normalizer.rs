use indexmap::IndexMap;

use super::Record;
use super::config::Configuration;
use super::formatting::{self, FieldKind};

/// Canonical semantic slots derived from a record. A slot is populated at
/// most once; an absent or empty source field leaves it `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecognizedFields {
    pub name: Option<String>,
    pub title: Option<String>,
    pub address: Option<String>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub population: Option<String>,
}

/// Candidate column names per heuristic slot, in priority order. Matching is
/// case-insensitive through `FieldIndex`, so one entry covers every case
/// variant of that name.
const CITY_CANDIDATES: &[&str] = &["city"];
const COUNTY_CANDIDATES: &[&str] = &["county"];
const STATE_CANDIDATES: &[&str] = &["state"];
const PHONE_CANDIDATES: &[&str] = &["phone", "telephone"];
const EMAIL_CANDIDATES: &[&str] = &["email"];
const WEBSITE_CANDIDATES: &[&str] = &["website", "url"];
const DESCRIPTION_CANDIDATES: &[&str] = &["description", "details"];
const POPULATION_CANDIDATES: &[&str] = &["population", "pop"];

/// Column names excluded from the unrecognized-field listing without feeding
/// any slot (the detail view never shows raw postal columns).
const POSTAL_CANDIDATES: &[&str] = &["zip", "zipcode", "postal_code"];

/// Lowercase-keyed index over the field names of a record set, built once
/// per load. Resolves a candidate name to the first actual key observed with
/// that spelling, in any case.
#[derive(Clone, Debug, Default)]
pub struct FieldIndex {
    by_lower: IndexMap<String, String>,
}

impl FieldIndex {
    pub fn from_records(records: &[Record]) -> Self {
        let mut by_lower = IndexMap::new();
        for record in records {
            for key in record.keys() {
                by_lower
                    .entry(key.to_lowercase())
                    .or_insert_with(|| key.clone());
            }
        }
        Self { by_lower }
    }

    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.by_lower.get(&name.to_lowercase()).map(String::as_str)
    }
}

fn non_empty<'a>(record: &'a Record, key: &str) -> Option<&'a str> {
    record.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

fn slot_value(record: &Record, index: &FieldIndex, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .find_map(|candidate| {
            let actual = index.resolve(candidate)?;
            non_empty(record, actual)
        })
        .map(str::to_string)
}

/// Derives the recognized-field view of a record. Configured columns resolve
/// the name/title/address/category slots (title only when its column differs
/// from the name column); the remaining slots fall back to the candidate
/// lists. Slots resolve independently; first match wins.
pub fn recognize(record: &Record, config: &Configuration, index: &FieldIndex) -> RecognizedFields {
    let configured = |column: &Option<String>| {
        column
            .as_deref()
            .and_then(|c| non_empty(record, c))
            .map(str::to_string)
    };

    RecognizedFields {
        name: configured(&config.name_column),
        title: if config.title_column != config.name_column {
            configured(&config.title_column)
        } else {
            None
        },
        address: configured(&config.address_column),
        category: configured(&config.value_column),
        city: slot_value(record, index, CITY_CANDIDATES),
        county: slot_value(record, index, COUNTY_CANDIDATES),
        state: slot_value(record, index, STATE_CANDIDATES),
        phone: slot_value(record, index, PHONE_CANDIDATES),
        email: slot_value(record, index, EMAIL_CANDIDATES),
        website: slot_value(record, index, WEBSITE_CANDIDATES),
        description: slot_value(record, index, DESCRIPTION_CANDIDATES),
        population: slot_value(record, index, POPULATION_CANDIDATES),
    }
}

/// The complement of `recognize`: every field outside the slot-resolution
/// set whose value is non-empty after trimming, in record order.
pub fn unrecognized(record: &Record, config: &Configuration) -> Vec<(String, String)> {
    let configured: Vec<&str> = [
        &config.name_column,
        &config.title_column,
        &config.address_column,
        &config.value_column,
    ]
    .into_iter()
    .filter_map(|c| c.as_deref())
    .collect();

    let claimed = |key: &str| {
        let lower = key.to_lowercase();
        configured.iter().any(|c| c.eq_ignore_ascii_case(key))
            || [
                CITY_CANDIDATES,
                COUNTY_CANDIDATES,
                STATE_CANDIDATES,
                PHONE_CANDIDATES,
                EMAIL_CANDIDATES,
                WEBSITE_CANDIDATES,
                DESCRIPTION_CANDIDATES,
                POPULATION_CANDIDATES,
                POSTAL_CANDIDATES,
            ]
            .iter()
            .any(|candidates| candidates.contains(&lower.as_str()))
    };

    record
        .iter()
        .filter(|(key, value)| !claimed(key) && !value.trim().is_empty())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Compact listing display strings derived from the featured columns.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayData {
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub tertiary: Option<String>,
}

/// Maps the first three featured columns to primary/secondary/tertiary
/// display strings, with "Population: " and " County" conventions when the
/// column name hints at those semantics. Falls back to the recognized
/// name/population/county when the configuration names no featured columns.
pub fn display_data(record: &Record, config: &Configuration, index: &FieldIndex) -> DisplayData {
    if config.featured_columns.is_empty() {
        let recognized = recognize(record, config, index);
        return DisplayData {
            primary: recognized.name,
            secondary: recognized.population.map(|p| {
                format!(
                    "Population: {}",
                    formatting::format_field_value(&p, FieldKind::Population)
                )
            }),
            tertiary: recognized.county.map(|c| format!("{c} County")),
        };
    }

    let mut data = DisplayData::default();
    for (position, column) in config.featured_columns.iter().take(3).enumerate() {
        let actual = index.resolve(column).unwrap_or(column);
        let Some(value) = non_empty(record, actual) else {
            continue;
        };
        let lower = column.to_lowercase();
        match position {
            0 => data.primary = Some(value.to_string()),
            1 => {
                data.secondary = Some(if lower.contains("population") {
                    format!(
                        "Population: {}",
                        formatting::format_field_value(value, FieldKind::Population)
                    )
                } else {
                    format!(
                        "{}: {}",
                        formatting::format_key_name(column),
                        formatting::format_field_value(value, FieldKind::Text)
                    )
                });
            }
            _ => {
                data.tertiary = Some(if lower.contains("county") {
                    format!("{value} County")
                } else {
                    format!("{}: {value}", formatting::format_key_name(column))
                });
            }
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn cities_config() -> Configuration {
        Configuration {
            name_column: Some("city".into()),
            featured_columns: vec!["City".into(), "Population".into(), "County".into()],
            ..Configuration::default()
        }
    }

    #[test]
    fn test_configured_and_heuristic_slots_are_independent() {
        let config = cities_config();
        let r = record(&[("city", "Macon"), ("CITY", "Macon")]);
        let index = FieldIndex::from_records(std::slice::from_ref(&r));
        let recognized = recognize(&r, &config, &index);
        // name comes from the configured column, city from the candidate
        // list; neither resolution disturbs the other.
        assert_eq!(recognized.name.as_deref(), Some("Macon"));
        assert_eq!(recognized.city.as_deref(), Some("Macon"));
    }

    #[test]
    fn test_case_variant_lookup() {
        let config = Configuration::default();
        let r = record(&[("County", "Bibb"), ("TELEPHONE", "4785551234")]);
        let index = FieldIndex::from_records(std::slice::from_ref(&r));
        let recognized = recognize(&r, &config, &index);
        assert_eq!(recognized.county.as_deref(), Some("Bibb"));
        assert_eq!(recognized.phone.as_deref(), Some("4785551234"));
    }

    #[test]
    fn test_candidate_priority_order() {
        let config = Configuration::default();
        let r = record(&[("url", "a.example"), ("Website", "b.example")]);
        let index = FieldIndex::from_records(std::slice::from_ref(&r));
        // "website" is declared before "url", so it wins regardless of
        // record order.
        assert_eq!(
            recognize(&r, &config, &index).website.as_deref(),
            Some("b.example")
        );
    }

    #[test]
    fn test_empty_values_leave_slot_unset() {
        let config = Configuration::default();
        let r = record(&[("email", ""), ("state", "Georgia")]);
        let index = FieldIndex::from_records(std::slice::from_ref(&r));
        let recognized = recognize(&r, &config, &index);
        assert_eq!(recognized.email, None);
        assert_eq!(recognized.state.as_deref(), Some("Georgia"));
    }

    #[test]
    fn test_title_ignored_when_same_as_name_column() {
        let config = Configuration {
            name_column: Some("city".into()),
            title_column: Some("city".into()),
            ..Configuration::default()
        };
        let r = record(&[("city", "Macon")]);
        let index = FieldIndex::from_records(std::slice::from_ref(&r));
        let recognized = recognize(&r, &config, &index);
        assert_eq!(recognized.name.as_deref(), Some("Macon"));
        assert_eq!(recognized.title, None);
    }

    #[test]
    fn test_unrecognized_complement() {
        let config = cities_config();
        let r = record(&[
            ("city", "Macon"),
            ("county", "Bibb"),
            ("zip", "31201"),
            ("mascot", "Cherry Blossom"),
            ("notes", "  "),
        ]);
        let extra = unrecognized(&r, &config);
        assert_eq!(extra, vec![("mascot".to_string(), "Cherry Blossom".to_string())]);
    }

    #[test]
    fn test_display_data_featured_columns() {
        let config = cities_config();
        let r = record(&[
            ("city", "Macon"),
            ("City", "Macon"),
            ("population", "153095"),
            ("County", "Bibb"),
        ]);
        let index = FieldIndex::from_records(std::slice::from_ref(&r));
        let data = display_data(&r, &config, &index);
        assert_eq!(data.primary.as_deref(), Some("Macon"));
        assert_eq!(data.secondary.as_deref(), Some("Population: 153,095"));
        assert_eq!(data.tertiary.as_deref(), Some("Bibb County"));
    }

    #[test]
    fn test_display_data_fallback_without_featured_columns() {
        let config = Configuration {
            name_column: Some("Name".into()),
            ..Configuration::default()
        };
        let r = record(&[("Name", "Peach County Landfill"), ("County", "Peach")]);
        let index = FieldIndex::from_records(std::slice::from_ref(&r));
        let data = display_data(&r, &config, &index);
        assert_eq!(data.primary.as_deref(), Some("Peach County Landfill"));
        assert_eq!(data.secondary, None);
        assert_eq!(data.tertiary.as_deref(), Some("Peach County"));
    }
}
