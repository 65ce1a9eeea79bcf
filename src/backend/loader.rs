use std::fs::File;
use std::path::Path;

use log::{debug, info};
use memmap2::Mmap;
use serde_json::Value;

use super::config::{Configuration, SourceKind};
use super::error::LoadError;
use super::{Record, tokenizer};

/// The single fetch-text contract the loader depends on. Implementations
/// resolve a source location to its raw text; there is no retry and no
/// caching between calls.
pub trait TextFetcher {
    fn fetch_text(&self, location: &str) -> Result<String, LoadError>;
}

/// Fetches remote locations over HTTP and reads local paths through a
/// memory map.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TextFetcher for HttpFetcher {
    fn fetch_text(&self, location: &str) -> Result<String, LoadError> {
        if location.starts_with("http://") || location.starts_with("https://") {
            let response = self.client.get(location).send().map_err(|source| {
                LoadError::Transport {
                    url: location.to_string(),
                    source,
                }
            })?;
            let status = response.status();
            if !status.is_success() {
                return Err(LoadError::Status {
                    url: location.to_string(),
                    status: status.as_u16(),
                });
            }
            response.text().map_err(|source| LoadError::Transport {
                url: location.to_string(),
                source,
            })
        } else {
            read_local(Path::new(location))
        }
    }
}

fn read_local(path: &Path) -> Result<String, LoadError> {
    let io_err = |source| LoadError::Io {
        path: path.display().to_string(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    if file.metadata().map_err(io_err)?.len() == 0 {
        return Ok(String::new());
    }
    // Safety: we assume the file is not modified by other processes while we
    // read. For a one-shot load this is a standard risk we accept.
    let mmap = unsafe { Mmap::map(&file).map_err(io_err)? };
    Ok(String::from_utf8_lossy(&mmap).into_owned())
}

/// Loads the record set for a configuration. Each call re-fetches; failures
/// propagate as `LoadError` without retrying.
pub fn load(
    id: &str,
    config: &Configuration,
    fetcher: &dyn TextFetcher,
) -> Result<Vec<Record>, LoadError> {
    let mut records = match config.source() {
        SourceKind::Csv(url) => {
            let text = fetcher.fetch_text(&url)?;
            tokenizer::parse_document(&text)
        }
        SourceKind::Json(url) => {
            let text = fetcher.fetch_text(&url)?;
            parse_json_records(&text, &url)?
        }
        SourceKind::Mock => mock_records(id),
    };

    if let Some(field) = &config.int_required {
        let before = records.len();
        records.retain(|record| {
            record
                .get(field)
                .is_some_and(|value| value.parse::<i64>().is_ok_and(|n| n.to_string() == *value))
        });
        debug!(
            "int_required ({field}): {} rows remaining from {before}",
            records.len()
        );
    }

    sort_records(&mut records, config);
    info!("loaded {} records for \"{id}\"", records.len());
    Ok(records)
}

/// Parses a JSON array of objects into records, flattening nested maps with
/// `_`-joined keys up to three levels deep and joining array items with
/// `", "`.
fn parse_json_records(text: &str, url: &str) -> Result<Vec<Record>, LoadError> {
    let value: Value = serde_json::from_str(text).map_err(|source| LoadError::Json {
        url: url.to_string(),
        source,
    })?;
    let items = match value {
        Value::Array(items) => items,
        // A single object is treated as a one-record set.
        Value::Object(_) => vec![value],
        _ => Vec::new(),
    };
    Ok(items.iter().map(flatten_record).collect())
}

const MAX_FLATTEN_DEPTH: usize = 3;

fn flatten_record(value: &Value) -> Record {
    let mut record = Record::new();
    flatten_into(&mut record, "", value, 0);
    record
}

fn flatten_into(record: &mut Record, prefix: &str, value: &Value, depth: usize) {
    let Value::Object(map) = value else {
        if !prefix.is_empty() {
            record.insert(prefix.to_string(), render_scalar(value));
        }
        return;
    };
    if depth >= MAX_FLATTEN_DEPTH {
        return;
    }
    for (key, child) in map {
        let flat_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}_{key}")
        };
        match child {
            Value::Object(_) => flatten_into(record, &flat_key, child, depth + 1),
            Value::Array(items) => {
                let joined = items
                    .iter()
                    .map(render_scalar)
                    .collect::<Vec<_>>()
                    .join(", ");
                record.insert(flat_key, joined);
            }
            _ => {
                record.insert(flat_key, render_scalar(child));
            }
        }
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Fields commonly holding a listing's name, tried when the configuration
/// names no sort column.
const COMMON_NAME_FIELDS: &[&str] = &[
    "name",
    "title",
    "organization",
    "organization name",
    "company",
    "city",
];

fn sort_field(records: &[Record], config: &Configuration) -> Option<String> {
    let first = records.first()?;
    if let Some(column) = &config.name_column {
        if let Some(key) = first.keys().find(|k| k.eq_ignore_ascii_case(column)) {
            return Some(key.clone());
        }
    }
    if let Some(column) = config.featured_columns.first() {
        if let Some(key) = first.keys().find(|k| k.eq_ignore_ascii_case(column)) {
            return Some(key.clone());
        }
    }
    if let Some(key) = first.keys().find(|k| {
        let lower = k.to_lowercase();
        COMMON_NAME_FIELDS.iter().any(|f| lower.contains(f))
    }) {
        return Some(key.clone());
    }
    first.keys().next().cloned()
}

/// Sorts records alphabetically by the primary name field, case-insensitive,
/// empty values last. Stable, so later filtering preserves this order.
fn sort_records(records: &mut [Record], config: &Configuration) {
    let Some(field) = sort_field(records, config) else {
        return;
    };
    records.sort_by(|a, b| {
        let va = a
            .get(&field)
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_default();
        let vb = b
            .get(&field)
            .map(|v| v.trim().to_lowercase())
            .unwrap_or_default();
        match (va.is_empty(), vb.is_empty()) {
            (true, true) => std::cmp::Ordering::Equal,
            (true, false) => std::cmp::Ordering::Greater,
            (false, true) => std::cmp::Ordering::Less,
            (false, false) => va.cmp(&vb),
        }
    });
}

/// Built-in demo record sets, a pure function of the dataset id. Used for
/// offline display when a configuration names no tabular source.
pub fn mock_records(id: &str) -> Vec<Record> {
    match id {
        "cities" => mock_cities(),
        "recyclers" => mock_recyclers(),
        "landfills" => mock_landfills(),
        _ => Vec::new(),
    }
}

fn mock_cities() -> Vec<Record> {
    let base: [(&str, &str, &str, &str, &str, &str, &str); 5] = [
        (
            "Atlanta",
            "Fulton",
            "Georgia",
            "498715",
            "404546",
            "atlantaga.gov",
            "Capital city of Georgia",
        ),
        (
            "Savannah",
            "Chatham",
            "Georgia",
            "147780",
            "912651",
            "savannahga.gov",
            "Historic coastal city",
        ),
        (
            "Augusta",
            "Richmond",
            "Georgia",
            "202081",
            "706790",
            "augustaga.gov",
            "Home of the Masters Tournament",
        ),
        (
            "Columbus",
            "Muscogee",
            "Georgia",
            "194058",
            "706596",
            "columbusga.gov",
            "Historic river city",
        ),
        (
            "Macon",
            "Bibb",
            "Georgia",
            "153095",
            "478551",
            "maconbibb.us",
            "Heart of Georgia",
        ),
    ];

    // 5 base records x 50 variations, enough to exercise pagination.
    let mut cities = Vec::with_capacity(base.len() * 50);
    for i in 0..50 {
        for (index, (city, county, state, population, phone_prefix, website, description)) in
            base.iter().enumerate()
        {
            let name = format!("{city} {}", i + 1);
            let mut record = Record::new();
            record.insert("city".into(), name.clone());
            record.insert("County".into(), (*county).into());
            record.insert("state".into(), (*state).into());
            record.insert("population".into(), (*population).into());
            record.insert("phone".into(), format!("{phone_prefix}{:04}", index + i));
            record.insert("website".into(), (*website).into());
            record.insert("description".into(), (*description).into());
            record.insert("City".into(), name);
            cities.push(record);
        }
    }
    cities
}

fn mock_recyclers() -> Vec<Record> {
    let rows = [
        [
            ("organization name", "Atlanta Recycling Center"),
            ("Category", "Paper"),
            ("Materials Accepted", "Cardboard, Office Paper"),
            ("address", "123 Recycling Way, Atlanta, GA"),
            ("county", "Fulton"),
            ("website", "atlantarecycling.com"),
        ],
        [
            ("organization name", "Savannah Metal Recovery"),
            ("Category", "Metal"),
            ("Materials Accepted", "Aluminum, Steel, Copper"),
            ("address", "456 Metal St, Savannah, GA"),
            ("county", "Chatham"),
            ("website", "savannahmetal.com"),
        ],
    ];
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .collect()
}

fn mock_landfills() -> Vec<Record> {
    let rows = [
        [
            ("Name", "Peach County Landfill"),
            ("County", "Peach"),
            ("latitude", "32.5"),
            ("longitude", "-83.8"),
        ],
        [
            ("Name", "Gwinnett County Landfill"),
            ("County", "Gwinnett"),
            ("latitude", "33.9"),
            ("longitude", "-84.1"),
        ],
    ];
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        })
        .collect()
}
