use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Named dataset descriptor controlling the source location and field roles.
/// Deserialized from a configuration document keyed by dataset id; immutable
/// once selected. Swapping the active configuration fully replaces the
/// record set.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    #[serde(rename = "shortTitle")]
    pub short_title: Option<String>,
    #[serde(rename = "listTitle")]
    pub list_title: Option<String>,
    #[serde(rename = "dataTitle")]
    pub data_title: Option<String>,
    /// csv, json or mock. Optional; the dataset location decides otherwise.
    pub datatype: Option<String>,
    /// URL or file path of the tabular source. Absent means the built-in
    /// demo records for this dataset id.
    pub dataset: Option<String>,
    #[serde(rename = "nameColumn")]
    pub name_column: Option<String>,
    #[serde(rename = "titleColumn")]
    pub title_column: Option<String>,
    #[serde(rename = "addressColumn")]
    pub address_column: Option<String>,
    #[serde(rename = "valueColumn")]
    pub value_column: Option<String>,
    #[serde(rename = "featuredColumns")]
    pub featured_columns: Vec<String>,
    /// Human search label -> column name.
    pub search: IndexMap<String, String>,
    /// When set, keep only records whose value in this column is an integer.
    pub int_required: Option<String>,
}

/// How a configuration's records are obtained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Csv(String),
    Json(String),
    Mock,
}

impl Configuration {
    /// Resolves the record source: an explicit datatype wins, otherwise a
    /// `.json` dataset means JSON, any other dataset means CSV, and no
    /// dataset at all falls back to the built-in records.
    pub fn source(&self) -> SourceKind {
        match (self.datatype.as_deref(), self.dataset.as_deref()) {
            (Some("mock"), _) | (_, None) => SourceKind::Mock,
            (Some("json"), Some(url)) => SourceKind::Json(url.to_string()),
            (Some("csv"), Some(url)) => SourceKind::Csv(url.to_string()),
            (_, Some(url)) if url.ends_with(".json") => SourceKind::Json(url.to_string()),
            (_, Some(url)) => SourceKind::Csv(url.to_string()),
        }
    }

    pub fn title(&self) -> &str {
        self.short_title
            .as_deref()
            .or(self.list_title.as_deref())
            .or(self.data_title.as_deref())
            .unwrap_or("Listings")
    }
}

/// Dataset id -> configuration, in document order.
pub type ConfigSet = IndexMap<String, Configuration>;

/// Parses a configuration document (a JSON object keyed by dataset id).
pub fn parse_configs(text: &str) -> serde_json::Result<ConfigSet> {
    serde_json::from_str(text)
}

/// Built-in configurations used when no document is supplied or reachable,
/// matching the built-in demo record sets.
pub fn embedded_configs() -> ConfigSet {
    serde_json::from_value(json!({
        "cities": {
            "shortTitle": "Team Locations",
            "nameColumn": "city",
            "featuredColumns": ["City", "Population", "County"],
            "search": {
                "In City": "City",
                "In County Name": "County"
            }
        },
        "recyclers": {
            "shortTitle": "Recyclers",
            "nameColumn": "organization name",
            "valueColumn": "Category",
            "search": {
                "In Organization": "organization name",
                "In Materials": "Materials Accepted"
            }
        },
        "landfills": {
            "shortTitle": "Landfills",
            "nameColumn": "Name",
            "featuredColumns": ["Name", "County"]
        }
    }))
    .expect("embedded configuration is valid")
}
