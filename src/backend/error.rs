use thiserror::Error;

/// Failures that can surface while resolving a configuration or loading its
/// record set. Empty datasets and empty search results are view states, not
/// errors, and never appear here.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no list named \"{0}\" in the loaded configuration")]
    UnknownList(String),

    #[error("fetching {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("transport failure for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
