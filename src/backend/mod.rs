pub mod config;
pub mod error;
pub mod export;
pub mod formatting;
pub mod loader;
pub mod normalizer;
pub mod pager;
pub mod search;
pub mod settings;
pub mod tokenizer;
pub mod view;

/// One listing: field name -> value, preserving source column order. Every
/// record loaded from one document carries the same key set.
pub type Record = indexmap::IndexMap<String, String>;
