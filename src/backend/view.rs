use indexmap::IndexSet;
use log::{debug, warn};

use super::config::{ConfigSet, Configuration};
use super::error::LoadError;
use super::loader::{self, TextFetcher};
use super::normalizer::{self, DisplayData, FieldIndex, RecognizedFields};
use super::pager::Pager;
use super::search::{self, SearchState};
use super::Record;

/// Receives the filtered listing set whenever it changes. The view owns at
/// most one sink; rendering layers implement this to stay in step without
/// polling.
pub trait ViewSink {
    fn filtered_changed(&mut self, listings: &[&Record]);
}

/// Coarse display state, derived rather than stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewStatus {
    Loading,
    Ready,
    /// Loaded successfully but the record set is empty.
    Empty,
    /// Records exist but the current search matches none of them.
    NoMatches,
    Error(String),
}

/// Ties a load result back to the request that started it. Results carrying
/// a stale token are discarded, so a slow fetch can never overwrite the data
/// of a list selected later.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadToken(u64);

/// Central state for the listings pipeline: the configuration set, the
/// loaded records, and the search/pagination state layered over them. All
/// mutation goes through this type so the filtered view, the pager and the
/// sink stay consistent.
pub struct ListingsView {
    configs: ConfigSet,
    current: Option<String>,
    records: Vec<Record>,
    filtered: Vec<usize>,
    available_fields: IndexSet<String>,
    field_index: FieldIndex,
    search: SearchState,
    pager: Pager,
    loading: bool,
    error: Option<String>,
    generation: u64,
    sink: Option<Box<dyn ViewSink>>,
}

impl ListingsView {
    pub fn new(configs: ConfigSet) -> Self {
        Self {
            configs,
            current: None,
            records: Vec::new(),
            filtered: Vec::new(),
            available_fields: IndexSet::new(),
            field_index: FieldIndex::default(),
            search: SearchState::default(),
            pager: Pager::default(),
            loading: true,
            error: None,
            generation: 0,
            sink: None,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.pager = Pager::new(page_size);
        self
    }

    pub fn set_sink(&mut self, sink: Box<dyn ViewSink>) {
        self.sink = Some(sink);
    }

    pub fn current_list(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn config(&self) -> Option<&Configuration> {
        self.current.as_ref().and_then(|id| self.configs.get(id))
    }

    pub fn configs(&self) -> &ConfigSet {
        &self.configs
    }

    /// Switches the active list. The record set is untouched until the next
    /// load completes.
    pub fn select(&mut self, id: &str) -> Result<(), LoadError> {
        if !self.configs.contains_key(id) {
            return Err(LoadError::UnknownList(id.to_string()));
        }
        self.current = Some(id.to_string());
        Ok(())
    }

    /// Marks the start of a load and returns the token the eventual result
    /// must present to `apply_load`.
    pub fn begin_load(&mut self) -> LoadToken {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        LoadToken(self.generation)
    }

    /// Installs a load result, unless a newer load has started since `token`
    /// was issued, in which case the result is dropped.
    pub fn apply_load(&mut self, token: LoadToken, result: Result<Vec<Record>, LoadError>) {
        if token.0 != self.generation {
            debug!("dropping stale load result (token {})", token.0);
            return;
        }
        self.loading = false;
        match result {
            Ok(records) => {
                self.error = None;
                self.field_index = FieldIndex::from_records(&records);
                self.available_fields = records
                    .first()
                    .map(|record| record.keys().cloned().collect())
                    .unwrap_or_default();
                self.records = records;
                // A new record set invalidates the field selection but the
                // typed term carries over.
                self.search.clear_fields();
                self.pager.reset();
                self.refilter();
            }
            Err(err) => {
                warn!("load failed: {err}");
                self.error = Some(err.to_string());
                self.records.clear();
                self.available_fields.clear();
                self.field_index = FieldIndex::default();
                self.filtered.clear();
                self.pager.reset();
                self.notify_sink();
            }
        }
    }

    /// Loads the current list synchronously through `fetcher`.
    pub fn reload(&mut self, fetcher: &dyn TextFetcher) {
        let Some(id) = self.current.clone() else {
            return;
        };
        let token = self.begin_load();
        let result = match self.configs.get(&id) {
            Some(config) => loader::load(&id, config, fetcher),
            None => Err(LoadError::UnknownList(id)),
        };
        self.apply_load(token, result);
    }

    fn refilter(&mut self) {
        self.filtered = search::filter(&self.records, &self.search, &self.available_fields);
        self.pager.reset();
        self.notify_sink();
    }

    fn notify_sink(&mut self) {
        // Take the sink out so the filtered borrow and the sink call do not
        // alias.
        if let Some(mut sink) = self.sink.take() {
            let listings: Vec<&Record> = self.filtered.iter().map(|&i| &self.records[i]).collect();
            sink.filtered_changed(&listings);
            self.sink = Some(sink);
        }
    }

    pub fn set_term(&mut self, term: impl Into<String>) {
        self.search.set_term(term);
        self.refilter();
    }

    pub fn toggle_field(&mut self, field: &str) {
        self.search.toggle_field(field, &self.available_fields);
        self.refilter();
    }

    pub fn clear_fields(&mut self) {
        self.search.clear_fields();
        self.refilter();
    }

    pub fn use_configured_fields(&mut self) {
        let config = self.config().cloned();
        self.search
            .use_configured_fields(config.as_ref(), &self.available_fields);
        self.refilter();
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    pub fn search_summary(&self) -> String {
        search::summary(&self.search, self.config(), &self.available_fields)
    }

    pub fn available_fields(&self) -> &IndexSet<String> {
        &self.available_fields
    }

    pub fn set_page(&mut self, page: usize) {
        self.pager.set_page(page, self.filtered.len());
    }

    pub fn current_page(&self) -> usize {
        self.pager.current_page()
    }

    pub fn total_pages(&self) -> usize {
        self.pager.total_pages(self.filtered.len())
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// The records on the current page, in filtered order.
    pub fn page_slice(&self) -> Vec<&Record> {
        self.pager
            .page_range(self.filtered.len())
            .map(|i| &self.records[self.filtered[i]])
            .collect()
    }

    /// Every filtered record, for export.
    pub fn filtered_records(&self) -> Vec<&Record> {
        self.filtered.iter().map(|&i| &self.records[i]).collect()
    }

    pub fn status(&self) -> ViewStatus {
        if self.loading {
            return ViewStatus::Loading;
        }
        if let Some(message) = &self.error {
            return ViewStatus::Error(message.clone());
        }
        if self.records.is_empty() {
            return ViewStatus::Empty;
        }
        if self.filtered.is_empty() {
            return ViewStatus::NoMatches;
        }
        ViewStatus::Ready
    }

    pub fn display_data(&self, record: &Record) -> DisplayData {
        match self.config() {
            Some(config) => normalizer::display_data(record, config, &self.field_index),
            None => DisplayData::default(),
        }
    }

    pub fn recognized(&self, record: &Record) -> RecognizedFields {
        match self.config() {
            Some(config) => normalizer::recognize(record, config, &self.field_index),
            None => RecognizedFields::default(),
        }
    }

    pub fn unrecognized(&self, record: &Record) -> Vec<(String, String)> {
        match self.config() {
            Some(config) => normalizer::unrecognized(record, config),
            None => Vec::new(),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::config::embedded_configs;

    struct StubFetcher(Result<String, u16>);

    impl TextFetcher for StubFetcher {
        fn fetch_text(&self, location: &str) -> Result<String, LoadError> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(LoadError::Status {
                    url: location.to_string(),
                    status: *status,
                }),
            }
        }
    }

    fn csv_configs() -> ConfigSet {
        crate::backend::config::parse_configs(
            r#"{"towns": {"dataset": "towns.csv", "nameColumn": "name"}}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_unknown_list_is_rejected() {
        let mut view = ListingsView::new(embedded_configs());
        assert!(matches!(
            view.select("nope"),
            Err(LoadError::UnknownList(_))
        ));
        assert!(view.select("cities").is_ok());
    }

    #[test]
    fn test_mock_load_and_pagination() {
        let mut view = ListingsView::new(embedded_configs());
        view.select("cities").unwrap();
        view.reload(&StubFetcher(Ok(String::new())));
        assert_eq!(view.record_count(), 250);
        assert_eq!(view.total_pages(), 2);
        assert_eq!(view.page_slice().len(), 200);
        view.set_page(2);
        assert_eq!(view.page_slice().len(), 50);
        assert_eq!(view.status(), ViewStatus::Ready);
    }

    #[test]
    fn test_load_failure_becomes_error_state() {
        let mut view = ListingsView::new(csv_configs());
        view.select("towns").unwrap();
        view.reload(&StubFetcher(Err(404)));
        assert!(matches!(view.status(), ViewStatus::Error(_)));
        assert_eq!(view.filtered_len(), 0);
        assert!(view.page_slice().is_empty());
    }

    #[test]
    fn test_stale_load_result_is_dropped() {
        let mut view = ListingsView::new(csv_configs());
        view.select("towns").unwrap();
        let stale = view.begin_load();
        let fresh = view.begin_load();
        view.apply_load(fresh, Ok(vec![Record::from_iter([(
            "name".to_string(),
            "Athens".to_string(),
        )])]));
        // The slower, older load finishes afterwards and must not win.
        view.apply_load(stale, Ok(Vec::new()));
        assert_eq!(view.record_count(), 1);
        assert_eq!(view.status(), ViewStatus::Ready);
    }

    #[test]
    fn test_reload_clears_fields_but_keeps_term() {
        let mut view = ListingsView::new(embedded_configs());
        view.select("cities").unwrap();
        let fetcher = StubFetcher(Ok(String::new()));
        view.reload(&fetcher);
        view.set_term("macon");
        view.toggle_field("city");
        assert!(!view.search_state().active_fields.is_empty());
        view.reload(&fetcher);
        assert!(view.search_state().active_fields.is_empty());
        assert_eq!(view.search_state().term, "macon");
        // Term survives, so the filter is still narrowed.
        assert_eq!(view.filtered_len(), 50);
    }

    #[test]
    fn test_no_matches_state() {
        let mut view = ListingsView::new(embedded_configs());
        view.select("cities").unwrap();
        view.reload(&StubFetcher(Ok(String::new())));
        view.set_term("zzzzzz");
        assert_eq!(view.status(), ViewStatus::NoMatches);
        view.set_term("");
        assert_eq!(view.status(), ViewStatus::Ready);
    }

    #[test]
    fn test_sink_notified_on_filter_change() {
        use std::cell::Cell;
        use std::rc::Rc;

        struct CountingSink {
            calls: Rc<Cell<usize>>,
            last_len: Rc<Cell<usize>>,
        }

        impl ViewSink for CountingSink {
            fn filtered_changed(&mut self, listings: &[&Record]) {
                self.calls.set(self.calls.get() + 1);
                self.last_len.set(listings.len());
            }
        }

        let calls = Rc::new(Cell::new(0));
        let last_len = Rc::new(Cell::new(0));
        let mut view = ListingsView::new(embedded_configs());
        view.set_sink(Box::new(CountingSink {
            calls: Rc::clone(&calls),
            last_len: Rc::clone(&last_len),
        }));
        view.select("cities").unwrap();
        view.reload(&StubFetcher(Ok(String::new())));
        assert_eq!(calls.get(), 1);
        assert_eq!(last_len.get(), 250);
        view.set_term("macon");
        assert_eq!(calls.get(), 2);
        assert_eq!(last_len.get(), 50);
    }

    #[test]
    fn test_filter_reset_returns_to_first_page() {
        let mut view = ListingsView::new(embedded_configs());
        view.select("cities").unwrap();
        view.reload(&StubFetcher(Ok(String::new())));
        view.set_page(2);
        assert_eq!(view.current_page(), 2);
        view.set_term("atlanta");
        assert_eq!(view.current_page(), 1);
    }
}
