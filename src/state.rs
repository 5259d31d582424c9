use std::sync::{Arc, PoisonError, RwLock};

use crate::data::aggregate::{Summary, summarize};
use crate::data::index::DatasetIndex;

// ---------------------------------------------------------------------------
// Shared index handle
// ---------------------------------------------------------------------------

/// The index currently served to readers.
///
/// Readers take a cheap `Arc` snapshot and query it without holding the
/// lock. A reload builds a complete new index first and then swaps it in,
/// so nobody ever sees a partially built one.
#[derive(Debug, Default)]
pub struct SharedIndex {
    current: RwLock<Arc<DatasetIndex>>,
}

impl SharedIndex {
    pub fn new(index: DatasetIndex) -> Self {
        SharedIndex {
            current: RwLock::new(Arc::new(index)),
        }
    }

    /// Snapshot of the live index.
    pub fn current(&self) -> Arc<DatasetIndex> {
        // The guarded value is a plain Arc; a poisoned lock still holds a
        // complete index.
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swap in a new index, returning the one it replaces.
    pub fn replace(&self, index: DatasetIndex) -> Arc<DatasetIndex> {
        let next = Arc::new(index);
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Result of the latest query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Nothing selected yet.
    Idle,
    /// The corpus has no observations for the selected pair.
    NoData,
    Summaries(Summary),
}

/// Selection state of a salary calculator front end, independent of
/// rendering.
#[derive(Debug)]
pub struct AppState {
    index: Arc<SharedIndex>,

    /// Selected country, if any.
    pub country: Option<String>,

    /// Selected language, if any.
    pub language: Option<String>,

    /// Outcome for the current selection (cached).
    pub outcome: QueryOutcome,
}

impl AppState {
    /// Wrap a shared index and select its first country and language.
    pub fn new(index: Arc<SharedIndex>) -> Self {
        let mut state = AppState {
            index,
            country: None,
            language: None,
            outcome: QueryOutcome::Idle,
        };
        state.select_defaults();
        state
    }

    /// Ingest a freshly loaded index and reset the selection.
    pub fn set_index(&mut self, index: DatasetIndex) {
        self.index.replace(index);
        self.select_defaults();
    }

    fn select_defaults(&mut self) {
        let index = self.index.current();
        self.country = index.list_countries().first().map(|c| c.to_string());
        self.language = self.country.as_deref().and_then(|c| {
            index.list_languages(c).first().map(|l| l.to_string())
        });
        self.refresh();
    }

    /// Select a country. The current language is kept when the new country
    /// has data for it, otherwise the country's first language is taken.
    pub fn select_country(&mut self, country: &str) {
        let index = self.index.current();
        let languages = index.list_languages(country);
        let keep = self
            .language
            .as_deref()
            .is_some_and(|l| languages.contains(&l));
        if !keep {
            self.language = languages.first().map(|l| l.to_string());
        }
        self.country = Some(country.to_string());
        self.refresh();
    }

    /// Select a language for the current country.
    pub fn select_language(&mut self, language: &str) {
        self.language = Some(language.to_string());
        self.refresh();
    }

    /// Recompute `outcome` for the current selection.
    pub fn refresh(&mut self) {
        let Some(country) = self.country.as_deref() else {
            self.outcome = QueryOutcome::Idle;
            return;
        };
        // A country the corpus has no languages for.
        let Some(language) = self.language.as_deref() else {
            self.outcome = QueryOutcome::NoData;
            return;
        };

        let index = self.index.current();
        self.outcome = match index.lookup(country, language) {
            Ok(observations) => QueryOutcome::Summaries(summarize(observations)),
            Err(e) => {
                log::debug!("{e}");
                QueryOutcome::NoData
            }
        };
    }
}
