use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use super::error::{Field, LookupError, MalformedDatasetError, MalformedKind};
use super::model::{Observation, RawObservation};

// ---------------------------------------------------------------------------
// DatasetIndex – country → language → observations
// ---------------------------------------------------------------------------

/// Immutable, queryable view over a validated survey corpus.
///
/// Observations are grouped by country, then by language. Pair lookup is a
/// pair of hash probes; the sorted country and language listings are
/// computed once at build time so they never depend on corpus order.
#[derive(Debug, Clone, Default)]
pub struct DatasetIndex {
    groups: HashMap<String, HashMap<String, Arc<[Observation]>>>,
    countries: BTreeSet<String>,
    languages: HashMap<String, BTreeSet<String>>,
    len: usize,
}

impl DatasetIndex {
    /// Validate every record and group the corpus.
    ///
    /// The first structurally invalid record aborts the build; no partial
    /// index is ever returned.
    pub fn build<I>(observations: I) -> Result<Self, MalformedDatasetError>
    where
        I: IntoIterator<Item = RawObservation>,
    {
        let mut grouped: HashMap<String, HashMap<String, Vec<Observation>>> = HashMap::new();
        let mut len = 0;

        for (record, raw) in observations.into_iter().enumerate() {
            let obs = validate(record, raw)?;
            grouped
                .entry(obs.country.clone())
                .or_default()
                .entry(obs.language.clone())
                .or_default()
                .push(obs);
            len += 1;
        }

        let mut countries = BTreeSet::new();
        let mut languages = HashMap::with_capacity(grouped.len());
        let mut groups: HashMap<String, HashMap<String, Arc<[Observation]>>> =
            HashMap::with_capacity(grouped.len());

        for (country, by_language) in grouped {
            countries.insert(country.clone());
            languages.insert(
                country.clone(),
                by_language.keys().cloned().collect::<BTreeSet<_>>(),
            );
            let frozen: HashMap<String, Arc<[Observation]>> = by_language
                .into_iter()
                .map(|(language, list)| (language, Arc::from(list)))
                .collect();
            groups.insert(country, frozen);
        }

        log::debug!(
            "Indexed {len} observations across {} countries",
            countries.len()
        );

        Ok(DatasetIndex {
            groups,
            countries,
            languages,
            len,
        })
    }

    /// Observations reported for `(country, language)`, in corpus order.
    pub fn lookup(&self, country: &str, language: &str) -> Result<&[Observation], LookupError> {
        self.groups
            .get(country)
            .and_then(|by_language| by_language.get(language))
            .map(|list| &list[..])
            .ok_or_else(|| LookupError::NotFound {
                country: country.to_string(),
                language: language.to_string(),
            })
    }

    /// Whether the corpus has any observation for the pair.
    pub fn contains(&self, country: &str, language: &str) -> bool {
        self.groups
            .get(country)
            .is_some_and(|by_language| by_language.contains_key(language))
    }

    /// Countries in lexicographic order.
    pub fn list_countries(&self) -> Vec<&str> {
        self.countries.iter().map(String::as_str).collect()
    }

    /// Languages known for `country` in lexicographic order; empty when the
    /// country is not in the corpus.
    pub fn list_languages(&self, country: &str) -> Vec<&str> {
        self.languages
            .get(country)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Every language seen in any country, in lexicographic order.
    pub fn all_languages(&self) -> Vec<&str> {
        self.languages
            .values()
            .flatten()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of indexed observations.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no observations.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct (country, language) pairs.
    pub fn pair_count(&self) -> usize {
        self.groups.values().map(HashMap::len).sum()
    }
}

fn validate(record: usize, raw: RawObservation) -> Result<Observation, MalformedDatasetError> {
    let missing = |field| MalformedDatasetError {
        record,
        kind: MalformedKind::MissingField(field),
    };

    let value = raw.value.ok_or_else(|| missing(Field::Value))?;
    if !value.is_finite() || value < 0.0 {
        return Err(MalformedDatasetError {
            record,
            kind: MalformedKind::InvalidValue(value),
        });
    }

    Ok(Observation {
        value,
        experience: non_blank(raw.experience).ok_or_else(|| missing(Field::Experience))?,
        country: non_blank(raw.country).ok_or_else(|| missing(Field::Country))?,
        language: non_blank(raw.language).ok_or_else(|| missing(Field::Language))?,
    })
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}
