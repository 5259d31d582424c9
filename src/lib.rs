//! Developer salary ranges by country, language and experience band.
//!
//! A corpus of self-reported salaries is loaded once into a
//! [`DatasetIndex`]; each (country, language) query hands its observations
//! to [`summarize`], which returns a five-number summary per experience
//! band.

pub mod data;
pub mod report;
pub mod state;

pub use data::aggregate::{DistributionSummary, Summary, summarize};
pub use data::error::{LookupError, MalformedDatasetError};
pub use data::index::DatasetIndex;
pub use data::model::{ExperienceBand, Observation, RawObservation};
