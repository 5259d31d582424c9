use std::fmt;

use thiserror::Error;

/// A required observation field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Value,
    Experience,
    Country,
    Language,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Value => "value",
            Field::Experience => "experience",
            Field::Country => "country",
            Field::Language => "language",
        };
        f.write_str(name)
    }
}

/// What is wrong with a rejected record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MalformedKind {
    /// The field is absent or blank.
    MissingField(Field),
    /// NaN, infinite or negative salary.
    InvalidValue(f64),
}

impl fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedKind::MissingField(field) => write!(f, "missing required field '{field}'"),
            MalformedKind::InvalidValue(v) => {
                write!(f, "value {v} is not a finite non-negative number")
            }
        }
    }
}

/// A corpus record failed validation; the whole index build is aborted.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("malformed dataset: record {record}: {kind}")]
pub struct MalformedDatasetError {
    /// Zero-based position of the record in the build input.
    pub record: usize,
    pub kind: MalformedKind,
}

/// Errors returned by index queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The (country, language) pair never appeared in the corpus.
    #[error("no data for {language} in {country}")]
    NotFound { country: String, language: String },
}
