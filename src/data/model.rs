use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// ExperienceBand – the fixed, ordered professional-experience ranges
// ---------------------------------------------------------------------------

/// One of the canonical professional-experience ranges.
///
/// Variants are declared in canonical order, so the derived `Ord` is the
/// presentation order and a `BTreeMap<ExperienceBand, _>` iterates from the
/// least to the most experienced band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExperienceBand {
    LessThanOne,
    OneToTwo,
    ThreeToFive,
    SixToTen,
    ElevenToSixteen,
    SixteenPlus,
}

impl ExperienceBand {
    /// All bands in canonical order.
    pub const ALL: [ExperienceBand; 6] = [
        ExperienceBand::LessThanOne,
        ExperienceBand::OneToTwo,
        ExperienceBand::ThreeToFive,
        ExperienceBand::SixToTen,
        ExperienceBand::ElevenToSixteen,
        ExperienceBand::SixteenPlus,
    ];

    /// Canonical survey label (en-dash spelling).
    pub fn label(self) -> &'static str {
        match self {
            ExperienceBand::LessThanOne => "<1 year",
            ExperienceBand::OneToTwo => "1–2 years",
            ExperienceBand::ThreeToFive => "3–5 years",
            ExperienceBand::SixToTen => "6–10 years",
            ExperienceBand::ElevenToSixteen => "11–16 years",
            ExperienceBand::SixteenPlus => "16+ years",
        }
    }

    /// Compact axis label, `L1` for the least experienced band up to `L6`.
    pub fn short_label(self) -> &'static str {
        match self {
            ExperienceBand::LessThanOne => "L1",
            ExperienceBand::OneToTwo => "L2",
            ExperienceBand::ThreeToFive => "L3",
            ExperienceBand::SixToTen => "L4",
            ExperienceBand::ElevenToSixteen => "L5",
            ExperienceBand::SixteenPlus => "L6",
        }
    }

    /// Recognise a survey label.
    ///
    /// Surrounding whitespace is ignored and an ASCII hyphen is accepted in
    /// place of the en-dash. Anything else is unrecognised.
    pub fn parse(label: &str) -> Option<Self> {
        let dash = |c: char| if c == '-' { '–' } else { c };
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|band| band.label().chars().eq(label.chars().map(dash)))
    }
}

impl fmt::Display for ExperienceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when a label is not one of the canonical bands.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised experience band: {0:?}")]
pub struct UnknownBand(pub String);

impl FromStr for ExperienceBand {
    type Err = UnknownBand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownBand(s.to_string()))
    }
}

impl Serialize for ExperienceBand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ExperienceBand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// RawObservation – a record as delivered by a loader
// ---------------------------------------------------------------------------

/// A survey record before validation. Every field may be absent; the index
/// builder rejects records that are missing any of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl RawObservation {
    /// Convenience constructor for a fully populated record.
    pub fn new(country: &str, language: &str, experience: &str, value: f64) -> Self {
        RawObservation {
            value: Some(value),
            experience: Some(experience.to_string()),
            country: Some(country.to_string()),
            language: Some(language.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Observation – one validated salary data point
// ---------------------------------------------------------------------------

/// A validated salary report.
///
/// `value` is finite and non-negative. `experience` keeps the label as it
/// appeared in the corpus; band recognition is deferred to aggregation so a
/// stray label costs one skipped record rather than the whole load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub value: f64,
    pub experience: String,
    pub country: String,
    pub language: String,
}

impl Observation {
    /// The recognised band of this observation, if any.
    pub fn band(&self) -> Option<ExperienceBand> {
        ExperienceBand::parse(&self.experience)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order() {
        let mut shuffled = vec![
            ExperienceBand::SixteenPlus,
            ExperienceBand::LessThanOne,
            ExperienceBand::SixToTen,
            ExperienceBand::OneToTwo,
            ExperienceBand::ElevenToSixteen,
            ExperienceBand::ThreeToFive,
        ];
        shuffled.sort();
        assert_eq!(shuffled, ExperienceBand::ALL);
    }

    #[test]
    fn test_parse_labels() {
        for band in ExperienceBand::ALL {
            assert_eq!(ExperienceBand::parse(band.label()), Some(band));
        }
        assert_eq!(
            ExperienceBand::parse("  3–5 years "),
            Some(ExperienceBand::ThreeToFive)
        );
        assert_eq!(
            ExperienceBand::parse("11-16 years"),
            Some(ExperienceBand::ElevenToSixteen)
        );
        assert_eq!(ExperienceBand::parse("unknown"), None);
        assert_eq!(ExperienceBand::parse("3 to 5 years"), None);
        assert_eq!(ExperienceBand::parse(""), None);
    }

    #[test]
    fn test_parse_mixed_dashes() {
        assert_eq!(
            ExperienceBand::parse("6-10 years"),
            Some(ExperienceBand::SixToTen)
        );
        assert_eq!(ExperienceBand::parse("6–10 years"), Some(ExperienceBand::SixToTen));
        assert_eq!(ExperienceBand::parse("6—10 years"), None);
        assert_eq!(ExperienceBand::parse("6-10 year"), None);
    }

    #[test]
    fn test_observation_from_raw_only_via_validation() {
        // Observations are produced by the index builder, never deserialized.
        let raw: RawObservation = serde_json::from_str(
            r#"{"value": 12.5, "experience": "<1 year", "country": "Chile", "language": "Go"}"#,
        )
        .unwrap();
        let index = crate::data::index::DatasetIndex::build(vec![raw]).unwrap();
        let obs = &index.lookup("Chile", "Go").unwrap()[0];
        assert_eq!(obs.value, 12.5);
        assert_eq!(obs.band(), Some(ExperienceBand::LessThanOne));
    }

    #[test]
    fn test_short_labels() {
        let labels: Vec<_> = ExperienceBand::ALL.iter().map(|b| b.short_label()).collect();
        assert_eq!(labels, ["L1", "L2", "L3", "L4", "L5", "L6"]);
    }

    #[test]
    fn test_from_str_error() {
        let err = "ten years".parse::<ExperienceBand>().unwrap_err();
        assert!(err.to_string().contains("ten years"));
    }

    #[test]
    fn test_serde_uses_label() {
        let json = serde_json::to_string(&ExperienceBand::SixToTen).unwrap();
        assert_eq!(json, "\"6–10 years\"");
        let back: ExperienceBand = serde_json::from_str("\"6-10 years\"").unwrap();
        assert_eq!(back, ExperienceBand::SixToTen);
        assert!(serde_json::from_str::<ExperienceBand>("\"forever\"").is_err());
    }

    #[test]
    fn test_raw_observation_missing_fields_deserialize() {
        let raw: RawObservation = serde_json::from_str(r#"{"country": "Spain"}"#).unwrap();
        assert_eq!(raw.country.as_deref(), Some("Spain"));
        assert!(raw.value.is_none());
        assert!(raw.language.is_none());
    }
}
