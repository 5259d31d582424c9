use std::fmt::Write as _;

use serde::Serialize;

use crate::data::aggregate::Summary;

/// Lower bound of the salary axis, in thousands.
pub const AXIS_FLOOR: f64 = 100.0;

/// Format a salary given in thousands, e.g. `$45K`.
///
/// Values of a million or more are rounded to whole thousands; smaller ones
/// are printed as they are.
pub fn format_salary(value: f64) -> String {
    if value >= 1000.0 {
        format!("${}K", value.round())
    } else {
        format!("${value}K")
    }
}

/// A query result labelled with the selection it answers.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub country: &'a str,
    pub language: &'a str,
    #[serde(flatten)]
    pub summary: &'a Summary,
    pub axis_max: f64,
}

impl<'a> Report<'a> {
    pub fn new(country: &'a str, language: &'a str, summary: &'a Summary) -> Self {
        Report {
            country,
            language,
            summary,
            axis_max: summary.axis_max(AXIS_FLOOR),
        }
    }

    /// Plain-text table, one row per band in canonical order.
    pub fn render_table(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} / {}", self.language, self.country);
        let _ = writeln!(
            out,
            "{:<12} {:<4} {:>6} {:>9} {:>9} {:>9} {:>9} {:>9}",
            "Experience", "", "Count", "Min", "Q1", "Median", "Q3", "Max"
        );
        for (band, s) in &self.summary.summaries {
            let _ = writeln!(
                out,
                "{:<12} {:<4} {:>6} {:>9} {:>9} {:>9} {:>9} {:>9}",
                band.label(),
                band.short_label(),
                s.count,
                format_salary(s.min),
                format_salary(s.q1),
                format_salary(s.median),
                format_salary(s.q3),
                format_salary(s.max),
            );
        }
        if self.summary.skipped_count > 0 {
            let _ = writeln!(
                out,
                "({} observations with unrecognised experience skipped)",
                self.summary.skipped_count
            );
        }
        out
    }

    /// Pretty-printed JSON.
    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::summarize;
    use crate::data::model::Observation;

    fn obs(experience: &str, value: f64) -> Observation {
        Observation {
            value,
            experience: experience.to_string(),
            country: "Spain".to_string(),
            language: "Rust".to_string(),
        }
    }

    #[test]
    fn test_format_salary() {
        assert_eq!(format_salary(45.0), "$45K");
        assert_eq!(format_salary(62.5), "$62.5K");
        assert_eq!(format_salary(1234.6), "$1235K");
    }

    #[test]
    fn test_table_rows_in_canonical_order() {
        let summary = summarize(&[
            obs("16+ years", 200.0),
            obs("<1 year", 20.0),
            obs("whenever", 1.0),
        ]);
        let table = Report::new("Spain", "Rust", &summary).render_table();
        let junior = table.find("<1 year").unwrap();
        let senior = table.find("16+ years").unwrap();
        assert!(junior < senior);
        assert!(table.contains("L6"));
        assert!(table.contains("$200K"));
        assert!(table.contains("1 observations with unrecognised experience skipped"));
    }

    #[test]
    fn test_json_shape() {
        let summary = summarize(&[obs("3–5 years", 40.0), obs("3–5 years", 60.0)]);
        let json = Report::new("Spain", "Rust", &summary).render_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["country"], "Spain");
        assert_eq!(value["summaries"]["3–5 years"]["median"], 50.0);
        assert_eq!(value["skipped_count"], 0);
        assert_eq!(value["axis_max"], 100.0);
    }
}
