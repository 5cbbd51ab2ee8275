//! Value canonicalization for matched field text.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use shared_types::FieldValue;

lazy_static! {
    static ref NUMBER: Regex = Regex::new(r"(\d+(?:\.\d+)?)").unwrap();
}

/// Date layouts accepted on scanned forms. US month/day order is tried
/// before day/month. Two-digit-year layouts come first: `%y` rejects a
/// four-digit year as trailing garbage, while `%Y` would happily read a
/// bare "25" as the year 25.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%y", "%m/%d/%Y", "%m-%d-%y", "%m-%d-%Y", "%Y-%m-%d", "%d/%m/%y", "%d/%m/%Y",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalizer {
    /// Canonicalize a date string into a calendar date.
    DateUs,
    /// Pull the first numeric token out of the match.
    Digits,
    /// Collapse all whitespace runs (multi-line captures) to single spaces.
    CollapseWhitespace,
}

/// Apply a normalizer to matched text. Values that fail to canonicalize
/// keep their raw text so the validator can flag them instead of the
/// parser silently defaulting anything.
pub fn apply(normalizer: Option<Normalizer>, raw: &str) -> FieldValue {
    let raw = raw.trim();
    match normalizer {
        None => FieldValue::Text(raw.to_string()),
        Some(Normalizer::DateUs) => match parse_date(raw) {
            Some(date) => FieldValue::Date(date),
            None => FieldValue::Text(raw.to_string()),
        },
        Some(Normalizer::Digits) => match NUMBER
            .captures(raw)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
        {
            Some(number) => FieldValue::Number(number),
            None => FieldValue::Text(raw.to_string()),
        },
        Some(Normalizer::CollapseWhitespace) => {
            FieldValue::Text(raw.split_whitespace().collect::<Vec<_>>().join(" "))
        }
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim().trim_end_matches(['.', ',']);
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn canonicalizes_common_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2025, 7, 8).unwrap();
        for raw in ["07/08/2025", "7/8/25", "07-08-2025", "7-8-25"] {
            assert_eq!(parse_date(raw), Some(expected), "layout {raw}");
        }
        assert_eq!(
            parse_date("2025-03-14"),
            NaiveDate::from_ymd_opt(2025, 3, 14)
        );
    }

    #[test]
    fn day_month_order_is_a_fallback() {
        // 25/03/2025 cannot be month-first, so the d/m layout catches it.
        assert_eq!(
            parse_date("25/03/2025"),
            NaiveDate::from_ymd_opt(2025, 3, 25)
        );
    }

    #[test]
    fn garbage_dates_keep_raw_text() {
        assert_eq!(parse_date("6-1"), None);
        assert_eq!(
            apply(Some(Normalizer::DateUs), "6-1"),
            FieldValue::Text("6-1".into())
        );
    }

    #[test]
    fn digits_normalizer_extracts_numbers() {
        assert_eq!(apply(Some(Normalizer::Digits), "2"), FieldValue::Number(2.0));
        assert_eq!(
            apply(Some(Normalizer::Digits), "1.5 hours"),
            FieldValue::Number(1.5)
        );
        assert_eq!(
            apply(Some(Normalizer::Digits), "none"),
            FieldValue::Text("none".into())
        );
    }

    #[test]
    fn collapse_whitespace_flattens_multiline_captures() {
        assert_eq!(
            apply(Some(Normalizer::CollapseWhitespace), "met with\nclient  today"),
            FieldValue::Text("met with client today".into())
        );
    }

    proptest! {
        #[test]
        fn never_panics_on_arbitrary_input(raw in ".{0,200}") {
            let _ = apply(Some(Normalizer::DateUs), &raw);
            let _ = apply(Some(Normalizer::Digits), &raw);
            let _ = apply(Some(Normalizer::CollapseWhitespace), &raw);
            let _ = apply(None, &raw);
        }

        #[test]
        fn valid_dates_round_trip(year in 1990i32..2100, month in 1u32..=12, day in 1u32..=28) {
            let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
            let rendered = date.format("%m/%d/%Y").to_string();
            prop_assert_eq!(parse_date(&rendered), Some(date));
        }
    }
}
