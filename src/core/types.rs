//! Response record and answer value types

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::variant::SurveyVariant;

/// A single answer as delivered by the data store.
///
/// `null` deserializes to [`AnswerValue::Null`], which is treated exactly like
/// a skipped question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl AnswerValue {
    /// Canonical string code for categorical matching.
    ///
    /// Whitespace-only text and `null` have no code. Integral numbers render
    /// without a fractional part so `3.0` and `"3"` compare equal.
    pub fn as_code(&self) -> Option<String> {
        match self {
            AnswerValue::Null => None,
            AnswerValue::Bool(b) => Some(b.to_string()),
            AnswerValue::Number(n) if !n.is_finite() => None,
            AnswerValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            AnswerValue::Number(n) => Some(n.to_string()),
            AnswerValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }

    /// Numeric coercion. Failing coercion yields `None`, never zero.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(n) if n.is_finite() => Some(*n),
            AnswerValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Whether a boolean sub-field of a multi-select question is ticked.
    pub fn is_selected(&self) -> bool {
        match self {
            AnswerValue::Bool(b) => *b,
            AnswerValue::Number(n) => n.is_finite() && *n != 0.0,
            AnswerValue::Text(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            ),
            AnswerValue::Null => false,
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_code() {
            Some(code) => write!(f, "{code}"),
            None => Ok(()),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        AnswerValue::Number(value)
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        AnswerValue::Bool(value)
    }
}

/// Geographic granularity of a derived geography field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoLevel {
    District,
    Region,
    Area,
    Neighborhood,
}

impl GeoLevel {
    pub const ALL: [GeoLevel; 4] = [
        GeoLevel::District,
        GeoLevel::Region,
        GeoLevel::Area,
        GeoLevel::Neighborhood,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GeoLevel::District => "district",
            GeoLevel::Region => "region",
            GeoLevel::Area => "area",
            GeoLevel::Neighborhood => "neighborhood",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "district" => Some(Self::District),
            "region" => Some(Self::Region),
            "area" => Some(Self::Area),
            "neighborhood" | "neighbourhood" => Some(Self::Neighborhood),
            _ => None,
        }
    }
}

impl fmt::Display for GeoLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geography attached to a record at ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geography {
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
}

impl Geography {
    /// Trimmed, non-empty code for the given level.
    pub fn get(&self, level: GeoLevel) -> Option<&str> {
        let raw = match level {
            GeoLevel::District => self.district.as_deref(),
            GeoLevel::Region => self.region.as_deref(),
            GeoLevel::Area => self.area.as_deref(),
            GeoLevel::Neighborhood => self.neighborhood.as_deref(),
        };
        raw.map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn set(&mut self, level: GeoLevel, code: impl Into<String>) {
        let slot = match level {
            GeoLevel::District => &mut self.district,
            GeoLevel::Region => &mut self.region,
            GeoLevel::Area => &mut self.area,
            GeoLevel::Neighborhood => &mut self.neighborhood,
        };
        *slot = Some(code.into());
    }
}

/// One respondent's submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub id: String,
    /// Submission date; unparseable dates are dropped rather than rejected.
    #[serde(default, deserialize_with = "lenient_date")]
    pub submitted: Option<NaiveDate>,
    /// Instrument the record was collected with. Untagged records only show
    /// up under the merged variant.
    #[serde(default)]
    pub instrument: Option<SurveyVariant>,
    #[serde(default)]
    pub geo: Geography,
    #[serde(default)]
    pub answers: BTreeMap<String, AnswerValue>,
}

impl ResponseRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            submitted: None,
            instrument: None,
            geo: Geography::default(),
            answers: BTreeMap::new(),
        }
    }

    pub fn with_answer(mut self, code: impl Into<String>, value: impl Into<AnswerValue>) -> Self {
        self.answers.insert(code.into(), value.into());
        self
    }

    pub fn with_geo(mut self, level: GeoLevel, code: impl Into<String>) -> Self {
        self.geo.set(level, code);
        self
    }

    pub fn with_instrument(mut self, variant: SurveyVariant) -> Self {
        self.instrument = Some(variant);
        self
    }

    /// Raw answer for a question code, `None` when skipped or null.
    pub fn answer(&self, code: &str) -> Option<&AnswerValue> {
        self.answers
            .get(code)
            .filter(|v| !matches!(v, AnswerValue::Null))
    }

    /// Canonical categorical code for a question, `None` when absent.
    pub fn code(&self, question: &str) -> Option<String> {
        self.answer(question).and_then(AnswerValue::as_code)
    }

    /// Numeric answer for a question, `None` when absent or not numeric.
    pub fn number(&self, question: &str) -> Option<f64> {
        self.answer(question).and_then(AnswerValue::as_number)
    }

    /// Drop every answer whose question is not in `allowed`.
    pub fn restrict_questions<'a, I>(&mut self, allowed: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        let allowed: std::collections::HashSet<&String> = allowed.into_iter().collect();
        self.answers.retain(|code, _| allowed.contains(code));
    }
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDate {
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<RawDate>::deserialize(deserializer)? {
        Some(RawDate::Text(raw)) => parse_submission_date(&raw),
        Some(RawDate::Other(_)) | None => None,
    })
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_submission_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_codes_match_text_codes() {
        assert_eq!(AnswerValue::Number(3.0).as_code(), Some("3".to_string()));
        assert_eq!(AnswerValue::Text(" 3 ".into()).as_code(), Some("3".to_string()));
        assert_eq!(AnswerValue::Number(2.5).as_code(), Some("2.5".to_string()));
    }

    #[test]
    fn test_empty_text_is_absent() {
        let record = ResponseRecord::new("r1")
            .with_answer("GENDER", "")
            .with_answer("AGE", "  ");
        assert_eq!(record.code("GENDER"), None);
        assert_eq!(record.code("AGE"), None);
        assert_eq!(record.code("MISSING"), None);
    }

    #[test]
    fn test_failed_numeric_coercion_is_none_not_zero() {
        assert_eq!(AnswerValue::Text("abc".into()).as_number(), None);
        assert_eq!(AnswerValue::Text("".into()).as_number(), None);
        assert_eq!(AnswerValue::Number(f64::NAN).as_number(), None);
        assert_eq!(AnswerValue::Text(" 42 ".into()).as_number(), Some(42.0));
    }

    #[test]
    fn test_selection_flags() {
        assert!(AnswerValue::Bool(true).is_selected());
        assert!(AnswerValue::Number(1.0).is_selected());
        assert!(AnswerValue::Text("Yes".into()).is_selected());
        assert!(!AnswerValue::Bool(false).is_selected());
        assert!(!AnswerValue::Number(0.0).is_selected());
        assert!(!AnswerValue::Null.is_selected());
    }

    #[test]
    fn test_record_deserializes_with_nulls_and_bad_dates() {
        let json = r#"{
            "id": "a1",
            "submitted": "not a date",
            "instrument": "public",
            "geo": {"district": " 3 "},
            "answers": {"GENDER": 1, "AGE": "34", "Q9": null, "FLAG": true}
        }"#;
        let record: ResponseRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.submitted, None);
        assert_eq!(record.instrument, Some(SurveyVariant::Public));
        assert_eq!(record.geo.get(GeoLevel::District), Some("3"));
        assert_eq!(record.code("GENDER"), Some("1".to_string()));
        assert_eq!(record.number("AGE"), Some(34.0));
        assert!(record.answer("Q9").is_none());
        assert!(record.answer("FLAG").unwrap().is_selected());
    }

    #[test]
    fn test_submission_date_formats() {
        assert_eq!(
            parse_submission_date("2024-03-05"),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(
            parse_submission_date("2024-03-05T10:00:00Z"),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(parse_submission_date("05/03/2024"), None);
    }
}
