//! Core survey data model.
//!
//! A [`ResponseRecord`] is one respondent's submission: a sparse map from
//! question code to [`AnswerValue`], plus geography derived at ingestion and
//! the survey instrument it came from.

pub mod types;
pub mod variant;

pub use types::{AnswerValue, GeoLevel, Geography, ResponseRecord};
pub use variant::{SurveyVariant, VariantProfile};
