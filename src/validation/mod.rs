//! Request body schemas.
//!
//! Each request type deserializes leniently (every field optional, loosely
//! typed) and is then checked by a `validate` method that collects *all*
//! field-level problems into [`ValidationErrors`] before returning the
//! domain input the datastore expects.

pub mod approval;
pub mod checklist;
pub mod escalation;
pub mod evidence;
pub mod inspection;
pub mod project;
pub mod user;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One field-level validation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.0
    }

    /// `Ok(value)` when nothing was recorded
    pub fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    pub fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.add(field, format!("{} is required", field));
        }
        value
    }

    /// Trimmed string with a character-count window. Empty strings count as absent.
    pub fn text(
        &mut self,
        field: &str,
        value: Option<String>,
        min: usize,
        max: usize,
        required: bool,
    ) -> Option<String> {
        let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        match value {
            None if required => {
                self.add(field, format!("{} is required", field));
                None
            }
            None => None,
            Some(v) => {
                let len = v.chars().count();
                if len < min || len > max {
                    self.add(
                        field,
                        format!("{} must be between {} and {} characters (got {})", field, min, max, len),
                    );
                    None
                } else {
                    Some(v)
                }
            }
        }
    }

    /// `YYYY-MM-DD`, or an RFC 3339 timestamp whose date part is used
    pub fn date(&mut self, field: &str, value: Option<&str>, required: bool) -> Option<NaiveDate> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => {
                if required {
                    self.add(field, format!("{} is required", field));
                }
                None
            }
            Some(raw) => match parse_date(raw) {
                Some(d) => Some(d),
                None => {
                    self.add(field, format!("{} must be a date in YYYY-MM-DD format", field));
                    None
                }
            },
        }
    }

    pub fn timestamp(&mut self, field: &str, value: Option<&str>) -> Option<DateTime<Utc>> {
        let raw = value.map(str::trim).filter(|v| !v.is_empty())?;
        match DateTime::parse_from_rfc3339(raw) {
            Ok(ts) => Some(ts.with_timezone(&Utc)),
            Err(_) => {
                self.add(field, format!("{} must be an RFC 3339 timestamp", field));
                None
            }
        }
    }

    pub fn uuid(&mut self, field: &str, value: Option<&str>, required: bool) -> Option<Uuid> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => {
                if required {
                    self.add(field, format!("{} is required", field));
                }
                None
            }
            Some(raw) => match Uuid::parse_str(raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    self.add(field, format!("{} must be a valid UUID", field));
                    None
                }
            },
        }
    }

    pub fn range(&mut self, field: &str, value: Option<f64>, min: f64, max: f64) -> Option<f64> {
        let v = value?;
        if !v.is_finite() || v < min || v > max {
            self.add(field, format!("{} must be between {} and {}", field, min, max));
            return None;
        }
        Some(v)
    }

    pub fn non_negative(&mut self, field: &str, value: Option<f64>) -> Option<f64> {
        let v = value?;
        if !v.is_finite() || v < 0.0 {
            self.add(field, format!("{} must be zero or greater", field));
            return None;
        }
        Some(v)
    }

    /// Latitude/longitude pair: both or neither, each within bounds
    pub fn geolocation(&mut self, latitude: Option<f64>, longitude: Option<f64>) -> Option<(f64, f64)> {
        match (latitude, longitude) {
            (None, None) => None,
            (Some(_), None) => {
                self.add("longitude", "longitude is required when latitude is provided");
                None
            }
            (None, Some(_)) => {
                self.add("latitude", "latitude is required when longitude is provided");
                None
            }
            (lat, lng) => {
                let lat = self.range("latitude", lat, -90.0, 90.0);
                let lng = self.range("longitude", lng, -180.0, 180.0);
                lat.zip(lng)
            }
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|e| format!("{}: {}", e.field, e.message)).collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|ts| ts.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_trims_and_bounds() {
        let mut errors = ValidationErrors::new();
        assert_eq!(errors.text("name", Some("  site A ".into()), 1, 10, true).as_deref(), Some("site A"));
        assert!(errors.text("name", Some("   ".into()), 1, 10, true).is_none());
        assert!(errors.text("code", Some("x".repeat(11)), 1, 10, false).is_none());
        assert_eq!(errors.errors().len(), 2);
        assert!(errors.has("name"));
        assert!(errors.has("code"));
    }

    #[test]
    fn optional_text_may_be_absent() {
        let mut errors = ValidationErrors::new();
        assert!(errors.text("description", None, 0, 10, false).is_none());
        assert!(errors.is_empty());
    }

    #[test]
    fn dates_accept_plain_and_rfc3339() {
        let mut errors = ValidationErrors::new();
        assert_eq!(
            errors.date("startDate", Some("2025-01-01"), true),
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
        assert_eq!(
            errors.date("startDate", Some("2025-01-01T10:00:00Z"), true),
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
        assert!(errors.is_empty());
        assert!(errors.date("endDate", Some("01/02/2025"), true).is_none());
        assert!(errors.has("endDate"));
    }

    #[test]
    fn latitude_out_of_range() {
        let mut errors = ValidationErrors::new();
        assert!(errors.geolocation(Some(91.0), Some(10.0)).is_none());
        assert!(errors.has("latitude"));
        assert!(!errors.has("longitude"));
    }

    #[test]
    fn geolocation_requires_both_coordinates() {
        let mut errors = ValidationErrors::new();
        assert!(errors.geolocation(Some(45.0), None).is_none());
        assert!(errors.has("longitude"));
    }

    #[test]
    fn geolocation_boundaries_inclusive() {
        let mut errors = ValidationErrors::new();
        assert_eq!(errors.geolocation(Some(-90.0), Some(180.0)), Some((-90.0, 180.0)));
        assert!(errors.is_empty());
    }

    #[test]
    fn finish_reports_all_errors() {
        let mut errors = ValidationErrors::new();
        errors.required::<u8>("a", None);
        errors.uuid("b", Some("not-a-uuid"), true);
        let err = errors.finish(()).unwrap_err();
        assert_eq!(err.errors().len(), 2);
    }
}
