use chrono::{DateTime, Utc};
use serde_json::Value;

use super::ValidationErrors;
use crate::config::EvidenceConfig;

pub const MAX_ANNOTATIONS: usize = 100;

/// Multipart fields accompanying an evidence file, before validation
#[derive(Debug, Clone, Default)]
pub struct EvidenceUpload {
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub size_bytes: u64,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub accuracy: Option<String>,
    pub captured_at: Option<String>,
    pub annotations: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEvidence {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub captured_at: Option<DateTime<Utc>>,
    pub annotations: Value,
}

impl EvidenceUpload {
    /// `existing_bytes` is what the inspection already holds; the upload must
    /// fit under the per-inspection ceiling together with it.
    pub fn validate(self, config: &EvidenceConfig, existing_bytes: u64) -> Result<ValidatedEvidence, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let file_name = errors
            .text("file", self.file_name, 1, 255, true)
            .map(|name| sanitize_file_name(&name));

        let mime_type = match self.mime_type.as_deref().map(normalize_mime) {
            Some(mime) if config.allowed_mime_types.iter().any(|m| *m == mime) => Some(mime),
            Some(mime) => {
                errors.add(
                    "file",
                    format!("File type '{}' is not allowed; accepted types: {}", mime, config.allowed_mime_types.join(", ")),
                );
                None
            }
            None => {
                errors.add("file", "File type could not be determined");
                None
            }
        };

        if self.size_bytes == 0 {
            errors.add("file", "File is empty");
        } else if self.size_bytes > config.max_file_bytes {
            errors.add(
                "file",
                format!("File exceeds the maximum size of {} MB", config.max_file_bytes / (1024 * 1024)),
            );
        } else if existing_bytes.saturating_add(self.size_bytes) > config.max_inspection_bytes {
            errors.add(
                "file",
                format!(
                    "Inspection evidence would exceed the {} MB total limit",
                    config.max_inspection_bytes / (1024 * 1024)
                ),
            );
        }

        let latitude = number(&mut errors, "latitude", self.latitude.as_deref());
        let longitude = number(&mut errors, "longitude", self.longitude.as_deref());
        let location = errors.geolocation(latitude, longitude);
        let accuracy = number(&mut errors, "accuracy", self.accuracy.as_deref());
        let accuracy = errors.non_negative("accuracy", accuracy);
        let captured_at = errors.timestamp("capturedAt", self.captured_at.as_deref());
        let annotations = annotations(&mut errors, self.annotations.as_deref());

        match (file_name, mime_type) {
            (Some(file_name), Some(mime_type)) => errors.finish(ValidatedEvidence {
                file_name,
                mime_type,
                size_bytes: self.size_bytes,
                latitude: location.map(|l| l.0),
                longitude: location.map(|l| l.1),
                accuracy,
                captured_at,
                annotations,
            }),
            _ => Err(errors),
        }
    }
}

/// Lowercase and drop parameters (`image/JPEG; charset=x` -> `image/jpeg`)
pub fn normalize_mime(raw: &str) -> String {
    raw.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}

/// Keep the final path component and replace anything outside `[A-Za-z0-9._-]`
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

fn number(errors: &mut ValidationErrors, field: &str, raw: Option<&str>) -> Option<f64> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty())?;
    match raw.parse::<f64>() {
        Ok(v) => Some(v),
        Err(_) => {
            errors.add(field, format!("{} must be a number", field));
            None
        }
    }
}

fn annotations(errors: &mut ValidationErrors, raw: Option<&str>) -> Value {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Value::Array(vec![]);
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) if items.len() <= MAX_ANNOTATIONS => Value::Array(items),
        Ok(Value::Array(_)) => {
            errors.add("annotations", format!("at most {} annotations are allowed", MAX_ANNOTATIONS));
            Value::Array(vec![])
        }
        _ => {
            errors.add("annotations", "annotations must be a JSON array");
            Value::Array(vec![])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, GIB, MIB};

    fn upload(mime: &str, size: u64) -> EvidenceUpload {
        EvidenceUpload {
            file_name: Some("crack.jpg".into()),
            mime_type: Some(mime.into()),
            size_bytes: size,
            ..Default::default()
        }
    }

    fn config() -> EvidenceConfig {
        AppConfig::development().evidence
    }

    #[test]
    fn image_within_limits_accepted() {
        let evidence = upload("image/JPEG", 3 * MIB).validate(&config(), 0).unwrap();
        assert_eq!(evidence.mime_type, "image/jpeg");
        assert_eq!(evidence.annotations, Value::Array(vec![]));
    }

    #[test]
    fn exactly_fifty_mib_accepted() {
        assert!(upload("video/mp4", 50 * MIB).validate(&config(), 0).is_ok());
    }

    #[test]
    fn over_fifty_mib_rejected() {
        let errors = upload("video/mp4", 50 * MIB + 1).validate(&config(), 0).unwrap_err();
        assert!(errors.errors()[0].message.contains("maximum size"));
    }

    #[test]
    fn disallowed_mime_rejected() {
        let errors = upload("application/pdf", MIB).validate(&config(), 0).unwrap_err();
        assert!(errors.has("file"));
        let errors = upload("image/svg+xml", MIB).validate(&config(), 0).unwrap_err();
        assert!(errors.has("file"));
    }

    #[test]
    fn cumulative_limit_enforced() {
        let errors = upload("image/png", 10 * MIB).validate(&config(), GIB - 5 * MIB).unwrap_err();
        assert!(errors.errors()[0].message.contains("total limit"));
        assert!(upload("image/png", 5 * MIB).validate(&config(), GIB - 5 * MIB).is_ok());
    }

    #[test]
    fn empty_file_rejected() {
        assert!(upload("image/png", 0).validate(&config(), 0).is_err());
    }

    #[test]
    fn geolocation_fields_parsed() {
        let mut up = upload("image/png", MIB);
        up.latitude = Some("-33.86".into());
        up.longitude = Some("151.21".into());
        up.accuracy = Some("4.5".into());
        up.captured_at = Some("2025-03-01T08:30:00Z".into());
        up.annotations = Some(r#"[{"x": 10, "y": 20, "text": "spalling"}]"#.into());
        let evidence = up.validate(&config(), 0).unwrap();
        assert_eq!(evidence.latitude, Some(-33.86));
        assert_eq!(evidence.accuracy, Some(4.5));
        assert!(evidence.captured_at.is_some());
        assert_eq!(evidence.annotations.as_array().unwrap().len(), 1);
    }

    #[test]
    fn bad_coordinates_and_annotations_reported() {
        let mut up = upload("image/png", MIB);
        up.latitude = Some("north".into());
        up.longitude = Some("200".into());
        up.annotations = Some("{}".into());
        let errors = up.validate(&config(), 0).unwrap_err();
        assert!(errors.has("latitude"));
        assert!(errors.has("annotations"));
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\photos\\deck 1.jpg"), "deck_1.jpg");
        assert_eq!(sanitize_file_name(".."), "upload");
    }
}
