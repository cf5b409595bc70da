use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub id: Uuid,
    pub inspection_id: Uuid,
    pub uploaded_by: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub checksum: String,
    pub storage_path: String,
    pub url: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub captured_at: Option<DateTime<Utc>>,
    pub annotations: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEvidence {
    pub id: Uuid,
    pub inspection_id: Uuid,
    pub uploaded_by: Uuid,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub checksum: String,
    pub storage_path: String,
    pub url: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub captured_at: Option<DateTime<Utc>>,
    pub annotations: Value,
}
