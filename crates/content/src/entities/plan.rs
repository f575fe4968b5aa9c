//! Yearly plan entity definitions.
//!
//! The list-valued fields (`activities`, `scriptures`, `goals`) are ordered
//! sequences in the domain type; they only become JSON at the store
//! boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One month of the fellowship's yearly programme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearPlan {
    pub id: i64,
    pub year: i32,
    pub month: u32,
    pub theme: String,
    #[serde(default)]
    pub theme_scripture: Option<String>,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub scriptures: Vec<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub excel_url: Option<String>,
    #[serde(default)]
    pub created_by: Option<Uuid>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePlanRequest {
    pub year: i32,
    pub month: u32,
    pub theme: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_scripture: Option<String>,
    pub activities: Vec<String>,
    pub scriptures: Vec<String>,
    pub goals: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CreatePlanRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.theme.trim().is_empty() {
            return Err("theme is required".to_string());
        }
        if !(1..=12).contains(&self.month) {
            return Err(format!("month must be 1-12, got {}", self.month));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdatePlanRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_scripture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scriptures: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excel_url: Option<String>,
}

/// Which document slot on a plan an upload fills, keyed off the file
/// extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanDocumentKind {
    Pdf,
    Excel,
}

impl PlanDocumentKind {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(PlanDocumentKind::Pdf),
            "xls" | "xlsx" => Some(PlanDocumentKind::Excel),
            _ => None,
        }
    }
}
