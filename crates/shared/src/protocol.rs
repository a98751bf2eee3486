use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{ChatRole, PageRef};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    pub chat_history: Vec<HistoryEntry>,
}

/// A retrieved passage returned alongside an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub page: PageRef,
    #[serde(rename = "content")]
    pub excerpt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Citation {
    pub fn new(page: impl Into<PageRef>, excerpt: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            excerpt: excerpt.into(),
            score: None,
            metadata: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Citation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub filename: String,
    pub upload_date: String,
    pub chunks_count: u64,
    pub status: String,
}

impl DocumentInfo {
    /// Parses `upload_date`, accepting both offset-qualified and naive ISO timestamps.
    /// Offset timestamps are normalised to UTC.
    pub fn uploaded_at(&self) -> Option<NaiveDateTime> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&self.upload_date) {
            return Some(parsed.naive_utc());
        }
        self.upload_date.parse::<NaiveDateTime>().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentsResponse {
    pub documents: Vec<DocumentInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub chunks_count: u64,
    #[serde(default)]
    pub processing_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkInfo {
    pub id: String,
    pub content: String,
    pub page: PageRef,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunksResponse {
    pub chunks: Vec<ChunkInfo>,
    pub total_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub message: String,
}
