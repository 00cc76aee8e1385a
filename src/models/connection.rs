// file: src/models/connection.rs
// description: customer connection model and create/update payloads
// reference: internal data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maps a customer identity to the knowledge bases its retrieval queries may use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: i64,
    pub name: String,
    pub customer_id: String,
    #[serde(default)]
    pub knowledge_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateConnection {
    pub name: String,
    pub customer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateConnection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub customer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_ids: Option<Vec<String>>,
}
