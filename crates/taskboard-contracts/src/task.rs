// Task DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A to-do record with lifecycle status.
///
/// `description` and `status` are nullable: a full-overwrite update may
/// clear either one. Both keys are always present in the serialized form
/// so clients see the whole row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a new task
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    /// Required and non-empty; anything else is rejected with 400.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Defaults to an empty string when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Defaults to "pending" when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Request to update a task.
///
/// Every mutable column is overwritten with exactly the supplied value.
/// An omitted field is written as NULL, not left alone; a caller that
/// wants to keep a field must send it back.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_fields_all_default_to_none() {
        let req: CreateTaskRequest = serde_json::from_str("{}").unwrap();
        assert!(req.title.is_none());
        assert!(req.description.is_none());
        assert!(req.status.is_none());
    }

    #[test]
    fn task_serializes_null_fields_explicitly() {
        let task = Task {
            id: 1,
            title: "Buy milk".to_string(),
            description: None,
            status: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json: serde_json::Value = serde_json::to_value(&task).unwrap();
        assert!(json["description"].is_null());
        assert!(json["status"].is_null());
        assert_eq!(json["title"], "Buy milk");
    }
}
