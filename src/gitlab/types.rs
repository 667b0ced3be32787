// GitLab API response types.
// Read-only projections of the entities the browser displays or keys on.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// GitLab group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
}

/// GitLab project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
}

/// Repository branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    #[serde(default)]
    pub default: bool,
}

/// CI/CD pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: u64,
    pub status: Status,
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub source: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// CI/CD job within a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub stage: String,
    pub status: Status,
    pub duration: Option<f64>,
}

/// Pipeline and job status, shared by both resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Created,
    WaitingForResource,
    Preparing,
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
    Skipped,
    Manual,
    Scheduled,
    #[serde(other)]
    Unknown,
}

impl Status {
    /// The status name as GitLab spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Created => "created",
            Status::WaitingForResource => "waiting_for_resource",
            Status::Preparing => "preparing",
            Status::Pending => "pending",
            Status::Running => "running",
            Status::Success => "success",
            Status::Failed => "failed",
            Status::Canceled => "canceled",
            Status::Skipped => "skipped",
            Status::Manual => "manual",
            Status::Scheduled => "scheduled",
            Status::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_pipeline() {
        let json = r#"{
            "id": 1001,
            "iid": 7,
            "project_id": 42,
            "status": "waiting_for_resource",
            "ref": "main",
            "sha": "abc123",
            "source": "push",
            "updated_at": "2024-03-01T10:15:00.000Z",
            "web_url": "https://gitlab.com/x/y/-/pipelines/1001"
        }"#;
        let pipeline: Pipeline = serde_json::from_str(json).unwrap();
        assert_eq!(pipeline.id, 1001);
        assert_eq!(pipeline.ref_name, "main");
        assert_eq!(pipeline.status, Status::WaitingForResource);
        assert!(pipeline.updated_at.is_some());
    }

    #[test]
    fn test_unknown_status_does_not_fail() {
        let json = r#"{"id": 99, "name": "lint", "status": "brand_new_state"}"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert_eq!(job.status, Status::Unknown);
        assert_eq!(job.stage, "");
        assert!(job.duration.is_none());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Failed.to_string(), "failed");
        assert_eq!(Status::WaitingForResource.to_string(), "waiting_for_resource");
    }
}
