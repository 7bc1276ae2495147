use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::module::LearningModule;

/// Aggregate status of one application/trainee record.
///
/// `TrainingCompleted` is terminal for the training flow: the progress
/// endpoint only ever moves the status forward, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    New,
    InProgress,
    TrainingCompleted,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::New => "new",
            ApplicationStatus::InProgress => "in_progress",
            ApplicationStatus::TrainingCompleted => "training_completed",
        }
    }

    pub fn from_db(s: &str) -> Self {
        match s {
            "in_progress" => ApplicationStatus::InProgress,
            "training_completed" => ApplicationStatus::TrainingCompleted,
            _ => ApplicationStatus::New,
        }
    }
}

/// Database row for `user_progress`, one per application.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserProgressRow {
    pub application_id: String,
    pub status: String,
    pub interview_transcript: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full progress record returned by GET /api/v1/progress: the
/// `user_progress` row merged with its ordered module list.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressDetail {
    pub application_id: String,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_transcript: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub training_modules: Vec<LearningModule>,
}
