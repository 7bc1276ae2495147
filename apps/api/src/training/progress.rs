//! Server-side progress persistence against `user_progress` and
//! `learning_modules`.

use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::module::{LearningModule, LearningModuleRow, ModuleStatus};
use crate::models::progress::{ApplicationStatus, ProgressDetail, UserProgressRow};

/// Whether every module ends up completed once the update at
/// `updated_index` is applied: the just-written value substituted at the
/// target index, stored status everywhere else.
pub fn all_modules_completed(
    statuses: &[ModuleStatus],
    updated_index: usize,
    is_completed: bool,
) -> bool {
    !statuses.is_empty()
        && statuses.iter().enumerate().all(|(idx, status)| {
            if idx == updated_index {
                is_completed
            } else {
                status.is_completed()
            }
        })
}

/// What a progress update did beyond the module write itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub all_completed: bool,
    /// True when this update flipped the overall status to
    /// `training_completed`.
    pub status_transitioned: bool,
}

/// Applies `updateProgress(applicationId, moduleIndex, isCompleted)`.
///
/// Loads the application's progress record and ordered module list,
/// updates the targeted module's status, and — when that leaves every
/// module completed — moves the overall status forward to
/// `training_completed`. The overall status is monotonic: it is only
/// ever set forward, never regressed, so resetting a single module on a
/// finished application leaves the aggregate flag alone.
///
/// The module write and the status write are two sequential statements
/// without a wrapping transaction; a crash between them leaves the
/// module updated but the aggregate status stale until the next update.
pub async fn apply_progress_update(
    db: &PgPool,
    application_id: &str,
    module_index: usize,
    is_completed: bool,
) -> Result<UpdateOutcome, AppError> {
    let progress: UserProgressRow =
        sqlx::query_as("SELECT * FROM user_progress WHERE application_id = $1")
            .bind(application_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Progress not found".to_string()))?;

    let modules: Vec<LearningModuleRow> = sqlx::query_as(
        "SELECT * FROM learning_modules WHERE application_id = $1 ORDER BY created_at ASC",
    )
    .bind(application_id)
    .fetch_all(db)
    .await?;

    if modules.is_empty() {
        return Err(AppError::NotFound("Modules not found".to_string()));
    }

    let target = modules
        .get(module_index)
        .ok_or_else(|| AppError::NotFound("Module not found at index".to_string()))?;

    let new_status = if is_completed {
        ModuleStatus::Completed
    } else {
        ModuleStatus::Pending
    };

    sqlx::query("UPDATE learning_modules SET status = $1 WHERE id = $2")
        .bind(new_status.as_str())
        .bind(target.id)
        .execute(db)
        .await?;

    let statuses: Vec<ModuleStatus> = modules
        .iter()
        .map(|m| ModuleStatus::from_db(&m.status))
        .collect();
    let all_completed = all_modules_completed(&statuses, module_index, is_completed);

    let current_status = ApplicationStatus::from_db(&progress.status);
    let mut status_transitioned = false;

    if all_completed && current_status != ApplicationStatus::TrainingCompleted {
        sqlx::query(
            "UPDATE user_progress SET status = $1, updated_at = NOW() WHERE application_id = $2",
        )
        .bind(ApplicationStatus::TrainingCompleted.as_str())
        .bind(application_id)
        .execute(db)
        .await?;
        status_transitioned = true;
    }

    Ok(UpdateOutcome {
        all_completed,
        status_transitioned,
    })
}

/// Loads the full progress record merged with its ordered module list.
/// Returns `None` when no record exists yet (a brand-new applicant).
pub async fn fetch_progress(
    db: &PgPool,
    application_id: &str,
) -> Result<Option<ProgressDetail>, AppError> {
    let progress: Option<UserProgressRow> =
        sqlx::query_as("SELECT * FROM user_progress WHERE application_id = $1")
            .bind(application_id)
            .fetch_optional(db)
            .await?;

    let Some(progress) = progress else {
        return Ok(None);
    };

    let rows: Vec<LearningModuleRow> = sqlx::query_as(
        "SELECT * FROM learning_modules WHERE application_id = $1 ORDER BY created_at ASC",
    )
    .bind(application_id)
    .fetch_all(db)
    .await?;

    let training_modules = modules_from_rows(rows)?;

    Ok(Some(ProgressDetail {
        application_id: progress.application_id,
        status: ApplicationStatus::from_db(&progress.status),
        interview_transcript: progress.interview_transcript,
        created_at: progress.created_at,
        updated_at: progress.updated_at,
        training_modules,
    }))
}

/// Converts stored rows into wire modules, preserving the `created_at`
/// ordering. A row whose jsonb no longer parses fails the whole load:
/// module indexes are positional across every endpoint, and dropping a
/// row here would silently shift them relative to the unfiltered list
/// `apply_progress_update` writes against.
fn modules_from_rows(rows: Vec<LearningModuleRow>) -> Result<Vec<LearningModule>, AppError> {
    rows.into_iter()
        .map(|row| {
            let id = row.id;
            row.into_module().map_err(|e| {
                AppError::Internal(anyhow::anyhow!(
                    "learning_modules row {id} has malformed content/quiz: {e}"
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    use ModuleStatus::{Completed, Pending};

    fn row(title: &str, quiz: serde_json::Value) -> LearningModuleRow {
        LearningModuleRow {
            id: Uuid::new_v4(),
            application_id: "app-1".to_string(),
            icon: "Target".to_string(),
            title: title.to_string(),
            description: "d".to_string(),
            content: json!(["**Punkt:** etwas"]),
            quiz,
            status: "pending".to_string(),
            created_at: Utc::now(),
        }
    }

    fn quiz_json(question: &str) -> serde_json::Value {
        json!({
            "question": question,
            "answers": [
                {"text": "richtig", "isCorrect": true},
                {"text": "falsch", "isCorrect": false}
            ]
        })
    }

    #[test]
    fn test_all_completed_substitutes_updated_index() {
        // Stored state says pending at index 2, but this update completes it
        let statuses = [Completed, Completed, Pending];
        assert!(all_modules_completed(&statuses, 2, true));
    }

    #[test]
    fn test_not_all_completed_with_other_pending() {
        let statuses = [Completed, Pending, Pending];
        assert!(!all_modules_completed(&statuses, 2, true));
    }

    #[test]
    fn test_uncompleting_a_module_breaks_all_completed() {
        let statuses = [Completed, Completed, Completed];
        assert!(!all_modules_completed(&statuses, 1, false));
    }

    #[test]
    fn test_empty_module_list_is_never_complete() {
        assert!(!all_modules_completed(&[], 0, true));
    }

    #[test]
    fn test_single_module() {
        assert!(all_modules_completed(&[Pending], 0, true));
        assert!(!all_modules_completed(&[Pending], 0, false));
    }

    #[test]
    fn test_rows_convert_in_order() {
        let rows = vec![row("erstes", quiz_json("F1?")), row("zweites", quiz_json("F2?"))];
        let modules = modules_from_rows(rows).unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].title, "erstes");
        assert_eq!(modules[1].title, "zweites");
    }

    #[test]
    fn test_malformed_row_fails_the_whole_load() {
        // A corrupt stored quiz must not be skipped: skipping would shift
        // positional indexes against the list the update path writes to.
        let rows = vec![row("ok", quiz_json("F1?")), row("kaputt", json!("not a quiz"))];
        let err = modules_from_rows(rows).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
