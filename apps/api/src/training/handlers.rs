//! Axum route handlers for the training progress and coaching API.

use axum::{extract::Query, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{ChatMessage, ChatRole, GenerationConfig};
use crate::models::module::LearningModule;
use crate::models::progress::ApplicationStatus;
use crate::state::AppState;
use crate::training::progress::{apply_progress_update, fetch_progress};
use crate::training::prompts::{
    analysis_kickoff_message, flatten_transcript, TranscriptMessage, COACH_FEEDBACK_SYSTEM,
};
use crate::training::quiz::{QuizResult, SelectionError, TrainingSession};
use crate::training::store;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressRequest {
    pub application_id: Option<String>,
    pub module_index: Option<i64>,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressQuery {
    pub application_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub application_id: String,
    pub module_index: usize,
    pub answer_index: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub is_correct: bool,
    pub correct_answer: Option<String>,
    pub module_completed: bool,
    pub percent_complete: f64,
    pub all_complete: bool,
    pub training_completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeTranscriptRequest {
    pub transcript: Vec<TranscriptMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    pub results: Vec<QuizResult>,
}

#[derive(Debug, Serialize)]
pub struct CoachResponse {
    pub reply: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/progress
///
/// Updates one module's completion status and, once every module is
/// completed, flips the application's overall status forward to
/// `training_completed`.
pub async fn handle_update_progress(
    State(state): State<AppState>,
    Json(request): Json<UpdateProgressRequest>,
) -> Result<Json<Value>, AppError> {
    let (application_id, module_index) =
        validate_update_request(request.application_id.as_deref(), request.module_index)?;

    apply_progress_update(&state.db, application_id, module_index, request.is_completed).await?;

    Ok(Json(json!({ "success": true })))
}

/// Field validation for the progress update.
///
/// An absent applicationId or moduleIndex is a 400; a present but
/// negative moduleIndex can never address a module, so it takes the
/// same not-found path as an index past the end of the list.
fn validate_update_request(
    application_id: Option<&str>,
    module_index: Option<i64>,
) -> Result<(&str, usize), AppError> {
    let application_id = application_id.filter(|id| !id.is_empty());

    match (application_id, module_index) {
        (Some(id), Some(idx)) if idx >= 0 => Ok((id, idx as usize)),
        (Some(_), Some(_)) => Err(AppError::NotFound("Module not found at index".to_string())),
        _ => Err(AppError::Validation("Missing required fields".to_string())),
    }
}

/// GET /api/v1/progress?applicationId=...
///
/// Returns `{"status": "new"}` for unknown applications, otherwise the
/// full progress record merged with its ordered module list.
pub async fn handle_get_progress(
    State(state): State<AppState>,
    Query(params): Query<ProgressQuery>,
) -> Result<Json<Value>, AppError> {
    let application_id = params
        .application_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("Missing applicationId".to_string()))?;

    match fetch_progress(&state.db, application_id).await? {
        None => Ok(Json(json!({ "status": "new" }))),
        Some(detail) => {
            let value = serde_json::to_value(detail).map_err(anyhow::Error::from)?;
            Ok(Json(value))
        }
    }
}

/// POST /api/v1/progress/answer
///
/// Records a quiz answer for a module. The stored module set is loaded
/// into a `TrainingSession`, the selection is evaluated under the
/// configured completion policy, and a completing answer is persisted
/// through the same path as the plain progress update.
pub async fn handle_select_answer(
    State(state): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    if request.application_id.is_empty() {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }

    let detail = fetch_progress(&state.db, &request.application_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Progress not found".to_string()))?;

    if detail.training_modules.is_empty() {
        return Err(AppError::NotFound("Modules not found".to_string()));
    }

    let mut training_completed = detail.status == ApplicationStatus::TrainingCompleted;

    let mut session = TrainingSession::new(detail.training_modules, state.completion_policy);
    let outcome = session
        .select_answer(request.module_index, request.answer_index)
        .map_err(|e| match e {
            SelectionError::ModuleOutOfRange => {
                AppError::NotFound("Module not found at index".to_string())
            }
            SelectionError::AnswerOutOfRange => {
                AppError::Validation("Answer index out of range".to_string())
            }
        })?;

    if outcome.changed && outcome.module_completed {
        let update = apply_progress_update(
            &state.db,
            &request.application_id,
            request.module_index,
            true,
        )
        .await?;
        training_completed = training_completed || update.status_transitioned;
    }

    let correct_answer = session.modules()[request.module_index]
        .quiz
        .correct_answer()
        .map(|a| a.text.clone());

    Ok(Json(AnswerResponse {
        is_correct: outcome.is_correct,
        correct_answer,
        module_completed: outcome.module_completed,
        percent_complete: session.percent_complete(),
        all_complete: session.all_complete(),
        training_completed,
    }))
}

/// POST /api/v1/transcript/analyze
///
/// Turns an interview transcript into personalized learning modules.
/// Every failure mode — empty transcript, missing API key, upstream
/// error, malformed output — degrades to the fallback module set with a
/// 200, never a hard error.
pub async fn handle_analyze_transcript(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeTranscriptRequest>,
) -> Json<Vec<LearningModule>> {
    if request.transcript.is_empty() {
        info!("No transcript received, using fallback modules");
        return Json(store::fallback_modules());
    }

    let transcript_text = flatten_transcript(&request.transcript);

    let modules = match state.module_generator.generate(&transcript_text).await {
        Ok(payload) => store::load_or_fallback(Some(&payload)),
        Err(e) => {
            warn!("Transcript analysis failed ({e}), using fallback modules");
            store::fallback_modules()
        }
    };

    Json(modules)
}

/// POST /api/v1/coach/chat
///
/// Forwards a coaching conversation to the LLM under the coach persona.
pub async fn handle_coach_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<CoachResponse>, AppError> {
    if request.history.is_empty() {
        return Err(AppError::Validation("history cannot be empty".to_string()));
    }

    let config = GenerationConfig {
        temperature: Some(0.7),
        max_output_tokens: Some(500),
        ..Default::default()
    };

    let reply = state
        .llm
        .generate(&request.history, COACH_FEEDBACK_SYSTEM, Some(&config))
        .await?;

    Ok(Json(CoachResponse { reply }))
}

/// POST /api/v1/coach/analysis
///
/// One-shot performance analysis over the collected quiz results, fired
/// by the client when the session transitions into all-complete.
pub async fn handle_coach_analysis(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<CoachResponse>, AppError> {
    if request.results.is_empty() {
        return Err(AppError::Validation("results cannot be empty".to_string()));
    }

    let history = [ChatMessage {
        role: ChatRole::User,
        text: analysis_kickoff_message(&request.results),
    }];

    let config = GenerationConfig {
        temperature: Some(0.7),
        max_output_tokens: Some(500),
        ..Default::default()
    };

    let reply = state
        .llm
        .generate(&history, COACH_FEEDBACK_SYSTEM, Some(&config))
        .await?;

    Ok(Json(CoachResponse { reply }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_missing_fields_rejected() {
        assert!(matches!(
            validate_update_request(None, Some(0)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_update_request(Some(""), Some(0)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_update_request(Some("app-1"), None),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_update_request_negative_index_is_not_found() {
        let err = validate_update_request(Some("app-1"), Some(-1)).unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Module not found at index"));
    }

    #[test]
    fn test_update_request_accepts_valid_fields() {
        assert_eq!(
            validate_update_request(Some("app-1"), Some(2)).unwrap(),
            ("app-1", 2)
        );
    }
}
