use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::GeminiClient;
use crate::training::generator::ModuleGenerator;
use crate::training::quiz::CompletionPolicy;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: GeminiClient,
    /// Plain HTTP client for the voice-agent (signed URL) calls.
    pub http: reqwest::Client,
    pub config: Config,
    /// Pluggable module generator. Default: LlmModuleGenerator.
    pub module_generator: Arc<dyn ModuleGenerator>,
    /// When a quiz answer locks its module. The persisted flow locks
    /// only on a correct answer.
    pub completion_policy: CompletionPolicy,
}
