//! Voice-agent identity resolution and signed conversation URLs.
//!
//! Each interview flow talks to a dedicated ElevenLabs conversational
//! agent. Agent ids live in environment variables; every key maps to an
//! ordered candidate list (historical aliases included) and the first
//! present variable wins.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;

const SIGNED_URL_ENDPOINT: &str = "https://api.elevenlabs.io/v1/convai/conversation/get_signed_url";

/// Closed set of voice-agent identities. Unknown query values resolve
/// to `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKey {
    Distribution,
    Finance,
    Impact,
    Marketing,
    PharmacyBVitamins,
    PharmacyMagnesium,
    PharmacyPerenterol,
    Pharmacy,
    Default,
}

impl AgentKey {
    pub fn from_query(key: Option<&str>) -> Self {
        match key {
            Some("distribution") => AgentKey::Distribution,
            Some("finance") => AgentKey::Finance,
            Some("impact") => AgentKey::Impact,
            Some("marketing") => AgentKey::Marketing,
            Some("pharmacy_b_vitamins") => AgentKey::PharmacyBVitamins,
            Some("pharmacy_magnesium") => AgentKey::PharmacyMagnesium,
            Some("pharmacy_perenterol") => AgentKey::PharmacyPerenterol,
            Some("pharmacy") => AgentKey::Pharmacy,
            _ => AgentKey::Default,
        }
    }

    /// Candidate environment variable names, checked in order.
    /// DISTRUBITION_AGENT_ID is a long-lived deployment typo kept as an
    /// alias so existing environments keep working.
    pub fn candidate_env_vars(&self) -> &'static [&'static str] {
        match self {
            AgentKey::Distribution => &[
                "DISTRIBUTION_AGENT_ID",
                "DISTRUBITION_AGENT_ID",
                "distribution_agent_id",
                "distrubition_agent_id",
            ],
            AgentKey::Finance => &["FINANCE_AGENT_ID", "finance_agent_id"],
            AgentKey::Impact => &["IMPACT_AGENT_ID", "impact_agent_id"],
            AgentKey::Marketing => &["MARKETING_AGENT_ID", "marketing_agent_id"],
            AgentKey::PharmacyBVitamins => &[
                "PHARMACY_B_VITAMINS_AGENT_ID",
                "pharmacy_b_vitamins_agent_id",
                "B_VITAMINS_AGENT_ID",
            ],
            AgentKey::PharmacyMagnesium => &[
                "PHARMACY_MAGNESIUM_AGENT_ID",
                "pharmacy_magnesium_agent_id",
                "MAGNESIUM_AGENT_ID",
            ],
            AgentKey::PharmacyPerenterol => &[
                "PHARMACY_PERENTEROL_AGENT_ID",
                "pharmacy_perenterol_agent_id",
                "PERENTEROL_AGENT_ID",
            ],
            AgentKey::Pharmacy => &["PHARMACY_AGENT_ID", "pharmacy_agent_id"],
            AgentKey::Default => &["AGENT_ID", "agent_id"],
        }
    }

    /// First candidate variable present in `lookup`, with its value.
    pub fn resolve_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<(&'static str, String)> {
        self.candidate_env_vars()
            .iter()
            .find_map(|var| lookup(var).filter(|v| !v.is_empty()).map(|v| (*var, v)))
    }

    pub fn resolve_from_env(&self) -> Option<(&'static str, String)> {
        self.resolve_with(|var| std::env::var(var).ok())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlQuery {
    pub agent_key: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlResponse {
    pub signed_url: String,
}

#[derive(Debug, Deserialize)]
struct ElevenLabsSignedUrl {
    signed_url: String,
}

/// GET /api/v1/signed-url?agentKey=...
///
/// Resolves the agent identity and exchanges it for a signed
/// conversation URL.
pub async fn handle_signed_url(
    State(state): State<AppState>,
    Query(params): Query<SignedUrlQuery>,
) -> Result<Json<SignedUrlResponse>, AppError> {
    let agent_key = AgentKey::from_query(params.agent_key.as_deref());

    let (var, agent_id) = agent_key.resolve_from_env().ok_or_else(|| {
        AppError::VoiceAgent(format!(
            "No agent id configured for {:?} (checked: {})",
            agent_key,
            agent_key.candidate_env_vars().join(", ")
        ))
    })?;

    let signed_url = get_signed_url(&state.http, &state.config.elevenlabs_api_key, &agent_id)
        .await
        .map_err(|e| AppError::VoiceAgent(e.to_string()))?;

    info!("Signed URL generated for {:?} (via {var})", agent_key);

    Ok(Json(SignedUrlResponse { signed_url }))
}

async fn get_signed_url(
    http: &reqwest::Client,
    api_key: &str,
    agent_id: &str,
) -> Result<String, reqwest::Error> {
    let response = http
        .get(SIGNED_URL_ENDPOINT)
        .query(&[("agent_id", agent_id)])
        .header("xi-api-key", api_key)
        .send()
        .await?
        .error_for_status()?;

    let body: ElevenLabsSignedUrl = response.json().await?;
    Ok(body.signed_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_key_resolves_to_default() {
        assert_eq!(AgentKey::from_query(None), AgentKey::Default);
        assert_eq!(AgentKey::from_query(Some("bogus")), AgentKey::Default);
        assert_eq!(
            AgentKey::Default.candidate_env_vars(),
            &["AGENT_ID", "agent_id"]
        );
    }

    #[test]
    fn test_distribution_typo_alias_wins_when_primary_missing() {
        let key = AgentKey::from_query(Some("distribution"));
        let (var, id) = key
            .resolve_with(|name| {
                (name == "DISTRUBITION_AGENT_ID").then(|| "agent-123".to_string())
            })
            .unwrap();
        assert_eq!(var, "DISTRUBITION_AGENT_ID");
        assert_eq!(id, "agent-123");
    }

    #[test]
    fn test_primary_var_preferred_over_alias() {
        let key = AgentKey::PharmacyMagnesium;
        let (var, _) = key
            .resolve_with(|name| match name {
                "PHARMACY_MAGNESIUM_AGENT_ID" => Some("primary".to_string()),
                "MAGNESIUM_AGENT_ID" => Some("alias".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(var, "PHARMACY_MAGNESIUM_AGENT_ID");
    }

    #[test]
    fn test_empty_value_is_treated_as_missing() {
        let key = AgentKey::Finance;
        assert!(key.resolve_with(|_| Some(String::new())).is_none());
    }
}
