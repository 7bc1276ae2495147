use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of icon identifiers a module may carry.
///
/// The module generator is prompted to emit one of these names, but its
/// output is untrusted: unknown names resolve to `Sparkles` instead of
/// failing the whole payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModuleIcon {
    Zap,
    Pill,
    Brain,
    Activity,
    Baby,
    Sun,
    ShieldCheck,
    Users,
    Target,
    Heart,
    Shield,
    AlertTriangle,
    Plane,
    Sparkles,
}

impl ModuleIcon {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Zap" => ModuleIcon::Zap,
            "Pill" => ModuleIcon::Pill,
            "Brain" => ModuleIcon::Brain,
            "Activity" => ModuleIcon::Activity,
            "Baby" => ModuleIcon::Baby,
            "Sun" => ModuleIcon::Sun,
            "ShieldCheck" => ModuleIcon::ShieldCheck,
            "Users" => ModuleIcon::Users,
            "Target" => ModuleIcon::Target,
            "Heart" => ModuleIcon::Heart,
            "Shield" => ModuleIcon::Shield,
            "AlertTriangle" => ModuleIcon::AlertTriangle,
            "Plane" => ModuleIcon::Plane,
            _ => ModuleIcon::Sparkles,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModuleIcon::Zap => "Zap",
            ModuleIcon::Pill => "Pill",
            ModuleIcon::Brain => "Brain",
            ModuleIcon::Activity => "Activity",
            ModuleIcon::Baby => "Baby",
            ModuleIcon::Sun => "Sun",
            ModuleIcon::ShieldCheck => "ShieldCheck",
            ModuleIcon::Users => "Users",
            ModuleIcon::Target => "Target",
            ModuleIcon::Heart => "Heart",
            ModuleIcon::Shield => "Shield",
            ModuleIcon::AlertTriangle => "AlertTriangle",
            ModuleIcon::Plane => "Plane",
            ModuleIcon::Sparkles => "Sparkles",
        }
    }
}

impl From<String> for ModuleIcon {
    fn from(s: String) -> Self {
        ModuleIcon::from_name(&s)
    }
}

impl From<ModuleIcon> for String {
    fn from(icon: ModuleIcon) -> Self {
        icon.name().to_string()
    }
}

/// Per-module completion state. Never transitions back from `Completed`
/// through the quiz flow; only an explicit `isCompleted: false` update
/// on the persistence endpoint can reset a single module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    #[default]
    Pending,
    Completed,
}

impl ModuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleStatus::Pending => "pending",
            ModuleStatus::Completed => "completed",
        }
    }

    pub fn from_db(s: &str) -> Self {
        match s {
            "completed" => ModuleStatus::Completed,
            _ => ModuleStatus::Pending,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, ModuleStatus::Completed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAnswer {
    pub text: String,
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub question: String,
    pub answers: Vec<QuizAnswer>,
}

impl Quiz {
    /// The single answer flagged correct, if the quiz is well-formed.
    pub fn correct_answer(&self) -> Option<&QuizAnswer> {
        self.answers.iter().find(|a| a.is_correct)
    }
}

/// One unit of learning content paired with a single quiz question.
/// Field names follow the JSON contract the module generator is
/// prompted to produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningModule {
    #[serde(default = "default_icon")]
    pub icon: ModuleIcon,
    pub title: String,
    pub description: String,
    pub content: Vec<String>,
    pub quiz: Quiz,
    #[serde(default)]
    pub status: ModuleStatus,
}

fn default_icon() -> ModuleIcon {
    ModuleIcon::Sparkles
}

/// Database row for `learning_modules`. Content and quiz are stored as
/// jsonb; ordering within an application is by `created_at`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LearningModuleRow {
    pub id: Uuid,
    pub application_id: String,
    pub icon: String,
    pub title: String,
    pub description: String,
    pub content: serde_json::Value,
    pub quiz: serde_json::Value,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl LearningModuleRow {
    /// Converts a stored row back into the wire-shaped module.
    /// Fails only if the stored jsonb no longer matches the expected shape.
    pub fn into_module(self) -> Result<LearningModule, serde_json::Error> {
        Ok(LearningModule {
            icon: ModuleIcon::from_name(&self.icon),
            title: self.title,
            description: self.description,
            content: serde_json::from_value(self.content)?,
            quiz: serde_json::from_value(self.quiz)?,
            status: ModuleStatus::from_db(&self.status),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_known_name() {
        assert_eq!(ModuleIcon::from_name("ShieldCheck"), ModuleIcon::ShieldCheck);
    }

    #[test]
    fn test_icon_unknown_name_defaults() {
        assert_eq!(ModuleIcon::from_name("Rocket"), ModuleIcon::Sparkles);
        assert_eq!(ModuleIcon::from_name(""), ModuleIcon::Sparkles);
    }

    #[test]
    fn test_icon_roundtrips_through_json() {
        let icon: ModuleIcon = serde_json::from_str("\"Users\"").unwrap();
        assert_eq!(icon, ModuleIcon::Users);
        assert_eq!(serde_json::to_string(&icon).unwrap(), "\"Users\"");
    }

    #[test]
    fn test_module_status_defaults_to_pending() {
        let json = r#"{
            "icon": "Target",
            "title": "t",
            "description": "d",
            "content": ["a"],
            "quiz": {"question": "q", "answers": [{"text": "x", "isCorrect": true}]}
        }"#;
        let module: LearningModule = serde_json::from_str(json).unwrap();
        assert_eq!(module.status, ModuleStatus::Pending);
    }
}
