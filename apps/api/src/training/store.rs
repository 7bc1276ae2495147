//! Module store: validation of externally produced module payloads and
//! the built-in fallback set.
//!
//! The module generator (an LLM) is an untrusted producer. Anything that
//! is not a non-empty array of well-formed modules is replaced by the
//! fallback set so the trainee never sees an empty plan. Parse failures
//! are logged, never surfaced to the caller.

use serde_json::Value;
use tracing::warn;

use crate::models::module::{LearningModule, ModuleIcon, ModuleStatus, Quiz, QuizAnswer};

/// Parses and validates a module payload.
///
/// Rejects payloads that are not a non-empty array, contain a module that
/// does not match the expected shape, or contain a quiz without exactly
/// one correct answer.
pub fn parse_modules(payload: &Value) -> Result<Vec<LearningModule>, String> {
    let items = payload
        .as_array()
        .ok_or_else(|| "payload is not an array".to_string())?;

    if items.is_empty() {
        return Err("payload is an empty array".to_string());
    }

    let mut modules = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let module: LearningModule = serde_json::from_value(item.clone())
            .map_err(|e| format!("module {i} has unexpected shape: {e}"))?;

        if !quiz_is_well_formed(&module.quiz) {
            return Err(format!(
                "module {i} quiz must have exactly one correct answer"
            ));
        }

        modules.push(module);
    }

    Ok(modules)
}

/// Loading policy: use the dynamic payload when it validates, otherwise
/// substitute the fixed fallback set.
pub fn load_or_fallback(payload: Option<&Value>) -> Vec<LearningModule> {
    match payload {
        Some(value) => match parse_modules(value) {
            Ok(modules) => modules,
            Err(reason) => {
                warn!("Invalid module payload ({reason}), using fallback set");
                fallback_modules()
            }
        },
        None => {
            warn!("No module payload available, using fallback set");
            fallback_modules()
        }
    }
}

fn quiz_is_well_formed(quiz: &Quiz) -> bool {
    quiz.answers.iter().filter(|a| a.is_correct).count() == 1
}

/// The fixed module set shown when dynamic generation is unavailable
/// or invalid.
pub fn fallback_modules() -> Vec<LearningModule> {
    vec![
        LearningModule {
            icon: ModuleIcon::ShieldCheck,
            title: "Vertiefung: Produktvorteile".to_string(),
            description:
                "Stärke deine Argumentation, um die hohe Qualität von Magnesiumcitrat 130 hervorzuheben. (Fallback)"
                    .to_string(),
            content: vec![
                "**Citratform:** Hat eine hohe Bioverfügbarkeit.".to_string(),
                "**Reinheit:** Apothekenqualität garantiert Reinheit.".to_string(),
                "**Wirkung:** Ein Allrounder für Muskeln und Nerven.".to_string(),
            ],
            quiz: Quiz {
                question:
                    "Ein Kunde fragt nach dem Unterschied zu günstigen Produkten. Was ist dein stärkstes Argument?"
                        .to_string(),
                answers: vec![
                    QuizAnswer {
                        text: "Die Citratform ist für den Körper besonders gut verfügbar."
                            .to_string(),
                        is_correct: true,
                    },
                    QuizAnswer {
                        text: "Unsere Packung sieht hochwertiger aus.".to_string(),
                        is_correct: false,
                    },
                ],
            },
            status: ModuleStatus::Pending,
        },
        LearningModule {
            icon: ModuleIcon::Users,
            title: "Training: Zielgruppen erkennen".to_string(),
            description:
                "Lerne, proaktiv die Kunden zu identifizieren, die am meisten profitieren. (Fallback)"
                    .to_string(),
            content: vec![
                "**Wadenkrämpfe:** Ein klassisches Anzeichen.".to_string(),
                "**Diuretika-Einnahme:** Erhöhter Bedarf.".to_string(),
                "**Stress & Sport:** Aktive Menschen verbrauchen mehr.".to_string(),
            ],
            quiz: Quiz {
                question: "Eine ältere Dame, die Diuretika nimmt, ist eine Zielgruppe, weil..."
                    .to_string(),
                answers: vec![
                    QuizAnswer {
                        text: "...Diuretika den Magnesiumverlust erhöhen können.".to_string(),
                        is_correct: true,
                    },
                    QuizAnswer {
                        text: "...ältere Menschen immer Magnesium brauchen.".to_string(),
                        is_correct: false,
                    },
                ],
            },
            status: ModuleStatus::Pending,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> Value {
        json!([{
            "icon": "Target",
            "title": "Beratung",
            "description": "Beschreibung",
            "content": ["**Punkt 1:** etwas"],
            "quiz": {
                "question": "Frage?",
                "answers": [
                    {"text": "richtig", "isCorrect": true},
                    {"text": "falsch", "isCorrect": false}
                ]
            }
        }])
    }

    #[test]
    fn test_parse_valid_payload() {
        let modules = parse_modules(&valid_payload()).unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].title, "Beratung");
    }

    #[test]
    fn test_empty_array_rejected() {
        assert!(parse_modules(&json!([])).is_err());
    }

    #[test]
    fn test_non_array_rejected() {
        assert!(parse_modules(&json!({"title": "x"})).is_err());
    }

    #[test]
    fn test_quiz_without_correct_answer_rejected() {
        let mut payload = valid_payload();
        payload[0]["quiz"]["answers"][0]["isCorrect"] = json!(false);
        assert!(parse_modules(&payload).is_err());
    }

    #[test]
    fn test_quiz_with_two_correct_answers_rejected() {
        let mut payload = valid_payload();
        payload[0]["quiz"]["answers"][1]["isCorrect"] = json!(true);
        assert!(parse_modules(&payload).is_err());
    }

    #[test]
    fn test_unknown_icon_falls_back_to_default() {
        let mut payload = valid_payload();
        payload[0]["icon"] = json!("Rocket");
        let modules = parse_modules(&payload).unwrap();
        assert_eq!(modules[0].icon, ModuleIcon::Sparkles);
    }

    #[test]
    fn test_load_or_fallback_on_malformed() {
        let modules = load_or_fallback(Some(&json!("not modules")));
        assert_eq!(modules.len(), fallback_modules().len());
        assert!(modules[0].title.starts_with("Vertiefung"));
    }

    #[test]
    fn test_load_or_fallback_on_empty() {
        let modules = load_or_fallback(Some(&json!([])));
        assert_eq!(modules.len(), fallback_modules().len());
    }

    #[test]
    fn test_load_or_fallback_on_missing() {
        assert_eq!(load_or_fallback(None).len(), fallback_modules().len());
    }

    #[test]
    fn test_fallback_set_is_well_formed() {
        for module in fallback_modules() {
            assert!(quiz_is_well_formed(&module.quiz));
            assert!(!module.content.is_empty());
        }
    }
}
