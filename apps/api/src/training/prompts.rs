//! Prompt text and prompt builders for the training flow.
//! The coaching product is German-language; prompts stay German.

use serde::{Deserialize, Serialize};

use crate::training::quiz::QuizResult;

/// System prompt for turning an interview transcript into learning
/// modules. Demands a bare JSON array in the exact module wire shape.
pub const MODULE_GENERATION_SYSTEM: &str = r#"Du bist ein erfahrener Apotheken-Coach. Analysiere das folgende Interview-Transkript eines Mitarbeiters. Identifiziere die 3 größten Schwachstellen oder Wissenslücken.
Erstelle basierend darauf 3 personalisierte Lernmodule mit Quizfragen.
Antworte AUSSCHLIESSLICH mit einem JSON-Array. Jedes Objekt muss folgendem Format entsprechen:
{
  "icon": "ShieldCheck" | "Users" | "Target",
  "title": "Titel des Lernmoduls",
  "description": "Beschreibung der Schwachstelle.",
  "content": [
    "**Lernpunkt 1:** ...",
    "**Lernpunkt 2:** ...",
    "**Lernpunkt 3:** ..."
  ],
  "quiz": {
    "question": "Eine relevante Quizfrage.",
    "answers": [
      { "text": "Antwort 1", "isCorrect": true | false },
      { "text": "Antwort 2", "isCorrect": true | false },
      { "text": "Antwort 3", "isCorrect": true | false }
    ]
  }
}
Achte darauf, dass immer genau eine Antwort "isCorrect: true" ist und die Icons (ShieldCheck, Users, Target) korrekt zugewiesen werden."#;

/// System prompt for the coaching chat and the post-completion
/// performance analysis.
pub const COACH_FEEDBACK_SYSTEM: &str = r#"Du bist ein erfahrener Apotheken-Coach und Trainer. Deine Aufgabe ist es, dem Mitarbeiter konstruktives, personalisiertes Feedback zu geben.
WICHTIGE REGELN:
1. Beziehe dich KONKRET auf die Quiz-Antworten des Mitarbeiters
2. Nenne SPEZIFISCH welche Fragen richtig/falsch beantwortet wurden
3. Erkläre bei falschen Antworten, warum die richtige Antwort korrekt ist
4. Gib PRAKTISCHE Tipps für den Apothekenalltag
5. Sei motivierend aber ehrlich
6. Verwende "Du" (informell)
7. Halte dich kurz und prägnant (max 200 Wörter)"#;

/// One line of an interview transcript as submitted by the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: String,
    pub text: String,
}

/// Flattens a transcript into the `role: text` line format the analysis
/// prompt expects.
pub fn flatten_transcript(transcript: &[TranscriptMessage]) -> String {
    transcript
        .iter()
        .map(|msg| format!("{}: {}", msg.role, msg.text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn transcript_user_message(transcript_text: &str) -> String {
    format!("Hier ist das Transkript:\n\n{transcript_text}")
}

/// Builds the one-shot message that kicks off the performance analysis
/// once every module is completed.
pub fn analysis_kickoff_message(results: &[QuizResult]) -> String {
    let answer_summary = results
        .iter()
        .map(|r| {
            format!(
                "Frage: \"{}\"\nGegebene Antwort: \"{}\" ({})",
                r.question,
                r.user_answer,
                if r.is_correct { "Korrekt" } else { "Falsch" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Ich habe soeben die Lernmodule abgeschlossen. Hier ist eine Zusammenfassung meiner Antworten:\n\n{answer_summary}\n\nBitte gib mir auf dieser Grundlage eine kurze, motivierende Analyse meiner Leistung und eröffne die Möglichkeit für ein weiterführendes Gespräch."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_transcript() {
        let transcript = vec![
            TranscriptMessage {
                role: "ai".to_string(),
                text: "Guten Tag!".to_string(),
            },
            TranscriptMessage {
                role: "user".to_string(),
                text: "Hallo.".to_string(),
            },
        ];
        assert_eq!(
            flatten_transcript(&transcript),
            "ai: Guten Tag!\nuser: Hallo."
        );
    }

    #[test]
    fn test_analysis_kickoff_includes_each_result() {
        let results = vec![
            QuizResult {
                question: "F1?".to_string(),
                user_answer: "A".to_string(),
                correct_answer: "A".to_string(),
                is_correct: true,
                module_topic: "M1".to_string(),
            },
            QuizResult {
                question: "F2?".to_string(),
                user_answer: "B".to_string(),
                correct_answer: "C".to_string(),
                is_correct: false,
                module_topic: "M2".to_string(),
            },
        ];

        let message = analysis_kickoff_message(&results);
        assert!(message.contains("Frage: \"F1?\""));
        assert!(message.contains("(Korrekt)"));
        assert!(message.contains("Frage: \"F2?\""));
        assert!(message.contains("(Falsch)"));
    }

    #[test]
    fn test_transcript_user_message_prefix() {
        let msg = transcript_user_message("user: Hallo");
        assert!(msg.starts_with("Hier ist das Transkript:"));
        assert!(msg.ends_with("user: Hallo"));
    }
}
