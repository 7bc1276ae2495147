//! Quiz interaction engine and progress aggregation.
//!
//! The funnel pages historically diverged on when a module locks: the
//! base completion flow locked after any answer, the persisted
//! learning-plan flow only after a correct one. Both behaviors live here
//! behind `CompletionPolicy` instead of being duplicated per page.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::module::{LearningModule, ModuleStatus};

/// When a quiz answer transitions its module to completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionPolicy {
    /// Any answer locks the module (base completion flow).
    OnAnyAnswer,
    /// Only a correct answer locks the module; an incorrect answer
    /// leaves it open for retry (persisted learning-plan flow).
    #[default]
    OnCorrectAnswer,
}

/// The currently shown answer selection for one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveQuiz {
    pub selected_answer: usize,
    pub is_correct: bool,
}

/// One recorded quiz outcome, used as prompt context for the
/// performance analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub module_topic: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Module not found at index")]
    ModuleOutOfRange,
    #[error("Answer index out of range")]
    AnswerOutOfRange,
}

/// What a single answer selection did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionOutcome {
    pub is_correct: bool,
    pub module_completed: bool,
    /// False when the module was already completed and the selection
    /// was ignored (idempotent guard).
    pub changed: bool,
}

/// In-memory state machine for one trainee working through a module set.
///
/// Completion is applied immediately on selection; the historical 1s
/// lock delay was purely a styling affordance and has no server-side
/// counterpart.
pub struct TrainingSession {
    modules: Vec<LearningModule>,
    policy: CompletionPolicy,
    active: Vec<Option<ActiveQuiz>>,
    completed: Vec<bool>,
    results: Vec<QuizResult>,
}

impl TrainingSession {
    /// Seeds completion state from each module's persisted status.
    pub fn new(modules: Vec<LearningModule>, policy: CompletionPolicy) -> Self {
        let completed = modules
            .iter()
            .map(|m| m.status == ModuleStatus::Completed)
            .collect::<Vec<_>>();
        let active = vec![None; modules.len()];

        Self {
            modules,
            policy,
            active,
            completed,
            results: Vec::new(),
        }
    }

    pub fn modules(&self) -> &[LearningModule] {
        &self.modules
    }

    pub fn is_completed(&self, module_index: usize) -> bool {
        self.completed.get(module_index).copied().unwrap_or(false)
    }

    pub fn active_quiz(&self, module_index: usize) -> Option<ActiveQuiz> {
        self.active.get(module_index).copied().flatten()
    }

    pub fn results(&self) -> &[QuizResult] {
        &self.results
    }

    /// Records an answer selection for a module.
    ///
    /// A selection on an already-completed module is a no-op. Otherwise
    /// the selection is recorded, a `QuizResult` is appended, and the
    /// module transitions to completed per the session's policy.
    pub fn select_answer(
        &mut self,
        module_index: usize,
        answer_index: usize,
    ) -> Result<SelectionOutcome, SelectionError> {
        let module = self
            .modules
            .get(module_index)
            .ok_or(SelectionError::ModuleOutOfRange)?;

        if self.completed[module_index] {
            let prior = self.active[module_index];
            return Ok(SelectionOutcome {
                is_correct: prior.map(|a| a.is_correct).unwrap_or(false),
                module_completed: true,
                changed: false,
            });
        }

        let answer = module
            .quiz
            .answers
            .get(answer_index)
            .ok_or(SelectionError::AnswerOutOfRange)?;

        let is_correct = answer.is_correct;
        let correct_answer = module
            .quiz
            .correct_answer()
            .map(|a| a.text.clone())
            .unwrap_or_default();

        self.active[module_index] = Some(ActiveQuiz {
            selected_answer: answer_index,
            is_correct,
        });

        self.results.push(QuizResult {
            question: module.quiz.question.clone(),
            user_answer: answer.text.clone(),
            correct_answer,
            is_correct,
            module_topic: module.title.clone(),
        });

        let completes = match self.policy {
            CompletionPolicy::OnAnyAnswer => true,
            CompletionPolicy::OnCorrectAnswer => is_correct,
        };
        if completes {
            self.completed[module_index] = true;
        }

        Ok(SelectionOutcome {
            is_correct,
            module_completed: completes,
            changed: true,
        })
    }

    pub fn completed_count(&self) -> usize {
        self.completed.iter().filter(|c| **c).count()
    }

    /// Percent of modules completed; every module counts equally.
    pub fn percent_complete(&self) -> f64 {
        if self.modules.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 / self.modules.len() as f64 * 100.0
    }

    /// True iff every module is completed and the set is non-empty.
    /// Pure function of current state, recomputed on every call.
    ///
    /// Sessions are rebuilt per request, so the one-shot analysis
    /// trigger is not held here: the durable edge is the monotonic
    /// `training_completed` transition persisted by the progress
    /// update, which fires exactly once per application.
    pub fn all_complete(&self) -> bool {
        !self.modules.is_empty() && self.completed_count() == self.modules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::module::{ModuleIcon, Quiz, QuizAnswer};

    fn module(title: &str) -> LearningModule {
        LearningModule {
            icon: ModuleIcon::Sparkles,
            title: title.to_string(),
            description: "d".to_string(),
            content: vec!["c".to_string()],
            quiz: Quiz {
                question: format!("{title}?"),
                answers: vec![
                    QuizAnswer {
                        text: "richtig".to_string(),
                        is_correct: true,
                    },
                    QuizAnswer {
                        text: "falsch".to_string(),
                        is_correct: false,
                    },
                ],
            },
            status: ModuleStatus::Pending,
        }
    }

    fn session(n: usize, policy: CompletionPolicy) -> TrainingSession {
        let modules = (0..n).map(|i| module(&format!("m{i}"))).collect();
        TrainingSession::new(modules, policy)
    }

    #[test]
    fn test_percent_complete_per_module() {
        let mut s = session(3, CompletionPolicy::OnCorrectAnswer);
        assert_eq!(s.percent_complete(), 0.0);

        s.select_answer(0, 0).unwrap();
        assert!((s.percent_complete() - 100.0 / 3.0).abs() < 1e-9);

        s.select_answer(1, 0).unwrap();
        assert!((s.percent_complete() - 200.0 / 3.0).abs() < 1e-9);

        s.select_answer(2, 0).unwrap();
        assert_eq!(s.percent_complete(), 100.0);
    }

    #[test]
    fn test_all_complete_requires_every_module() {
        let mut s = session(2, CompletionPolicy::OnCorrectAnswer);
        s.select_answer(0, 0).unwrap();
        assert!(!s.all_complete());
        s.select_answer(1, 0).unwrap();
        assert!(s.all_complete());
    }

    #[test]
    fn test_empty_session_never_complete() {
        let s = TrainingSession::new(vec![], CompletionPolicy::OnAnyAnswer);
        assert_eq!(s.percent_complete(), 0.0);
        assert!(!s.all_complete());
    }

    #[test]
    fn test_incorrect_answer_keeps_module_open_for_retry() {
        let mut s = session(1, CompletionPolicy::OnCorrectAnswer);
        let outcome = s.select_answer(0, 1).unwrap();
        assert!(!outcome.is_correct);
        assert!(!outcome.module_completed);
        assert!(!s.is_completed(0));

        // Retry with the correct answer locks the module
        let outcome = s.select_answer(0, 0).unwrap();
        assert!(outcome.module_completed);
        assert!(s.is_completed(0));
        assert_eq!(s.results().len(), 2);
    }

    #[test]
    fn test_any_answer_policy_locks_on_incorrect() {
        let mut s = session(1, CompletionPolicy::OnAnyAnswer);
        let outcome = s.select_answer(0, 1).unwrap();
        assert!(!outcome.is_correct);
        assert!(outcome.module_completed);
        assert!(s.is_completed(0));
    }

    #[test]
    fn test_reselection_on_completed_module_is_noop() {
        let mut s = session(1, CompletionPolicy::OnCorrectAnswer);
        s.select_answer(0, 0).unwrap();

        let outcome = s.select_answer(0, 1).unwrap();
        assert!(!outcome.changed);
        assert!(outcome.module_completed);
        // No new result recorded, selection unchanged
        assert_eq!(s.results().len(), 1);
        assert_eq!(s.active_quiz(0).unwrap().selected_answer, 0);
    }

    #[test]
    fn test_out_of_range_guards() {
        let mut s = session(2, CompletionPolicy::OnCorrectAnswer);
        assert_eq!(
            s.select_answer(99, 0).unwrap_err(),
            SelectionError::ModuleOutOfRange
        );
        assert_eq!(
            s.select_answer(0, 99).unwrap_err(),
            SelectionError::AnswerOutOfRange
        );
        assert!(s.results().is_empty());
    }

    #[test]
    fn test_session_seeds_from_persisted_status() {
        let mut done = module("done");
        done.status = ModuleStatus::Completed;
        let s = TrainingSession::new(
            vec![done, module("open")],
            CompletionPolicy::OnCorrectAnswer,
        );
        assert!(s.is_completed(0));
        assert!(!s.is_completed(1));
        assert_eq!(s.percent_complete(), 50.0);
    }

    #[test]
    fn test_quiz_result_records_correct_answer_text() {
        let mut s = session(1, CompletionPolicy::OnCorrectAnswer);
        s.select_answer(0, 1).unwrap();
        let result = &s.results()[0];
        assert_eq!(result.user_answer, "falsch");
        assert_eq!(result.correct_answer, "richtig");
        assert!(!result.is_correct);
        assert_eq!(result.module_topic, "m0");
    }
}
