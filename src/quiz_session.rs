use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{QuestionItem, QuizPayload};
use crate::reporting::ReportDispatcher;

// Import logging macros
use crate::{log_session_event, log_session_ignored};

const SESSION_KIND: &str = "quiz";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Answering,
    Reviewing,
}

/// Results screen classification: more than half correct passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizOutcome {
    Passed,
    NeedsReview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSummary {
    pub score: u32,
    pub total: u32,
}

impl ScoreSummary {
    pub fn outcome(&self) -> QuizOutcome {
        if self.score * 2 > self.total {
            QuizOutcome::Passed
        } else {
            QuizOutcome::NeedsReview
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionReview<'a> {
    pub text: &'a str,
    pub is_correct_choice: bool,
    pub is_user_choice: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview<'a> {
    pub number: usize,
    pub prompt: &'a str,
    pub user_answer: Option<&'a str>,
    pub is_correct: bool,
    pub options: Vec<OptionReview<'a>>,
    pub explanation: &'a str,
}

/// Count of answers matching their question's correct answer
pub fn score(questions: &[QuestionItem], answers: &[Option<String>]) -> u32 {
    questions
        .iter()
        .zip(answers)
        .filter(|(question, answer)| answer.as_deref() == Some(question.correct_answer.as_str()))
        .count() as u32
}

/// A generated quiz being answered, then reviewed.
///
/// `submitted` only ever moves from false to true, and the result report
/// is dispatched on that transition and nowhere else.
#[derive(Debug)]
pub struct QuizSession {
    id: Uuid,
    source_name: String,
    questions: Vec<QuestionItem>,
    answers: Vec<Option<String>>,
    submitted: bool,
    created_at: DateTime<Utc>,
    reports: ReportDispatcher,
}

impl QuizSession {
    pub fn new(payload: QuizPayload, reports: ReportDispatcher) -> Self {
        let answers = vec![None; payload.questions.len()];
        let session = Self {
            id: Uuid::new_v4(),
            source_name: payload.source_name,
            questions: payload.questions,
            answers,
            submitted: false,
            created_at: Utc::now(),
            reports,
        };
        log_session_event!(SESSION_KIND, session_id = session.id, "session started");
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn questions(&self) -> &[QuestionItem] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<String>] {
        &self.answers
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Milliseconds since the session was created
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.created_at).num_milliseconds()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn phase(&self) -> QuizPhase {
        if self.submitted {
            QuizPhase::Reviewing
        } else {
            QuizPhase::Answering
        }
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|answer| answer.is_some()).count()
    }

    /// Set the answer for one question. Returns false when ignored
    /// (after submission, or for an index outside the quiz).
    pub fn record_answer(&mut self, index: usize, value: impl Into<String>) -> bool {
        if self.submitted {
            log_session_ignored!(SESSION_KIND, session_id = self.id, "record_answer", "quiz already submitted");
            return false;
        }
        let Some(slot) = self.answers.get_mut(index) else {
            log_session_ignored!(SESSION_KIND, session_id = self.id, "record_answer", format!("no question at index {}", index));
            return false;
        };
        *slot = Some(value.into());
        true
    }

    pub fn score(&self) -> ScoreSummary {
        ScoreSummary {
            score: score(&self.questions, &self.answers),
            total: self.questions.len() as u32,
        }
    }

    pub fn outcome(&self) -> QuizOutcome {
        self.score().outcome()
    }

    /// Lock the answers and report the result. Only the first call reports.
    pub fn submit(&mut self) -> ScoreSummary {
        let summary = self.score();
        if self.submitted {
            log_session_ignored!(SESSION_KIND, session_id = self.id, "submit", "quiz already submitted");
            return summary;
        }

        self.submitted = true;
        log_session_event!(
            SESSION_KIND,
            session_id = self.id,
            score = summary.score,
            total = summary.total,
            duration_ms = self.elapsed_ms(),
            "quiz submitted"
        );
        self.reports.dispatch(self.reports.quiz_result(
            &self.source_name,
            summary.score,
            summary.total,
        ));
        summary
    }

    /// Per-question correctness for the results view, derived on every call
    pub fn review_state(&self) -> Vec<QuestionReview<'_>> {
        self.questions
            .iter()
            .zip(&self.answers)
            .enumerate()
            .map(|(index, (question, answer))| {
                let user_answer = answer.as_deref();
                QuestionReview {
                    number: index + 1,
                    prompt: &question.prompt,
                    user_answer,
                    is_correct: user_answer == Some(question.correct_answer.as_str()),
                    options: question
                        .options
                        .iter()
                        .map(|option| OptionReview {
                            text: option,
                            is_correct_choice: *option == question.correct_answer,
                            is_user_choice: user_answer == Some(option.as_str()),
                        })
                        .collect(),
                    explanation: &question.explanation,
                }
            })
            .collect()
    }
}
