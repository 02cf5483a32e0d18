use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::warn;

use crate::backend::GenerationBackend;
use crate::errors::GenerationError;
use crate::flashcard_session::FlashcardSession;
use crate::models::{
    FlashcardPayload, GeneratedContent, GenerationMode, GenerationRequest, GenerationResponse,
    QuizPayload,
};
use crate::quiz_session::QuizSession;
use crate::reporting::ReportDispatcher;

// Import logging macros
use crate::log_generation;

/// The one session a successful generation produces
#[derive(Debug)]
pub enum ActiveSession {
    Quiz(QuizSession),
    Flashcards(FlashcardSession),
}

impl ActiveSession {
    pub fn mode(&self) -> GenerationMode {
        match self {
            ActiveSession::Quiz(_) => GenerationMode::Quiz,
            ActiveSession::Flashcards(_) => GenerationMode::Flashcard,
        }
    }
}

/// Validate a backend response and decide which kind of session it feeds.
///
/// Only an explicit `mode: "flashcard"` selects flashcards; anything else is
/// a quiz. A response carrying both collections is rejected outright.
pub fn route_response(response: GenerationResponse) -> Result<GeneratedContent, GenerationError> {
    let GenerationResponse {
        mode,
        source_name,
        questions,
        flashcards,
    } = response;

    if questions.is_some() && flashcards.is_some() {
        return Err(GenerationError::AmbiguousPayload);
    }

    if mode.as_deref() == Some(GenerationMode::Flashcard.as_str()) {
        let flashcards = flashcards
            .ok_or_else(|| GenerationError::MalformedPayload("missing 'flashcards'".to_string()))?;
        if flashcards.is_empty() {
            return Err(GenerationError::EmptyContent("flashcards"));
        }
        return Ok(GeneratedContent::Flashcards(FlashcardPayload {
            source_name,
            flashcards,
        }));
    }

    let questions = questions
        .ok_or_else(|| GenerationError::MalformedPayload("missing 'questions'".to_string()))?;
    if questions.is_empty() {
        return Err(GenerationError::EmptyContent("questions"));
    }
    for (index, question) in questions.iter().enumerate() {
        if question.options.is_empty() {
            return Err(GenerationError::MalformedPayload(format!(
                "question {} has no options",
                index + 1
            )));
        }
        if !question.options.contains(&question.correct_answer) {
            return Err(GenerationError::MalformedPayload(format!(
                "question {} has a correct answer that is not among its options",
                index + 1
            )));
        }
    }
    Ok(GeneratedContent::Quiz(QuizPayload {
        source_name,
        questions,
    }))
}

/// Clears the pending flag however the request ends
struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Sends generation requests and turns responses into sessions.
///
/// Callers keep to one request at a time; `is_pending` reports whether one
/// is in flight.
pub struct GenerationOrchestrator {
    backend: Arc<dyn GenerationBackend>,
    reports: ReportDispatcher,
    pending: AtomicBool,
}

impl GenerationOrchestrator {
    pub fn new(backend: Arc<dyn GenerationBackend>, reports: ReportDispatcher) -> Self {
        Self {
            backend,
            reports,
            pending: AtomicBool::new(false),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn reports(&self) -> &ReportDispatcher {
        &self.reports
    }

    pub async fn submit(&self, request: &GenerationRequest) -> Result<ActiveSession, GenerationError> {
        self.pending.store(true, Ordering::SeqCst);
        let _guard = PendingGuard(&self.pending);
        let started = Instant::now();

        log_generation!(
            start,
            mode = request.mode,
            item_count = request.item_count,
            source = request.source.display_name()
        );

        let routed = match self.backend.generate(request).await {
            Ok(response) => route_response(response),
            Err(e) => Err(e),
        };

        let content = match routed {
            Ok(content) => content,
            Err(e) => {
                log_generation!(
                    failure,
                    error = e,
                    duration_ms = started.elapsed().as_millis() as u64
                );
                return Err(e);
            }
        };

        let session = self.install(content)?;
        if session.mode() != request.mode {
            warn!(
                requested = %request.mode,
                received = %session.mode(),
                "Backend returned a different mode than requested"
            );
        }

        log_generation!(
            success,
            mode = session.mode(),
            item_count = request.item_count,
            duration_ms = started.elapsed().as_millis() as u64
        );
        Ok(session)
    }

    fn install(&self, content: GeneratedContent) -> Result<ActiveSession, GenerationError> {
        match content {
            GeneratedContent::Quiz(payload) => Ok(ActiveSession::Quiz(QuizSession::new(
                payload,
                self.reports.clone(),
            ))),
            GeneratedContent::Flashcards(payload) => {
                FlashcardSession::new(payload, self.reports.clone())
                    .map(ActiveSession::Flashcards)
                    .ok_or(GenerationError::EmptyContent("flashcards"))
            }
        }
    }
}
