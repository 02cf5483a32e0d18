use crate::errors::{ErrorContext, GenerationError};
use crate::flashcard_session::FlashcardSession;
use crate::input::GenerationForm;
use crate::models::GenerationRequest;
use crate::orchestrator::{ActiveSession, GenerationOrchestrator};
use crate::quiz_session::{QuizPhase, QuizSession, ScoreSummary};

// Import logging macros
use crate::log_session_event;

/// Which screen is showing. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    Configuring,
    Loading,
    QuizAnswering,
    QuizReviewing,
    FlashcardActive,
}

#[derive(Debug)]
enum View {
    Configuring,
    Loading { source_name: String },
    Session(ActiveSession),
}

/// Top-level state machine for one browser-view lifetime.
///
/// Owns the configuration form, the active session (if any) and the last
/// error shown on the configuration screen.
pub struct SessionController {
    orchestrator: GenerationOrchestrator,
    form: GenerationForm,
    view: View,
    error: Option<String>,
}

impl SessionController {
    pub fn new(orchestrator: GenerationOrchestrator) -> Self {
        Self {
            orchestrator,
            form: GenerationForm::default(),
            view: View::Configuring,
            error: None,
        }
    }

    pub fn phase(&self) -> ViewPhase {
        match &self.view {
            View::Configuring => ViewPhase::Configuring,
            View::Loading { .. } => ViewPhase::Loading,
            View::Session(ActiveSession::Quiz(quiz)) => match quiz.phase() {
                QuizPhase::Answering => ViewPhase::QuizAnswering,
                QuizPhase::Reviewing => ViewPhase::QuizReviewing,
            },
            View::Session(ActiveSession::Flashcards(_)) => ViewPhase::FlashcardActive,
        }
    }

    pub fn orchestrator(&self) -> &GenerationOrchestrator {
        &self.orchestrator
    }

    pub fn form(&self) -> &GenerationForm {
        &self.form
    }

    /// The form is only editable while configuring
    pub fn form_mut(&mut self) -> Option<&mut GenerationForm> {
        match self.view {
            View::Configuring => Some(&mut self.form),
            _ => None,
        }
    }

    /// Source name of the request in flight, while Loading
    pub fn loading_source(&self) -> Option<&str> {
        match &self.view {
            View::Loading { source_name } => Some(source_name),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn quiz(&self) -> Option<&QuizSession> {
        match &self.view {
            View::Session(ActiveSession::Quiz(quiz)) => Some(quiz),
            _ => None,
        }
    }

    pub fn flashcards(&self) -> Option<&FlashcardSession> {
        match &self.view {
            View::Session(ActiveSession::Flashcards(deck)) => Some(deck),
            _ => None,
        }
    }

    fn quiz_mut(&mut self) -> Option<&mut QuizSession> {
        match &mut self.view {
            View::Session(ActiveSession::Quiz(quiz)) => Some(quiz),
            _ => None,
        }
    }

    fn flashcards_mut(&mut self) -> Option<&mut FlashcardSession> {
        match &mut self.view {
            View::Session(ActiveSession::Flashcards(deck)) => Some(deck),
            _ => None,
        }
    }

    /// Validate the form and enter Loading.
    ///
    /// Returns `None` when not configuring or when validation fails; the
    /// validation message is kept in [`Self::error`].
    pub fn begin_generation(&mut self) -> Option<GenerationRequest> {
        if !matches!(self.view, View::Configuring) {
            return None;
        }
        match self.form.assemble() {
            Ok(request) => {
                self.error = None;
                self.view = View::Loading {
                    source_name: request.source.display_name().to_string(),
                };
                Some(request)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }

    /// Leave Loading with the generation outcome.
    ///
    /// A failure returns to Configuring with the form untouched. Outcomes
    /// arriving after the view left Loading are dropped.
    pub fn finish_generation(&mut self, result: Result<ActiveSession, GenerationError>) {
        let source_name = match &self.view {
            View::Loading { source_name } => source_name.clone(),
            _ => {
                tracing::warn!(phase = ?self.phase(), "Discarding generation result outside Loading");
                return;
            }
        };

        match result {
            Ok(session) => {
                self.view = View::Session(session);
            }
            Err(e) => {
                let context = ErrorContext::new("generate").with_source(&source_name);
                self.error = Some(e.log_with_context(&context));
                self.view = View::Configuring;
            }
        }
    }

    /// Run a full generation round trip from the current form
    pub async fn generate(&mut self) -> ViewPhase {
        let Some(request) = self.begin_generation() else {
            return self.phase();
        };
        let result = self.orchestrator.submit(&request).await;
        self.finish_generation(result);
        self.phase()
    }

    /// Discard the session and form and go back to an empty configuration screen
    pub fn start_new(&mut self) -> bool {
        if matches!(self.view, View::Configuring) {
            return false;
        }
        if let View::Session(session) = &self.view {
            match session {
                ActiveSession::Quiz(quiz) => {
                    log_session_event!(
                        "quiz", session_id = quiz.id(),
                        duration_ms = quiz.elapsed_ms(),
                        "session discarded"
                    );
                }
                ActiveSession::Flashcards(deck) => {
                    log_session_event!(
                        "flashcard", session_id = deck.id(),
                        duration_ms = deck.elapsed_ms(),
                        "session discarded"
                    );
                }
            }
        }
        self.view = View::Configuring;
        self.form = GenerationForm::default();
        self.error = None;
        true
    }

    pub fn record_answer(&mut self, index: usize, value: impl Into<String>) -> bool {
        self.quiz_mut()
            .is_some_and(|quiz| quiz.record_answer(index, value))
    }

    pub fn submit_quiz(&mut self) -> Option<ScoreSummary> {
        self.quiz_mut().map(QuizSession::submit)
    }

    pub fn flip_card(&mut self) -> bool {
        match self.flashcards_mut() {
            Some(deck) => {
                deck.flip();
                true
            }
            None => false,
        }
    }

    pub fn next_card(&mut self) -> bool {
        self.flashcards_mut().is_some_and(FlashcardSession::next)
    }

    pub fn previous_card(&mut self) -> bool {
        self.flashcards_mut()
            .is_some_and(FlashcardSession::previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::GenerationBackend;
    use crate::errors::GENERIC_FAILURE_MESSAGE;
    use crate::models::{FlashcardItem, FlashcardPayload, GenerationResponse, UploadedFile};
    use crate::reporting::testing::recording_dispatcher;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NeverCalled;

    #[async_trait]
    impl GenerationBackend for NeverCalled {
        async fn generate(
            &self,
            _request: &GenerationRequest,
        ) -> Result<GenerationResponse, GenerationError> {
            panic!("generation should not be dispatched");
        }
    }

    fn controller() -> SessionController {
        let (dispatcher, _) = recording_dispatcher();
        SessionController::new(GenerationOrchestrator::new(Arc::new(NeverCalled), dispatcher))
    }

    fn deck() -> ActiveSession {
        let (dispatcher, _) = recording_dispatcher();
        let payload = FlashcardPayload {
            source_name: "Cell Biology".to_string(),
            flashcards: vec![
                FlashcardItem {
                    term: "ATP".to_string(),
                    definition: "Energy currency".to_string(),
                },
                FlashcardItem {
                    term: "DNA".to_string(),
                    definition: "Genetic code".to_string(),
                },
            ],
        };
        ActiveSession::Flashcards(FlashcardSession::new(payload, dispatcher).unwrap())
    }

    #[tokio::test]
    async fn test_validation_failure_stays_configuring() {
        let mut controller = controller();

        assert_eq!(controller.generate().await, ViewPhase::Configuring);
        assert_eq!(
            controller.error(),
            Some("Please either enter a topic or upload a file.")
        );
    }

    #[tokio::test]
    async fn test_loading_then_success() {
        let mut controller = controller();
        controller.form_mut().unwrap().set_topic("Cell Biology");

        let request = controller.begin_generation().unwrap();
        assert_eq!(request.source.display_name(), "Cell Biology");
        assert_eq!(controller.phase(), ViewPhase::Loading);
        assert_eq!(controller.loading_source(), Some("Cell Biology"));
        assert!(controller.form_mut().is_none());
        assert!(controller.begin_generation().is_none());

        controller.finish_generation(Ok(deck()));
        assert_eq!(controller.phase(), ViewPhase::FlashcardActive);
        assert_eq!(controller.loading_source(), None);
        assert!(controller.quiz().is_none());
        assert!(controller.next_card());
        assert!(!controller.record_answer(0, "ATP"));
        assert_eq!(controller.submit_quiz(), None);
    }

    #[tokio::test]
    async fn test_failure_preserves_form() {
        let mut controller = controller();
        {
            let form = controller.form_mut().unwrap();
            form.attach_file(UploadedFile::new("big.pdf", vec![1, 2, 3]));
            form.item_count = "12".to_string();
        }
        controller.begin_generation().unwrap();
        controller.finish_generation(Err(GenerationError::Backend {
            status: 413,
            detail: None,
        }));

        assert_eq!(controller.phase(), ViewPhase::Configuring);
        assert_eq!(controller.error(), Some(GENERIC_FAILURE_MESSAGE));
        assert_eq!(controller.form().file().unwrap().file_name, "big.pdf");
        assert_eq!(controller.form().item_count, "12");
    }

    #[tokio::test]
    async fn test_start_new_resets_everything() {
        let mut controller = controller();
        assert!(!controller.start_new());

        controller.form_mut().unwrap().set_topic("Cell Biology");
        controller.begin_generation();
        controller.finish_generation(Ok(deck()));

        assert!(controller.start_new());
        assert_eq!(controller.phase(), ViewPhase::Configuring);
        assert!(controller.flashcards().is_none());
        assert_eq!(controller.form().topic(), "");
        assert!(controller.error().is_none());
    }

    #[tokio::test]
    async fn test_late_result_after_start_new_is_dropped() {
        let mut controller = controller();
        controller.form_mut().unwrap().set_topic("Cell Biology");
        controller.begin_generation();

        assert!(controller.start_new());
        controller.finish_generation(Ok(deck()));
        assert_eq!(controller.phase(), ViewPhase::Configuring);
        assert!(controller.flashcards().is_none());
    }
}
