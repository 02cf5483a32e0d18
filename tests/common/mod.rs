#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use edugenie::{
    FlashcardItem, FlashcardSessionReport, GenerationBackend, GenerationError, GenerationOrchestrator,
    GenerationRequest, GenerationResponse, QuestionItem, QuizResultReport, Report, ReportDispatcher,
    ReportError, ResultBackend, SessionController,
};

pub const USER_ID: &str = "hackathon_user_123";

/// Generation backend that replays queued responses and remembers requests
#[derive(Default)]
pub struct ScriptedGeneration {
    responses: Mutex<VecDeque<Result<GenerationResponse, (u16, Option<String>)>>>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGeneration {
    pub fn respond(&self, response: GenerationResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn fail(&self, status: u16, detail: Option<&str>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err((status, detail.map(str::to_string))));
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedGeneration {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err((status, detail))) => Err(GenerationError::Backend { status, detail }),
            None => Err(GenerationError::Backend {
                status: 500,
                detail: None,
            }),
        }
    }
}

/// Result backend that records every report, optionally failing each write
#[derive(Default)]
pub struct RecordingResults {
    reports: Mutex<Vec<Report>>,
    pub fail: bool,
}

impl RecordingResults {
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }

    fn record(&self, report: Report) -> Result<(), ReportError> {
        self.reports.lock().unwrap().push(report);
        if self.fail {
            return Err(ReportError::Backend {
                status: 500,
                body: "Database error".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ResultBackend for RecordingResults {
    async fn submit_quiz_result(&self, report: &QuizResultReport) -> Result<(), ReportError> {
        self.record(Report::QuizResult(report.clone()))
    }

    async fn submit_flashcard_session(
        &self,
        report: &FlashcardSessionReport,
    ) -> Result<(), ReportError> {
        self.record(Report::FlashcardSession(report.clone()))
    }

    async fn fetch_dashboard(&self, user_id: &str) -> Result<Vec<QuizResultReport>, ReportError> {
        Ok(self
            .reports()
            .into_iter()
            .filter_map(|report| match report {
                Report::QuizResult(result) if result.user_id == user_id => Some(result),
                _ => None,
            })
            .collect())
    }
}

pub struct Harness {
    pub controller: SessionController,
    pub generation: Arc<ScriptedGeneration>,
    pub results: Arc<RecordingResults>,
}

pub fn harness() -> Harness {
    harness_with(RecordingResults::default())
}

/// Harness whose result backend rejects every report
pub fn failing_harness() -> Harness {
    harness_with(RecordingResults {
        fail: true,
        ..Default::default()
    })
}

fn harness_with(results: RecordingResults) -> Harness {
    let generation = Arc::new(ScriptedGeneration::default());
    let results = Arc::new(results);
    let reports = ReportDispatcher::new(results.clone(), USER_ID);
    let orchestrator = GenerationOrchestrator::new(generation.clone(), reports);
    Harness {
        controller: SessionController::new(orchestrator),
        generation,
        results,
    }
}

/// Let detached report tasks run to completion
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

pub fn question(prompt: &str, options: &[&str], correct: &str) -> QuestionItem {
    QuestionItem {
        prompt: prompt.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer: correct.to_string(),
        explanation: format!("The answer is {}.", correct),
    }
}

pub fn cell_biology_quiz() -> GenerationResponse {
    GenerationResponse {
        mode: Some("quiz".to_string()),
        source_name: "Cell Biology".to_string(),
        questions: Some(vec![
            question("Powerhouse of the cell?", &["Nucleus", "Mitochondria", "Golgi"], "Mitochondria"),
            question("Where is DNA stored?", &["Nucleus", "Vacuole", "Membrane"], "Nucleus"),
            question("Site of protein synthesis?", &["Lysosome", "Ribosome", "Cytoplasm"], "Ribosome"),
            question("Which organelle does photosynthesis?", &["Chloroplast", "Mitochondria"], "Chloroplast"),
            question("What surrounds the cell?", &["Cell wall", "Cell membrane", "Nucleolus"], "Cell membrane"),
        ]),
        flashcards: None,
    }
}

pub fn flashcard_deck(source_name: &str, size: usize) -> GenerationResponse {
    GenerationResponse {
        mode: Some("flashcard".to_string()),
        source_name: source_name.to_string(),
        questions: None,
        flashcards: Some(
            (0..size)
                .map(|i| FlashcardItem {
                    term: format!("Term {}", i + 1),
                    definition: format!("Definition {}", i + 1),
                })
                .collect(),
        ),
    }
}
