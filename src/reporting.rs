use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::warn;

use crate::backend::ResultBackend;
use crate::models::{FlashcardSessionReport, QuizResultReport, Report};

// Import logging macros
use crate::log_report;

/// Sends result reports as background tasks.
///
/// Callers never observe the outcome: failures surface only as `error`
/// events in the log. Tasks are tracked so shutdown can [`drain`] them.
///
/// [`drain`]: ReportDispatcher::drain
#[derive(Clone)]
pub struct ReportDispatcher {
    backend: Arc<dyn ResultBackend>,
    user_id: String,
    tasks: Arc<Mutex<JoinSet<()>>>,
}

impl fmt::Debug for ReportDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportDispatcher")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

impl ReportDispatcher {
    pub fn new(backend: Arc<dyn ResultBackend>, user_id: impl Into<String>) -> Self {
        Self {
            backend,
            user_id: user_id.into(),
            tasks: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    fn tasks(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reports spawned and not yet reaped
    pub fn in_flight(&self) -> usize {
        let mut tasks = self.tasks();
        while tasks.try_join_next().is_some() {}
        tasks.len()
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn quiz_result(&self, topic: &str, score: u32, total_questions: u32) -> Report {
        Report::QuizResult(QuizResultReport {
            user_id: self.user_id.clone(),
            topic: topic.to_string(),
            score,
            total_questions,
        })
    }

    pub fn flashcard_session(&self, source_name: &str, card_count: u32) -> Report {
        Report::FlashcardSession(FlashcardSessionReport {
            user_id: self.user_id.clone(),
            source_name: source_name.to_string(),
            card_count,
        })
    }

    pub fn dispatch(&self, report: Report) {
        let kind = report.kind();
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                log_report!(failed, report_kind = kind, error = e);
                return;
            }
        };

        log_report!(dispatched, report_kind = kind);
        let backend = Arc::clone(&self.backend);
        let mut tasks = self.tasks();
        while tasks.try_join_next().is_some() {}
        tasks.spawn_on(async move {
            let started = Instant::now();
            let result = match &report {
                Report::QuizResult(result) => backend.submit_quiz_result(result).await,
                Report::FlashcardSession(session) => {
                    backend.submit_flashcard_session(session).await
                }
            };
            match result {
                Ok(()) => {
                    log_report!(
                        succeeded,
                        report_kind = kind,
                        duration_ms = started.elapsed().as_millis() as u64
                    );
                }
                Err(e) => {
                    log_report!(failed, report_kind = kind, error = e);
                }
            }
        }, &handle);
    }

    /// Wait up to `timeout` for outstanding reports. Returns how many were
    /// still unfinished and got abandoned.
    pub async fn drain(&self, timeout: Duration) -> usize {
        let mut tasks = std::mem::take(&mut *self.tasks());
        if tasks.is_empty() {
            return 0;
        }

        let waiting = tasks.len();
        let finished = tokio::time::timeout(timeout, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;

        match finished {
            Ok(()) => {
                log_report!(drained, count = waiting);
                0
            }
            Err(_) => {
                let abandoned = tasks.len();
                warn!(abandoned, timeout_ms = timeout.as_millis() as u64, "Gave up waiting for reports");
                abandoned
            }
        }
    }
}
