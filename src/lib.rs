pub mod backend;
pub mod config;
pub mod controller;
pub mod errors;
pub mod flashcard_session;
pub mod input;
pub mod logging;
pub mod models;
pub mod orchestrator;
pub mod quiz_session;
pub mod reporting;
pub mod terminal;

pub use backend::{GenerationBackend, HttpBackend, ResultBackend};
pub use config::Config;
pub use controller::{SessionController, ViewPhase};
pub use errors::*;
pub use flashcard_session::FlashcardSession;
pub use input::{GenerationForm, assemble};
pub use models::*;
pub use orchestrator::{ActiveSession, GenerationOrchestrator};
pub use quiz_session::{QuizSession, ScoreSummary};
pub use reporting::ReportDispatcher;
