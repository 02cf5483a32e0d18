use tracing::{error, warn};

/// Message shown when the backend gives no detail of its own
pub const GENERIC_FAILURE_MESSAGE: &str = "An unknown error occurred.";

/// Rejected before any request is dispatched
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please either enter a topic or upload a file.")]
    MissingSource,

    #[error("The attached file '{0}' is empty.")]
    EmptyFile(String),

    #[error("Item count must be a number, got '{0}'.")]
    InvalidItemCount(String),

    #[error("Unknown generation mode '{0}'.")]
    UnknownMode(String),

    #[error("Unknown difficulty level '{0}'.")]
    UnknownDifficulty(String),
}

/// The backend could not produce usable content
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation backend error ({status}): {detail:?}")]
    Backend { status: u16, detail: Option<String> },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed generation payload: {0}")]
    MalformedPayload(String),

    #[error("Generation payload contains both questions and flashcards")]
    AmbiguousPayload,

    #[error("Generation payload contains no {0}")]
    EmptyContent(&'static str),
}

impl GenerationError {
    /// Text shown to the user: backend detail when present, else the generic fallback
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::Backend {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    /// Log with the context of the failed operation and return the user-facing message
    pub fn log_with_context(&self, context: &ErrorContext) -> String {
        match self {
            GenerationError::Backend { status, .. } => {
                warn!(
                    operation = %context.operation,
                    source_name = ?context.source_name,
                    status = status,
                    error = %self,
                    "Generation rejected by backend"
                );
            }
            GenerationError::Transport(_) => {
                error!(
                    operation = %context.operation,
                    source_name = ?context.source_name,
                    error = %self,
                    "Generation request failed in transport"
                );
            }
            GenerationError::MalformedPayload(_)
            | GenerationError::AmbiguousPayload
            | GenerationError::EmptyContent(_) => {
                error!(
                    operation = %context.operation,
                    source_name = ?context.source_name,
                    error = %self,
                    "Generation payload rejected"
                );
            }
        }
        self.user_message()
    }
}

/// A result-persistence write failed. Only ever logged.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Result backend returned {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Error context for structured logging
#[derive(Debug)]
pub struct ErrorContext {
    pub operation: String,
    pub source_name: Option<String>,
}

impl ErrorContext {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            source_name: None,
        }
    }

    pub fn with_source(mut self, source_name: &str) -> Self {
        self.source_name = Some(source_name.to_string());
        self
    }
}
