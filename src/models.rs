use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::errors::ValidationError;

pub const MIN_ITEM_COUNT: u8 = 3;
pub const MAX_ITEM_COUNT: u8 = 15;
pub const DEFAULT_ITEM_COUNT: u8 = 5;

/// What the generation backend is asked to produce
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    #[default]
    Quiz,
    Flashcard,
}

impl GenerationMode {
    /// Value sent in the `mode` form field
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Quiz => "quiz",
            GenerationMode::Flashcard => "flashcard",
        }
    }

    pub fn item_count_label(&self) -> &'static str {
        match self {
            GenerationMode::Quiz => "Number of Questions",
            GenerationMode::Flashcard => "Number of Flashcards",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quiz" => Ok(GenerationMode::Quiz),
            "flashcard" | "flashcards" | "cards" => Ok(GenerationMode::Flashcard),
            other => Err(ValidationError::UnknownMode(other.to_string())),
        }
    }
}

/// Target audience level for generated content.
///
/// `Unspecified` is sent as an empty string so the backend always receives
/// a `difficulty` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Difficulty {
    #[default]
    Unspecified,
    Kindergarten,
    ElementarySchool,
    MiddleSchool,
    HighSchool,
    Undergraduate,
    Graduate,
    PhdLevel,
    GeneralAudience,
}

impl Difficulty {
    pub const LEVELS: [Difficulty; 8] = [
        Difficulty::Kindergarten,
        Difficulty::ElementarySchool,
        Difficulty::MiddleSchool,
        Difficulty::HighSchool,
        Difficulty::Undergraduate,
        Difficulty::Graduate,
        Difficulty::PhdLevel,
        Difficulty::GeneralAudience,
    ];

    pub fn form_value(&self) -> &'static str {
        match self {
            Difficulty::Unspecified => "",
            Difficulty::Kindergarten => "Kindergarten",
            Difficulty::ElementarySchool => "Elementary School",
            Difficulty::MiddleSchool => "Middle School",
            Difficulty::HighSchool => "High School",
            Difficulty::Undergraduate => "Undergraduate",
            Difficulty::Graduate => "Graduate",
            Difficulty::PhdLevel => "PhD Level",
            Difficulty::GeneralAudience => "for a general audience",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Unspecified => "Not specified",
            Difficulty::Kindergarten => "Kindergarten",
            Difficulty::ElementarySchool => "Elementary School (Beginner)",
            Difficulty::MiddleSchool => "Middle School",
            Difficulty::HighSchool => "High School (Intermediate)",
            Difficulty::Undergraduate => "University / Undergraduate",
            Difficulty::Graduate => "Graduate / Master's Level (Advanced)",
            Difficulty::PhdLevel => "PhD Level (Expert)",
            Difficulty::GeneralAudience => "General Audience",
        }
    }
}

impl FromStr for Difficulty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let level = match normalized.as_str() {
            "" | "none" | "unspecified" => Difficulty::Unspecified,
            "kindergarten" => Difficulty::Kindergarten,
            "elementary" | "elementary school" => Difficulty::ElementarySchool,
            "middle" | "middle school" => Difficulty::MiddleSchool,
            "high" | "high school" => Difficulty::HighSchool,
            "undergraduate" | "university" => Difficulty::Undergraduate,
            "graduate" | "masters" => Difficulty::Graduate,
            "phd" | "phd level" => Difficulty::PhdLevel,
            "general" | "for a general audience" => Difficulty::GeneralAudience,
            _ => return Err(ValidationError::UnknownDifficulty(s.trim().to_string())),
        };
        Ok(level)
    }
}

/// A document attached for generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self { file_name, bytes })
    }

    /// MIME type derived from the file extension
    pub fn mime_type(&self) -> &'static str {
        let lower = self.file_name.to_lowercase();
        if lower.ends_with(".pdf") {
            "application/pdf"
        } else if lower.ends_with(".docx") {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        } else if lower.ends_with(".pptx") {
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        } else {
            "application/octet-stream"
        }
    }
}

/// Exactly one source of material per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Topic(String),
    File(UploadedFile),
}

impl Source {
    pub fn display_name(&self) -> &str {
        match self {
            Source::Topic(topic) => topic,
            Source::File(file) => &file.file_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub mode: GenerationMode,
    pub source: Source,
    pub item_count: u8,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionItem {
    #[serde(rename = "questionText")]
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardItem {
    pub term: String,
    pub definition: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizPayload {
    pub source_name: String,
    pub questions: Vec<QuestionItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardPayload {
    pub source_name: String,
    pub flashcards: Vec<FlashcardItem>,
}

/// Validated generation result, routed by mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedContent {
    Quiz(QuizPayload),
    Flashcards(FlashcardPayload),
}

/// Generation response body as sent by the backend.
///
/// Absence of `mode: "flashcard"` means a quiz.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub questions: Option<Vec<QuestionItem>>,
    #[serde(default)]
    pub flashcards: Option<Vec<FlashcardItem>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResultReport {
    pub user_id: String,
    pub topic: String,
    pub score: u32,
    pub total_questions: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardSessionReport {
    pub user_id: String,
    pub source_name: String,
    pub card_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    QuizResult(QuizResultReport),
    FlashcardSession(FlashcardSessionReport),
}

impl Report {
    pub fn kind(&self) -> &'static str {
        match self {
            Report::QuizResult(_) => "quiz_result",
            Report::FlashcardSession(_) => "flashcard_session",
        }
    }
}
