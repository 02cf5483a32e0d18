use crate::errors::ValidationError;
use crate::models::{
    DEFAULT_ITEM_COUNT, Difficulty, GenerationMode, GenerationRequest, MAX_ITEM_COUNT,
    MIN_ITEM_COUNT, Source, UploadedFile,
};

// Import logging macros
use crate::log_validation;

/// Validate raw form input and package it as a generation request.
///
/// An attached file always wins over typed topic text. The item count is
/// parsed and clamped to the supported range; a missing difficulty is sent
/// as [`Difficulty::Unspecified`].
pub fn assemble(
    topic_text: &str,
    file: Option<UploadedFile>,
    mode: GenerationMode,
    item_count: &str,
    difficulty: Option<Difficulty>,
) -> Result<GenerationRequest, ValidationError> {
    let result = assemble_inner(topic_text, file, mode, item_count, difficulty);
    match &result {
        Ok(request) => {
            log_validation!(
                success,
                "input",
                format!("{} request for '{}'", request.mode, request.source.display_name())
            );
        }
        Err(e) => {
            log_validation!(failure, "input", error = e);
        }
    }
    result
}

fn assemble_inner(
    topic_text: &str,
    file: Option<UploadedFile>,
    mode: GenerationMode,
    item_count: &str,
    difficulty: Option<Difficulty>,
) -> Result<GenerationRequest, ValidationError> {
    let source = match file {
        Some(file) if file.bytes.is_empty() => {
            return Err(ValidationError::EmptyFile(file.file_name));
        }
        Some(file) => Source::File(file),
        None if topic_text.trim().is_empty() => return Err(ValidationError::MissingSource),
        None => Source::Topic(topic_text.trim().to_string()),
    };

    let item_count = parse_item_count(item_count)?;

    Ok(GenerationRequest {
        mode,
        source,
        item_count,
        difficulty: difficulty.unwrap_or_default(),
    })
}

fn parse_item_count(raw: &str) -> Result<u8, ValidationError> {
    let value = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidItemCount(raw.trim().to_string()))?;
    Ok(value.clamp(MIN_ITEM_COUNT as i64, MAX_ITEM_COUNT as i64) as u8)
}

/// Editable configuration form backing the Configuring view.
///
/// Topic entry is locked while a file is attached. The typed topic is kept
/// and becomes the source again once the file is detached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationForm {
    topic: String,
    file: Option<UploadedFile>,
    pub mode: GenerationMode,
    pub item_count: String,
    pub difficulty: Option<Difficulty>,
}

impl Default for GenerationForm {
    fn default() -> Self {
        Self {
            topic: String::new(),
            file: None,
            mode: GenerationMode::default(),
            item_count: DEFAULT_ITEM_COUNT.to_string(),
            difficulty: None,
        }
    }
}

impl GenerationForm {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        self.file.as_ref()
    }

    pub fn is_topic_locked(&self) -> bool {
        self.file.is_some()
    }

    /// Returns false when the topic field is locked by an attached file
    pub fn set_topic(&mut self, topic: impl Into<String>) -> bool {
        if self.is_topic_locked() {
            return false;
        }
        self.topic = topic.into();
        true
    }

    pub fn attach_file(&mut self, file: UploadedFile) {
        self.file = Some(file);
    }

    pub fn detach_file(&mut self) -> Option<UploadedFile> {
        self.file.take()
    }

    pub fn assemble(&self) -> Result<GenerationRequest, ValidationError> {
        assemble(
            &self.topic,
            self.file.clone(),
            self.mode,
            &self.item_count,
            self.difficulty,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf() -> UploadedFile {
        UploadedFile::new("notes.pdf", b"%PDF-1.4".to_vec())
    }

    #[test]
    fn test_rejects_missing_source() {
        assert_eq!(
            assemble("", None, GenerationMode::Quiz, "5", None),
            Err(ValidationError::MissingSource)
        );
        assert_eq!(
            assemble("   ", None, GenerationMode::Quiz, "5", None),
            Err(ValidationError::MissingSource)
        );
    }

    #[test]
    fn test_accepts_file_without_topic() {
        let request = assemble("", Some(pdf()), GenerationMode::Flashcard, "5", None).unwrap();
        assert_eq!(request.source, Source::File(pdf()));
        assert_eq!(request.mode, GenerationMode::Flashcard);
    }

    #[test]
    fn test_accepts_topic_without_file() {
        let request = assemble("Photosynthesis", None, GenerationMode::Quiz, "5", None).unwrap();
        assert_eq!(request.source, Source::Topic("Photosynthesis".to_string()));
        assert_eq!(request.difficulty, Difficulty::Unspecified);
    }

    #[test]
    fn test_file_takes_precedence_over_topic() {
        let request = assemble("World War II", Some(pdf()), GenerationMode::Quiz, "5", None).unwrap();
        assert!(matches!(request.source, Source::File(_)));
    }

    #[test]
    fn test_rejects_empty_file() {
        let empty = UploadedFile::new("blank.docx", Vec::new());
        assert_eq!(
            assemble("", Some(empty), GenerationMode::Quiz, "5", None),
            Err(ValidationError::EmptyFile("blank.docx".to_string()))
        );
    }

    #[test]
    fn test_item_count_parsing_and_clamping() {
        let request = |count: &str| assemble("Topic", None, GenerationMode::Quiz, count, None);

        assert_eq!(request("7").unwrap().item_count, 7);
        assert_eq!(request(" 12 ").unwrap().item_count, 12);
        assert_eq!(request("1").unwrap().item_count, MIN_ITEM_COUNT);
        assert_eq!(request("99").unwrap().item_count, MAX_ITEM_COUNT);
        assert_eq!(request("-4").unwrap().item_count, MIN_ITEM_COUNT);
        assert_eq!(
            request("five"),
            Err(ValidationError::InvalidItemCount("five".to_string()))
        );
        assert!(request("").is_err());
    }

    #[test]
    fn test_form_locks_topic_while_file_attached() {
        let mut form = GenerationForm::default();
        assert!(form.set_topic("The Krebs Cycle"));

        form.attach_file(pdf());
        assert!(form.is_topic_locked());
        assert_eq!(form.topic(), "The Krebs Cycle");
        assert!(!form.set_topic("Ignored"));
        assert_eq!(form.assemble().unwrap().source, Source::File(pdf()));

        assert_eq!(form.detach_file(), Some(pdf()));
        assert_eq!(
            form.assemble().unwrap().source,
            Source::Topic("The Krebs Cycle".to_string())
        );
        assert!(form.set_topic("Back to topics"));
        assert_eq!(form.assemble().unwrap().source, Source::Topic("Back to topics".to_string()));
    }

    #[test]
    fn test_form_defaults() {
        let form = GenerationForm::default();
        assert_eq!(form.mode, GenerationMode::Quiz);
        assert_eq!(form.item_count, "5");
        assert_eq!(form.difficulty, None);
        assert_eq!(form.assemble(), Err(ValidationError::MissingSource));
    }
}
