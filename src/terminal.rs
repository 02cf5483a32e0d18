use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use crate::backend::ResultBackend;
use crate::controller::{SessionController, ViewPhase};
use crate::errors::ValidationError;
use crate::flashcard_session::CardFace;
use crate::models::{Difficulty, GenerationMode, QuizResultReport, UploadedFile};
use crate::quiz_session::QuizOutcome;

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mode(GenerationMode),
    Topic(String),
    File(PathBuf),
    ClearFile,
    Count(String),
    Difficulty(Difficulty),
    Generate,
    History,
    Answer { question: usize, option: usize },
    Submit,
    Flip,
    Next,
    Previous,
    New,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for a list of commands.")]
    Unknown(String),

    #[error("'{0}' needs an argument.")]
    MissingArgument(&'static str),

    #[error("'{0}' is not a valid number.")]
    InvalidNumber(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

fn parse_number(raw: &str) -> Result<usize, CommandError> {
    raw.parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| CommandError::InvalidNumber(raw.to_string()))
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_lowercase().as_str() {
        "mode" if rest.is_empty() => return Err(CommandError::MissingArgument("mode")),
        "mode" => Command::Mode(rest.parse()?),
        "topic" => Command::Topic(rest.to_string()),
        "file" if rest.is_empty() => return Err(CommandError::MissingArgument("file")),
        "file" => Command::File(PathBuf::from(rest)),
        "clear-file" => Command::ClearFile,
        "count" if rest.is_empty() => return Err(CommandError::MissingArgument("count")),
        "count" => Command::Count(rest.to_string()),
        "difficulty" => Command::Difficulty(rest.parse()?),
        "generate" => Command::Generate,
        "history" => Command::History,
        "answer" => {
            let mut args = rest.split_whitespace();
            let (Some(question), Some(option)) = (args.next(), args.next()) else {
                return Err(CommandError::MissingArgument("answer"));
            };
            Command::Answer {
                question: parse_number(question)?,
                option: parse_number(option)?,
            }
        }
        "submit" => Command::Submit,
        "flip" => Command::Flip,
        "next" => Command::Next,
        "prev" | "previous" => Command::Previous,
        "new" => Command::New,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => return Err(CommandError::Unknown(word.to_string())),
    };
    Ok(command)
}

/// What the event loop should do after a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(String),
    Quit,
}

/// Receives intermediate screens, such as Loading, while a command runs
pub type ProgressSink = Box<dyn Fn(&str) + Send + Sync>;

/// Line-driven front-end over a [`SessionController`]
pub struct Terminal {
    controller: SessionController,
    results: Arc<dyn ResultBackend>,
    progress: Option<ProgressSink>,
}

impl Terminal {
    pub fn new(controller: SessionController, results: Arc<dyn ResultBackend>) -> Self {
        Self {
            controller,
            results,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub async fn handle_line(&mut self, line: &str) -> Flow {
        if line.trim().is_empty() {
            return Flow::Continue(render(&self.controller));
        }
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(e) => return Flow::Continue(e.to_string()),
        };
        if command == Command::Quit {
            return Flow::Quit;
        }
        Flow::Continue(self.apply(command).await)
    }

    async fn apply(&mut self, command: Command) -> String {
        let phase = self.controller.phase();
        let notice = match (phase, command) {
            (_, Command::Help) => Some(help(phase).to_string()),
            (ViewPhase::Configuring, Command::Generate) => {
                self.generate().await;
                None
            }
            (ViewPhase::Configuring, Command::History) => Some(self.history().await),
            (ViewPhase::Configuring, Command::File(path)) => {
                match UploadedFile::from_path(&path).await {
                    Ok(file) => {
                        if let Some(form) = self.controller.form_mut() {
                            form.attach_file(file);
                        }
                        None
                    }
                    Err(e) => Some(format!("Could not read '{}': {}", path.display(), e)),
                }
            }
            (ViewPhase::Configuring, command) => self.edit_form(command),
            (ViewPhase::QuizAnswering, Command::Answer { question, option }) => {
                let value = self
                    .controller
                    .quiz()
                    .and_then(|quiz| quiz.questions().get(question - 1))
                    .and_then(|q| q.options.get(option - 1))
                    .cloned();
                match value {
                    Some(value) => {
                        self.controller.record_answer(question - 1, value);
                        None
                    }
                    None => Some(format!("There is no option {} for question {}.", option, question)),
                }
            }
            (ViewPhase::QuizAnswering, Command::Submit) => {
                self.controller.submit_quiz();
                None
            }
            (ViewPhase::FlashcardActive, Command::Flip) => {
                self.controller.flip_card();
                None
            }
            (ViewPhase::FlashcardActive, Command::Next) => {
                self.controller.next_card();
                None
            }
            (ViewPhase::FlashcardActive, Command::Previous) => {
                self.controller.previous_card();
                None
            }
            (ViewPhase::QuizAnswering | ViewPhase::QuizReviewing | ViewPhase::FlashcardActive, Command::New) => {
                self.controller.start_new();
                None
            }
            (_, _) => Some("That command is not available right now. Type 'help'.".to_string()),
        };

        let screen = render(&self.controller);
        match notice {
            Some(notice) => format!("{}\n\n{}", notice, screen),
            None => screen,
        }
    }

    async fn generate(&mut self) {
        let Some(request) = self.controller.begin_generation() else {
            return;
        };
        if let Some(progress) = &self.progress {
            progress(&render(&self.controller));
        }
        let result = self.controller.orchestrator().submit(&request).await;
        self.controller.finish_generation(result);
    }

    fn edit_form(&mut self, command: Command) -> Option<String> {
        let form = self.controller.form_mut()?;
        match command {
            Command::Mode(mode) => form.mode = mode,
            Command::Topic(topic) => {
                if !form.set_topic(topic) {
                    return Some("Remove the attached file before typing a topic.".to_string());
                }
            }
            Command::ClearFile => {
                form.detach_file();
            }
            Command::Count(count) => form.item_count = count,
            Command::Difficulty(level) => {
                form.difficulty = match level {
                    Difficulty::Unspecified => None,
                    level => Some(level),
                }
            }
            _ => return Some("That command is not available right now. Type 'help'.".to_string()),
        }
        None
    }

    async fn history(&self) -> String {
        let user_id = self.controller.orchestrator().reports().user_id().to_string();
        match self.results.fetch_dashboard(&user_id).await {
            Ok(results) => render_dashboard(&results),
            Err(e) => {
                tracing::warn!(error = %e, "Could not load quiz history");
                "Could not load your quiz history.".to_string()
            }
        }
    }
}

fn help(phase: ViewPhase) -> &'static str {
    match phase {
        ViewPhase::Configuring => {
            "mode quiz|flashcard, topic <text>, file <path>, clear-file, count <3-15>, \
             difficulty <level|none>, generate, history, quit"
        }
        ViewPhase::Loading => "Generating content, please wait.",
        ViewPhase::QuizAnswering => "answer <question#> <option#>, submit, new, quit",
        ViewPhase::QuizReviewing => "new, quit",
        ViewPhase::FlashcardActive => "flip, next, prev, new, quit",
    }
}

pub fn render(controller: &SessionController) -> String {
    let mut out = String::new();
    match controller.phase() {
        ViewPhase::Configuring => {
            let form = controller.form();
            let _ = writeln!(out, "== EduGenie ==");
            let _ = writeln!(out, "Generating: {}", form.mode);
            let topic_state = if form.is_topic_locked() { " (locked by file)" } else { "" };
            let _ = writeln!(out, "Option 1, topic: {}{}", form.topic(), topic_state);
            match form.file() {
                Some(file) => {
                    let _ = writeln!(out, "Option 2, file: {} ({} bytes)", file.file_name, file.bytes.len());
                }
                None => {
                    let _ = writeln!(out, "Option 2, file: none (PDF, DOCX, PPTX)");
                }
            }
            let _ = writeln!(out, "{}: {}", form.mode.item_count_label(), form.item_count);
            let difficulty = form.difficulty.unwrap_or_default();
            let _ = writeln!(out, "Difficulty Level: {}", difficulty.label());
            if let Some(error) = controller.error() {
                let _ = writeln!(out, "Error: {}", error);
            }
        }
        ViewPhase::Loading => {
            let _ = writeln!(
                out,
                "Generating {} from \"{}\"...",
                controller.form().mode,
                controller.loading_source().unwrap_or_default()
            );
        }
        ViewPhase::QuizAnswering => {
            if let Some(quiz) = controller.quiz() {
                let _ = writeln!(out, "Quiz on: {}", quiz.source_name());
                let _ = writeln!(out, "Select the best answer for each question below.");
                for (index, (question, answer)) in quiz.questions().iter().zip(quiz.answers()).enumerate() {
                    let _ = writeln!(out, "\n{}. {}", index + 1, question.prompt);
                    for (number, option) in question.options.iter().enumerate() {
                        let marker = if answer.as_deref() == Some(option.as_str()) { "(x)" } else { "( )" };
                        let _ = writeln!(out, "   {} {}. {}", marker, number + 1, option);
                    }
                }
                let _ = writeln!(
                    out,
                    "\nAnswered {} of {}. Type 'submit' to see results.",
                    quiz.answered_count(),
                    quiz.questions().len()
                );
            }
        }
        ViewPhase::QuizReviewing => {
            if let Some(quiz) = controller.quiz() {
                let summary = quiz.score();
                let status = match quiz.outcome() {
                    QuizOutcome::Passed => "Well done!",
                    QuizOutcome::NeedsReview => "Keep practising.",
                };
                let _ = writeln!(out, "Quiz on \"{}\" Complete! {}", quiz.source_name(), status);
                let _ = writeln!(out, "You scored {} out of {}", summary.score, summary.total);
                let _ = writeln!(out, "\nReview Your Answers");
                for review in quiz.review_state() {
                    let verdict = if review.is_correct { "correct" } else { "incorrect" };
                    let _ = writeln!(out, "\n{}. {} [{}]", review.number, review.prompt, verdict);
                    for option in &review.options {
                        let mark = match (option.is_correct_choice, option.is_user_choice) {
                            (true, _) => " [right answer]",
                            (false, true) => " [your answer]",
                            (false, false) => "",
                        };
                        let _ = writeln!(out, "   - {}{}", option.text, mark);
                    }
                    let _ = writeln!(out, "   Explanation: {}", review.explanation);
                }
            }
        }
        ViewPhase::FlashcardActive => {
            if let Some(deck) = controller.flashcards() {
                let _ = writeln!(out, "Flashcards on: {}", deck.source_name());
                match deck.current_face() {
                    CardFace::Term(term) => {
                        let _ = writeln!(out, "\n  [ {} ]\n", term);
                    }
                    CardFace::Definition(definition) => {
                        let _ = writeln!(out, "\n  ( {} )\n", definition);
                    }
                }
                let position = deck.position();
                let _ = writeln!(out, "Card {} of {}", position.number, position.total);
            }
        }
    }
    out.trim_end().to_string()
}

pub fn render_dashboard(results: &[QuizResultReport]) -> String {
    if results.is_empty() {
        return "No quiz results recorded yet.".to_string();
    }
    let mut out = String::from("Your quiz history:");
    for result in results {
        let _ = write!(
            out,
            "\n  {}: {}/{}",
            result.topic, result.score, result.total_questions
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_configuring_commands() {
        assert_eq!(parse_command("mode flashcard"), Ok(Command::Mode(GenerationMode::Flashcard)));
        assert_eq!(
            parse_command("topic  The Krebs Cycle "),
            Ok(Command::Topic("The Krebs Cycle".to_string()))
        );
        assert_eq!(parse_command("file notes.pdf"), Ok(Command::File(PathBuf::from("notes.pdf"))));
        assert_eq!(parse_command("count 7"), Ok(Command::Count("7".to_string())));
        assert_eq!(parse_command("difficulty none"), Ok(Command::Difficulty(Difficulty::Unspecified)));
        assert_eq!(parse_command("difficulty phd"), Ok(Command::Difficulty(Difficulty::PhdLevel)));
        assert_eq!(parse_command("GENERATE"), Ok(Command::Generate));
    }

    #[test]
    fn test_parse_session_commands() {
        assert_eq!(
            parse_command("answer 2 3"),
            Ok(Command::Answer { question: 2, option: 3 })
        );
        assert_eq!(parse_command("prev"), Ok(Command::Previous));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_command("mode"), Err(CommandError::MissingArgument("mode")));
        assert_eq!(parse_command("answer 2"), Err(CommandError::MissingArgument("answer")));
        assert_eq!(
            parse_command("answer 0 1"),
            Err(CommandError::InvalidNumber("0".to_string()))
        );
        assert!(matches!(parse_command("mode essay"), Err(CommandError::Invalid(_))));
        assert_eq!(parse_command("dance"), Err(CommandError::Unknown("dance".to_string())));
    }

    #[test]
    fn test_render_dashboard() {
        assert_eq!(render_dashboard(&[]), "No quiz results recorded yet.");
        let results = vec![QuizResultReport {
            user_id: "u".to_string(),
            topic: "Cell Biology".to_string(),
            score: 4,
            total_questions: 5,
        }];
        assert_eq!(render_dashboard(&results), "Your quiz history:\n  Cell Biology: 4/5");
    }
}
