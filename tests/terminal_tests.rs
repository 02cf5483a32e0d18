mod common;

use common::*;
use edugenie::ViewPhase;
use edugenie::terminal::{Flow, Terminal};
use std::sync::{Arc, Mutex};

fn terminal(h: Harness) -> Terminal {
    Terminal::new(h.controller, h.results)
}

async fn run(terminal: &mut Terminal, line: &str) -> String {
    match terminal.handle_line(line).await {
        Flow::Continue(output) => output,
        Flow::Quit => panic!("unexpected quit on '{}'", line),
    }
}

#[tokio::test]
async fn test_quiz_round_trip() {
    let h = harness();
    h.generation.respond(cell_biology_quiz());
    let generation = h.generation.clone();
    let mut terminal = terminal(h);

    let screen = run(&mut terminal, "topic Cell Biology").await;
    assert!(screen.contains("Option 1, topic: Cell Biology"));

    let screen = run(&mut terminal, "generate").await;
    assert_eq!(terminal.controller().phase(), ViewPhase::QuizAnswering);
    assert!(screen.contains("Quiz on: Cell Biology"));
    assert_eq!(generation.requests().len(), 1);

    let screen = run(&mut terminal, "answer 1 2").await;
    assert!(screen.contains("(x) 2. Mitochondria"));
    assert!(screen.contains("Answered 1 of 5"));

    let screen = run(&mut terminal, "answer 1 9").await;
    assert!(screen.starts_with("There is no option 9 for question 1."));

    let screen = run(&mut terminal, "submit").await;
    assert_eq!(terminal.controller().phase(), ViewPhase::QuizReviewing);
    assert!(screen.contains("You scored 1 out of 5"));
    assert!(screen.contains("Keep practising."));

    let screen = run(&mut terminal, "answer 2 1").await;
    assert!(screen.starts_with("That command is not available right now."));

    settle().await;
    let screen = run(&mut terminal, "new").await;
    assert_eq!(terminal.controller().phase(), ViewPhase::Configuring);
    assert!(screen.contains("== EduGenie =="));

    let screen = run(&mut terminal, "history").await;
    assert!(screen.contains("Cell Biology: 1/5"));
}

#[tokio::test]
async fn test_flashcard_navigation() {
    let h = harness();
    h.generation.respond(flashcard_deck("Cell Biology", 2));
    let mut terminal = terminal(h);

    run(&mut terminal, "mode flashcard").await;
    run(&mut terminal, "topic Cell Biology").await;
    let screen = run(&mut terminal, "generate").await;
    assert!(screen.contains("[ Term 1 ]"));
    assert!(screen.contains("Card 1 of 2"));

    let screen = run(&mut terminal, "flip").await;
    assert!(screen.contains("( Definition 1 )"));

    let screen = run(&mut terminal, "next").await;
    assert!(screen.contains("[ Term 2 ]"));
    assert!(screen.contains("Card 2 of 2"));

    let screen = run(&mut terminal, "submit").await;
    assert!(screen.starts_with("That command is not available right now."));
}

#[tokio::test]
async fn test_configuration_errors_are_shown() {
    let h = harness();
    let mut terminal = terminal(h);

    let screen = run(&mut terminal, "generate").await;
    assert!(screen.contains("Error: Please either enter a topic or upload a file."));

    let screen = run(&mut terminal, "count many").await;
    assert!(screen.contains("Number of Questions: many"));
    run(&mut terminal, "topic Mitosis").await;
    let screen = run(&mut terminal, "generate").await;
    assert!(screen.contains("Error: Item count must be a number, got 'many'."));

    let screen = run(&mut terminal, "file /definitely/not/here.pdf").await;
    assert!(screen.starts_with("Could not read '/definitely/not/here.pdf'"));

    let screen = run(&mut terminal, "mode essay").await;
    assert_eq!(screen, "Unknown generation mode 'essay'.");

    assert_eq!(terminal.handle_line("quit").await, Flow::Quit);
}

#[tokio::test]
async fn test_loading_screen_is_shown_while_generating() {
    let h = harness();
    h.generation.respond(flashcard_deck("Cell Biology", 3));
    let shown = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = shown.clone();
    let mut terminal = terminal(h).with_progress(move |screen| {
        sink.lock().unwrap().push(screen.to_string());
    });

    run(&mut terminal, "mode flashcard").await;
    run(&mut terminal, "topic Cell Biology").await;
    let screen = run(&mut terminal, "generate").await;

    assert_eq!(
        *shown.lock().unwrap(),
        vec!["Generating flashcard from \"Cell Biology\"...".to_string()]
    );
    assert!(screen.contains("Card 1 of 3"));

    // a rejected form never reaches Loading
    run(&mut terminal, "new").await;
    run(&mut terminal, "generate").await;
    assert_eq!(shown.lock().unwrap().len(), 1);
}
