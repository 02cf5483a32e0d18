use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{FlashcardItem, FlashcardPayload};
use crate::reporting::ReportDispatcher;

// Import logging macros
use crate::{log_session_event, log_session_ignored};

const SESSION_KIND: &str = "flashcard";

/// The face currently shown for the card under the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardFace<'a> {
    Term(&'a str),
    Definition(&'a str),
}

/// "Card {number} of {total}"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardPosition {
    pub number: usize,
    pub total: usize,
}

/// A generated flashcard deck being studied.
///
/// The completion report goes out the first time the cursor rests on the
/// last card; `reported` never reverts, so revisiting the last card is
/// silent. The deck stays navigable after completion.
#[derive(Debug)]
pub struct FlashcardSession {
    id: Uuid,
    source_name: String,
    cards: Vec<FlashcardItem>,
    cursor: usize,
    revealed: bool,
    reported: bool,
    created_at: DateTime<Utc>,
    reports: ReportDispatcher,
}

impl FlashcardSession {
    /// Returns `None` for an empty deck.
    pub fn new(payload: FlashcardPayload, reports: ReportDispatcher) -> Option<Self> {
        if payload.flashcards.is_empty() {
            return None;
        }
        let mut session = Self {
            id: Uuid::new_v4(),
            source_name: payload.source_name,
            cards: payload.flashcards,
            cursor: 0,
            revealed: false,
            reported: false,
            created_at: Utc::now(),
            reports,
        };
        log_session_event!(SESSION_KIND, session_id = session.id, "session started");
        // a single-card deck is complete on arrival
        session.check_completion();
        Some(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn cards(&self) -> &[FlashcardItem] {
        &self.cards
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn is_reported(&self) -> bool {
        self.reported
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Milliseconds since the session was created
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.created_at).num_milliseconds()
    }

    pub fn is_first(&self) -> bool {
        self.cursor == 0
    }

    pub fn is_last(&self) -> bool {
        self.cursor == self.cards.len() - 1
    }

    pub fn position(&self) -> CardPosition {
        CardPosition {
            number: self.cursor + 1,
            total: self.cards.len(),
        }
    }

    pub fn current_card(&self) -> &FlashcardItem {
        &self.cards[self.cursor]
    }

    pub fn current_face(&self) -> CardFace<'_> {
        let card = self.current_card();
        if self.revealed {
            CardFace::Definition(&card.definition)
        } else {
            CardFace::Term(&card.term)
        }
    }

    pub fn flip(&mut self) {
        self.revealed = !self.revealed;
    }

    /// Advance one card. Returns false at the last card.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            log_session_ignored!(SESSION_KIND, session_id = self.id, "next", "already at last card");
            return false;
        }
        self.move_to(self.cursor + 1);
        true
    }

    /// Go back one card. Returns false at the first card.
    pub fn previous(&mut self) -> bool {
        if self.is_first() {
            log_session_ignored!(SESSION_KIND, session_id = self.id, "previous", "already at first card");
            return false;
        }
        self.move_to(self.cursor - 1);
        true
    }

    fn move_to(&mut self, cursor: usize) {
        self.cursor = cursor;
        self.revealed = false;
        log_session_event!(SESSION_KIND, session_id = self.id, position = self.cursor + 1, "moved to card");
        self.check_completion();
    }

    fn check_completion(&mut self) {
        if !self.is_last() || self.reported {
            return;
        }
        self.reported = true;
        log_session_event!(
            SESSION_KIND,
            session_id = self.id,
            duration_ms = self.elapsed_ms(),
            "last card reached"
        );
        self.reports.dispatch(
            self.reports
                .flashcard_session(&self.source_name, self.cards.len() as u32),
        );
    }
}
