//! Conversation session state.
//!
//! A session is an append-only turn log owned by exactly one client, plus a
//! two-state machine that admits at most one in-flight pipeline at a time.
//! Nothing is persisted; dropping the session discards it.

use crate::error::{CineMindError, Result};
use crate::metadata::EnrichedMovie;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

/// One entry in the conversation log. Immutable once created.
#[derive(Debug, Clone)]
pub struct Turn {
    /// Unique turn ID.
    pub id: Uuid,
    /// Who produced the turn.
    pub sender: Sender,
    /// Display text.
    pub text: String,
    /// Enriched movie cards (assistant turns only).
    pub movies: Vec<EnrichedMovie>,
    /// True when the pipeline fell back to an error message.
    pub failed: bool,
    /// When the turn was created.
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Create a user turn.
    pub fn user(text: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::User,
            text: text.to_string(),
            movies: Vec::new(),
            failed: false,
            created_at: Utc::now(),
        }
    }

    /// Create an assistant turn.
    pub fn assistant(text: String, movies: Vec<EnrichedMovie>, failed: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::Assistant,
            text,
            movies,
            failed,
            created_at: Utc::now(),
        }
    }
}

/// Session phases: Idle accepts a submission, AwaitingResponse rejects one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    AwaitingResponse,
}

/// An owned conversation session.
#[derive(Debug)]
pub struct Session {
    /// Unique session ID.
    pub id: Uuid,
    phase: SessionPhase,
    turns: Vec<Turn>,
    created_at: DateTime<Utc>,
}

impl Session {
    /// Create an empty session in the Idle phase.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: SessionPhase::Idle,
            turns: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether a pipeline is in flight for this session.
    pub fn is_awaiting(&self) -> bool {
        self.phase == SessionPhase::AwaitingResponse
    }

    /// The ordered turn log.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// When the session was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Record a user submission and enter AwaitingResponse.
    ///
    /// Rejects whitespace-only text, and rejects any submission while a
    /// response is already in flight, preserving deterministic turn order.
    /// Returns the trimmed text accepted for processing.
    pub fn submit(&mut self, text: &str) -> Result<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(CineMindError::InvalidInput(
                "submission text is empty".to_string(),
            ));
        }
        if self.is_awaiting() {
            return Err(CineMindError::Session(
                "a response is already in flight for this session".to_string(),
            ));
        }

        self.turns.push(Turn::user(trimmed));
        self.phase = SessionPhase::AwaitingResponse;
        Ok(trimmed.to_string())
    }

    /// Append the assistant turn for the in-flight submission and return to
    /// Idle. Both successful and fallback turns resolve the same way.
    pub fn complete(&mut self, turn: Turn) -> Result<&Turn> {
        if !self.is_awaiting() {
            return Err(CineMindError::Session(
                "no submission is in flight".to_string(),
            ));
        }
        if turn.sender != Sender::Assistant {
            return Err(CineMindError::Session(
                "only assistant turns complete a submission".to_string(),
            ));
        }

        self.turns.push(turn);
        self.phase = SessionPhase::Idle;
        Ok(self.turns.last().expect("turn was just appended"))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_transitions_to_awaiting() {
        let mut session = Session::new();
        assert_eq!(session.phase(), SessionPhase::Idle);

        let accepted = session.submit("  sci-fi like Interstellar  ").unwrap();
        assert_eq!(accepted, "sci-fi like Interstellar");
        assert!(session.is_awaiting());
        assert_eq!(session.turns().len(), 1);
        assert_eq!(session.turns()[0].sender, Sender::User);
    }

    #[test]
    fn test_empty_submission_rejected() {
        let mut session = Session::new();
        assert!(session.submit("   ").is_err());
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.turns().is_empty());
    }

    #[test]
    fn test_overlapping_submission_rejected() {
        let mut session = Session::new();
        session.submit("first").unwrap();

        let err = session.submit("second").unwrap_err();
        assert!(matches!(err, CineMindError::Session(_)));
        assert_eq!(session.turns().len(), 1);
    }

    #[test]
    fn test_success_and_fallback_both_resolve_to_idle() {
        let mut session = Session::new();

        session.submit("first").unwrap();
        session
            .complete(Turn::assistant("Try this.".to_string(), vec![], false))
            .unwrap();
        assert_eq!(session.phase(), SessionPhase::Idle);

        session.submit("second").unwrap();
        let turn = session
            .complete(Turn::assistant("Service is down.".to_string(), vec![], true))
            .unwrap();
        assert!(turn.failed);
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert_eq!(session.turns().len(), 4);
    }

    #[test]
    fn test_complete_without_submission_rejected() {
        let mut session = Session::new();
        let result = session.complete(Turn::assistant("hi".to_string(), vec![], false));
        assert!(result.is_err());
    }

    #[test]
    fn test_user_turn_cannot_complete_submission() {
        let mut session = Session::new();
        session.submit("first").unwrap();
        assert!(session.complete(Turn::user("nope")).is_err());
        assert!(session.is_awaiting());
    }
}
