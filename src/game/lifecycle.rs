//! Guess resolution state machine
//!
//! ```text
//! Loading -> AwaitingGuess -> Advancing -> AwaitingGuess ...
//!                  |              |
//!                  v              v
//!              GameOver       AllGuessed
//! ```

use serde::{Deserialize, Serialize};

/// A click on the map, as reported by the rendering surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickedRegion {
    pub name: String,
    pub code: Option<String>,
    pub alt_code: Option<String>,
}

impl ClickedRegion {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: None,
            alt_code: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuessPhase {
    /// Loader showing; input ignored
    Loading,
    AwaitingGuess,
    /// Correct guess made; next country pending
    Advancing,
    GameOver,
    AllGuessed,
}

/// What a resolved click did to the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Correct,
    Incorrect { guesses_remaining: u32 },
    /// Incorrect, and it was the last allowed guess
    OutOfGuesses,
}

#[derive(Debug, Clone)]
pub struct GuessLifecycle {
    phase: GuessPhase,
    guesses_remaining: u32,
    attempts: u32,
}

impl GuessLifecycle {
    pub fn new(guesses: u32) -> Self {
        Self {
            phase: GuessPhase::Loading,
            guesses_remaining: guesses,
            attempts: 0,
        }
    }

    pub fn phase(&self) -> GuessPhase {
        self.phase
    }

    pub fn guesses_remaining(&self) -> u32 {
        self.guesses_remaining
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn accepts_guess(&self) -> bool {
        self.phase == GuessPhase::AwaitingGuess
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, GuessPhase::GameOver | GuessPhase::AllGuessed)
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GuessPhase::GameOver
    }

    /// Loader finished
    pub fn ready(&mut self) -> bool {
        if self.phase != GuessPhase::Loading {
            return false;
        }
        self.phase = GuessPhase::AwaitingGuess;
        true
    }

    /// Resolve a guess; `None` when no guess is expected right now
    pub fn resolve(&mut self, correct: bool) -> Option<Resolution> {
        if !self.accepts_guess() {
            return None;
        }
        self.attempts += 1;

        if correct {
            self.phase = GuessPhase::Advancing;
            return Some(Resolution::Correct);
        }

        self.guesses_remaining = self.guesses_remaining.saturating_sub(1);
        if self.guesses_remaining == 0 {
            self.phase = GuessPhase::GameOver;
            Some(Resolution::OutOfGuesses)
        } else {
            Some(Resolution::Incorrect {
                guesses_remaining: self.guesses_remaining,
            })
        }
    }

    /// Next country is in place after a correct guess
    pub fn next_round(&mut self) -> bool {
        if self.phase != GuessPhase::Advancing {
            return false;
        }
        self.phase = GuessPhase::AwaitingGuess;
        true
    }

    /// Player gives up; only while a guess is expected
    pub fn forfeit(&mut self) -> bool {
        if !self.accepts_guess() {
            return false;
        }
        self.phase = GuessPhase::GameOver;
        true
    }

    /// Countdown expiry; false if the game already ended
    pub fn force_game_over(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.phase = GuessPhase::GameOver;
        true
    }

    pub fn all_guessed(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.phase = GuessPhase::AllGuessed;
        true
    }
}
