//! Outbound detail lookups and the tokens that tie completions back
//!
//! Every lookup the session asks for carries a token. The purpose stored
//! under that token says which state the answer belongs to; when the
//! answer arrives the session checks that state is still current and
//! drops the answer otherwise.

use serde::{Deserialize, Serialize};

use crate::core::types::CountryId;
use crate::game::flags::RoundToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LookupToken(pub u64);

/// What a lookup is for, and which state it is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupPurpose {
    /// Facts for a correctly found country
    Trivia { epoch: u64, country: CountryId },
    /// Flag image replacing the name prompt on hard
    HardPrompt { epoch: u64, country: CountryId },
    /// Facts about the country the player failed to find
    GameOverInfo { epoch: u64, country: CountryId },
    /// One of the three choices of a flag round
    FlagChoice { round: RoundToken, country: CountryId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    pub token: LookupToken,
    pub code: String,
    pub purpose: LookupPurpose,
}

/// What the session did with a completed lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupApplied {
    Applied,
    /// The state the lookup was bound to has moved on
    Stale,
    /// Token was never issued or already completed
    Unknown,
}
