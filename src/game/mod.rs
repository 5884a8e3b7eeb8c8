//! Game state: the map guessing game, flag rounds and the session that
//! composes them

pub mod controls;
pub mod events;
pub mod flags;
pub mod lifecycle;
pub mod markers;
pub mod requests;
pub mod score;
pub mod selector;
pub mod session;

pub use controls::Controls;
pub use events::{GameEvent, Mode};
pub use flags::{ChoiceMark, FlagChoice, FlagRound, FlagRoundManager, RoundToken};
pub use lifecycle::{ClickedRegion, GuessLifecycle, GuessPhase, Resolution};
pub use markers::{Marker, MarkerBook, MarkerError};
pub use requests::{LookupApplied, LookupPurpose, LookupRequest, LookupToken};
pub use score::{ScoreTracker, ScoreUpdate};
pub use selector::{CountrySelector, Selection};
pub use session::GameSession;
