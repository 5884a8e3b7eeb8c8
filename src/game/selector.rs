//! Next-country selection without repeats

use ahash::AHashSet;
use rand::Rng;

use crate::core::types::CountryId;

/// Result of asking for the next country
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Selected(CountryId),
    /// Every catalog country has already been a target this session
    Exhausted,
}

/// Tracks which countries have been targets and which one is active
#[derive(Debug, Default, Clone)]
pub struct CountrySelector {
    guessed: AHashSet<CountryId>,
    active: Option<CountryId>,
}

impl CountrySelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw uniformly from the whole catalog, re-rolling repeats
    ///
    /// Duplicates are rejected before they are recorded, so `guessed`
    /// only ever grows by fresh ids.
    pub fn next<R: Rng + ?Sized>(&mut self, catalog_len: usize, rng: &mut R) -> Selection {
        if self.guessed.len() >= catalog_len {
            self.active = None;
            return Selection::Exhausted;
        }

        loop {
            let id = CountryId(rng.gen_range(0..catalog_len) as u32);
            if self.guessed.insert(id) {
                self.active = Some(id);
                tracing::debug!("Selected country {} ({} of {})", id, self.guessed.len(), catalog_len);
                return Selection::Selected(id);
            }
            tracing::trace!("Re-rolling duplicate pick {}", id);
        }
    }

    pub fn active(&self) -> Option<CountryId> {
        self.active
    }

    pub fn guessed_count(&self) -> usize {
        self.guessed.len()
    }
}
