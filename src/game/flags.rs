//! Flag-matching mini game
//!
//! A round shows one country name and three flags. Rounds are assembled
//! asynchronously: each of the three picks needs its detail (flag image)
//! looked up first, and a pick whose lookup fails is swapped for another.

use ahash::AHashSet;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::CountryCatalog;
use crate::core::error::{GeoError, Result};
use crate::core::types::{CountryId, GuessOutcome};
use crate::lookup::CountryDetail;

pub const CHOICES_PER_ROUND: usize = 3;

/// Identity of one round, used to discard lookups for replaced rounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundToken(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoiceMark {
    Unmarked,
    Correct,
    Wrong,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagChoice {
    pub country: CountryId,
    pub detail: CountryDetail,
    pub mark: ChoiceMark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagRound {
    pub token: RoundToken,
    pub choices: Vec<FlagChoice>,
    target: usize,
    resolved: bool,
}

impl FlagRound {
    pub fn target(&self) -> &FlagChoice {
        &self.choices[self.target]
    }

    pub fn target_country(&self) -> CountryId {
        self.target().country
    }

    /// Name the player is asked to find
    pub fn target_name(&self) -> &str {
        &self.target().detail.common_name
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }
}

/// A pick that needs its detail looked up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagPick {
    pub round: RoundToken,
    pub country: CountryId,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlagResolution {
    pub outcome: GuessOutcome,
    pub target: CountryId,
    pub clicked: CountryId,
}

/// What a completed lookup did to the round being assembled
#[derive(Debug, Clone, PartialEq)]
pub enum FlagProgress {
    /// Still waiting for other picks
    Waiting,
    /// The failed pick was replaced; look this one up next
    Resample(FlagPick),
    /// All three picks are in; the round is live
    Ready,
    /// Ran out of countries with usable detail
    Failed,
    /// Lookup belonged to a round that no longer exists
    Stale,
}

#[derive(Debug, Clone)]
struct Slot {
    country: CountryId,
    detail: Option<CountryDetail>,
}

#[derive(Debug, Clone)]
struct PendingRound {
    token: RoundToken,
    slots: Vec<Slot>,
    tried: AHashSet<CountryId>,
}

#[derive(Debug, Default, Clone)]
pub struct FlagRoundManager {
    round: Option<FlagRound>,
    pending: Option<PendingRound>,
    next_token: u64,
}

impl FlagRoundManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&FlagRound> {
        self.round.as_ref()
    }

    /// A resolved round ignores input until it is replaced
    pub fn is_locked(&self) -> bool {
        self.round.as_ref().is_some_and(|r| r.resolved)
    }

    /// Drop the live round and anything being assembled
    pub fn clear(&mut self) {
        self.round = None;
        self.pending = None;
    }

    /// Start assembling a new round, replacing any previous one
    ///
    /// Picks three distinct countries by rejection sampling; countries
    /// without any ISO code are swapped out before a lookup is issued.
    pub fn start_round<R: Rng + ?Sized>(
        &mut self,
        catalog: &CountryCatalog,
        rng: &mut R,
    ) -> Result<Vec<FlagPick>> {
        self.clear();
        if catalog.len() < CHOICES_PER_ROUND {
            return Err(GeoError::DataUnavailable(format!(
                "flag rounds need {} countries, catalog has {}",
                CHOICES_PER_ROUND,
                catalog.len()
            )));
        }

        let token = RoundToken(self.next_token);
        self.next_token += 1;

        let mut picked: Vec<CountryId> = Vec::with_capacity(CHOICES_PER_ROUND);
        while picked.len() < CHOICES_PER_ROUND {
            let id = CountryId(rng.gen_range(0..catalog.len()) as u32);
            if !picked.contains(&id) {
                picked.push(id);
            }
        }

        let mut pending = PendingRound {
            token,
            slots: Vec::with_capacity(CHOICES_PER_ROUND),
            tried: picked.iter().copied().collect(),
        };

        let mut picks = Vec::with_capacity(CHOICES_PER_ROUND);
        for id in picked {
            let pick = match lookup_pick(catalog, token, id) {
                Some(pick) => pick,
                None => resample(&mut pending, catalog, rng).ok_or_else(|| {
                    GeoError::DataUnavailable("no countries with ISO codes".into())
                })?,
            };
            pending.slots.push(Slot {
                country: pick.country,
                detail: None,
            });
            picks.push(pick);
        }

        tracing::debug!("Assembling flag round {:?}", token);
        self.pending = Some(pending);
        Ok(picks)
    }

    /// Feed a completed lookup into the round being assembled
    pub fn on_detail<R: Rng + ?Sized>(
        &mut self,
        token: RoundToken,
        country: CountryId,
        detail: Option<CountryDetail>,
        catalog: &CountryCatalog,
        rng: &mut R,
    ) -> FlagProgress {
        let Some(pending) = self.pending.as_mut().filter(|p| p.token == token) else {
            return FlagProgress::Stale;
        };
        let Some(slot_idx) = pending
            .slots
            .iter()
            .position(|s| s.country == country && s.detail.is_none())
        else {
            return FlagProgress::Stale;
        };

        match detail {
            Some(detail) => {
                pending.slots[slot_idx].detail = Some(detail);
            }
            None => {
                tracing::debug!("No flag detail for {}, resampling", country);
                return match resample(pending, catalog, rng) {
                    Some(pick) => {
                        pending.slots[slot_idx].country = pick.country;
                        FlagProgress::Resample(pick)
                    }
                    None => {
                        tracing::warn!("Flag round {:?} abandoned: no usable countries left", token);
                        self.pending = None;
                        FlagProgress::Failed
                    }
                };
            }
        }

        if pending.slots.iter().any(|s| s.detail.is_none()) {
            return FlagProgress::Waiting;
        }

        let Some(pending) = self.pending.take() else {
            return FlagProgress::Stale;
        };
        let choices: Vec<FlagChoice> = pending
            .slots
            .into_iter()
            .filter_map(|s| {
                s.detail.map(|detail| FlagChoice {
                    country: s.country,
                    detail,
                    mark: ChoiceMark::Unmarked,
                })
            })
            .collect();
        let target = rng.gen_range(0..choices.len());
        self.round = Some(FlagRound {
            token,
            choices,
            target,
            resolved: false,
        });
        FlagProgress::Ready
    }

    /// Resolve a click on a flag by code; `None` if ignored
    pub fn resolve_guess(&mut self, clicked_code: &str) -> Option<FlagResolution> {
        if self.is_locked() {
            return None;
        }
        let round = self.round.as_mut()?;
        let clicked = round
            .choices
            .iter()
            .position(|c| c.detail.has_code(clicked_code))?;

        let outcome = if clicked == round.target {
            GuessOutcome::Correct
        } else {
            GuessOutcome::Incorrect
        };

        for (i, choice) in round.choices.iter_mut().enumerate() {
            choice.mark = if i == round.target {
                ChoiceMark::Correct
            } else {
                ChoiceMark::Wrong
            };
        }
        round.resolved = true;

        Some(FlagResolution {
            outcome,
            target: round.choices[round.target].country,
            clicked: round.choices[clicked].country,
        })
    }
}

fn lookup_pick(catalog: &CountryCatalog, round: RoundToken, id: CountryId) -> Option<FlagPick> {
    let code = catalog.get(id)?.iso.lookup_code()?;
    Some(FlagPick {
        round,
        country: id,
        code: code.to_string(),
    })
}

/// Draw a fresh country not yet tried this round that has a lookup code
fn resample<R: Rng + ?Sized>(
    pending: &mut PendingRound,
    catalog: &CountryCatalog,
    rng: &mut R,
) -> Option<FlagPick> {
    loop {
        let candidates: Vec<CountryId> = catalog
            .iter()
            .map(|c| c.id)
            .filter(|id| !pending.tried.contains(id))
            .collect();
        let id = *candidates.choose(rng)?;
        pending.tried.insert(id);
        if let Some(pick) = lookup_pick(catalog, pending.token, id) {
            return Some(pick);
        }
    }
}
