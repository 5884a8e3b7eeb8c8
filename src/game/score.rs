//! Score and persisted high score

use crate::storage::Preferences;

/// Outcome of a score increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreUpdate {
    pub score: u32,
    pub high_score: u32,
    pub high_score_raised: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreTracker {
    score: u32,
    high_score: u32,
}

impl ScoreTracker {
    /// Fresh score, high score read once from storage
    pub fn load(prefs: &Preferences) -> Self {
        Self {
            score: 0,
            high_score: prefs.high_score(),
        }
    }

    /// Add one point; a new high score is written through immediately
    pub fn increment(&mut self, prefs: &mut Preferences) -> ScoreUpdate {
        self.score += 1;
        let raised = self.score > self.high_score;
        if raised {
            self.high_score = self.score;
            prefs.set_high_score(self.high_score);
            tracing::info!("New high score: {}", self.high_score);
        }
        ScoreUpdate {
            score: self.score,
            high_score: self.high_score,
            high_score_raised: raised,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn current_high_score(&self) -> u32 {
        self.high_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_high_score_written_through() {
        let mut prefs = Preferences::new(Box::new(MemoryStore::new()));
        let mut tracker = ScoreTracker::load(&prefs);

        let update = tracker.increment(&mut prefs);
        assert_eq!(update.score, 1);
        assert!(update.high_score_raised);
        assert_eq!(prefs.high_score(), 1);
    }

    #[test]
    fn test_existing_high_score_not_lowered() {
        let mut prefs = Preferences::new(Box::new(MemoryStore::new()));
        prefs.set_high_score(5);
        let mut tracker = ScoreTracker::load(&prefs);
        assert_eq!(tracker.current_high_score(), 5);

        for _ in 0..3 {
            let update = tracker.increment(&mut prefs);
            assert!(!update.high_score_raised);
        }
        assert_eq!(prefs.high_score(), 5);

        for _ in 0..3 {
            tracker.increment(&mut prefs);
        }
        assert_eq!(tracker.score(), 6);
        assert_eq!(prefs.high_score(), 6);
    }
}
