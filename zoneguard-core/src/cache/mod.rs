//! cache — opt-in cross-frame verdict hold
//!
//! Helmet detections flicker: a worker wearing a helmet can lose the helmet
//! box for a frame or two.  With a hold configured, a track that was matched
//! to a helmet keeps its compliant verdict until the next periodic reset,
//! every `period` frames of its stream.
//!
//! Without a hold the engine is purely frame-local.

use std::collections::HashSet;

use tracing::debug;

#[derive(Debug, Clone)]
pub struct VerdictCache {
    compliant: HashSet<u64>,
    period: u32,
    remaining: u32,
}

impl VerdictCache {
    pub fn new(period: u32) -> Self {
        let period = period.max(1);
        Self {
            compliant: HashSet::new(),
            period,
            remaining: period,
        }
    }

    pub fn remember(&mut self, track_id: u64) {
        self.compliant.insert(track_id);
    }

    pub fn holds(&self, track_id: u64) -> bool {
        self.compliant.contains(&track_id)
    }

    pub fn len(&self) -> usize {
        self.compliant.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compliant.is_empty()
    }

    /// Advance one frame.  Returns `true` when this frame triggered a reset.
    pub fn tick(&mut self) -> bool {
        self.remaining -= 1;
        if self.remaining > 0 {
            return false;
        }
        debug!(evicted = self.compliant.len(), "verdict hold reset");
        self.compliant.clear();
        self.remaining = self.period;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remembers_until_reset() {
        let mut cache = VerdictCache::new(3);
        cache.remember(7);
        assert!(cache.holds(7));
        assert!(!cache.tick());
        assert!(!cache.tick());
        assert!(cache.holds(7));
        assert!(cache.tick());
        assert!(!cache.holds(7));
        assert!(cache.is_empty());
    }

    #[test]
    fn reset_cadence_repeats() {
        let mut cache = VerdictCache::new(2);
        let resets: Vec<bool> = (0..6).map(|_| cache.tick()).collect();
        assert_eq!(resets, vec![false, true, false, true, false, true]);
    }

    #[test]
    fn zero_period_resets_every_frame() {
        let mut cache = VerdictCache::new(0);
        cache.remember(1);
        assert!(cache.tick());
        assert_eq!(cache.len(), 0);
    }
}
