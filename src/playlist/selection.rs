use crate::models::Track;
use rand::Rng;
use rand::seq::SliceRandom;

/// A phase may overshoot its target by this factor
pub const QUOTA_CEILING: f64 = 1.2;

/// A phase stops accepting once it reaches this fraction of its target
pub const QUOTA_FLOOR: f64 = 0.8;

/// Quota-based track picking for a single phase
pub struct QuotaSelection;

impl QuotaSelection {
    /// Greedily accept shuffled candidates until the phase reaches 80% of its
    /// target, never exceeding 120%. The incoming order is discarded by the
    /// shuffle. Falls back to a single track when nothing fits.
    pub fn select_tracks<'a, R: Rng + ?Sized>(
        mut candidates: Vec<&'a Track>,
        target_duration_ms: u64,
        rng: &mut R,
    ) -> Vec<&'a Track> {
        candidates.shuffle(rng);

        let ceiling = target_duration_ms as f64 * QUOTA_CEILING;
        let floor = target_duration_ms as f64 * QUOTA_FLOOR;

        let mut selected = Vec::new();
        let mut current_duration: u64 = 0;

        for track in &candidates {
            if (current_duration + track.duration_ms) as f64 <= ceiling {
                selected.push(*track);
                current_duration += track.duration_ms;

                if current_duration as f64 >= floor {
                    break;
                }
            }
        }

        if selected.is_empty() {
            if let Some(first) = candidates.first() {
                selected.push(*first);
            }
        }

        selected
    }
}
