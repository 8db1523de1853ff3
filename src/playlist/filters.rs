use super::{PhaseCriteria, PhaseDefinition};
use crate::models::Track;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Number of random tracks a phase receives when nothing matches its criteria
pub const FALLBACK_TRACK_COUNT: usize = 2;

/// Phase candidate filtering using static helper functions
pub struct PhaseFilters;

impl PhaseFilters {
    /// Check if a track lies within the phase's inclusive duration range
    pub fn matches_duration_range(track: &Track, criteria: &PhaseCriteria) -> bool {
        // If no duration range is set, accept all tracks
        let Some((min_ms, max_ms)) = criteria.duration_range else {
            return true;
        };

        track.duration_ms >= min_ms && track.duration_ms <= max_ms
    }

    /// Check if any keyword appears in the track name or artist names
    pub fn matches_keywords(track: &Track, criteria: &PhaseCriteria) -> bool {
        let Some(keywords) = criteria.active_keywords() else {
            return true;
        };

        let text = track.search_text();
        keywords
            .iter()
            .any(|keyword| text.contains(&keyword.to_lowercase()))
    }

    /// Both constraints must pass when both are configured
    pub fn matches_phase_criteria(track: &Track, criteria: &PhaseCriteria) -> bool {
        Self::matches_duration_range(track, criteria) && Self::matches_keywords(track, criteria)
    }

    /// Unconsumed tracks satisfying the phase's criteria
    pub fn candidates_for_phase<'a>(
        pool: &'a [Track],
        phase: &PhaseDefinition,
        consumed: &HashSet<String>,
    ) -> Vec<&'a Track> {
        pool.iter()
            .filter(|track| !consumed.contains(&track.id))
            .filter(|track| Self::matches_phase_criteria(track, &phase.criteria))
            .collect()
    }

    /// Up to two tracks picked uniformly at random from the unconsumed pool
    pub fn fallback_tracks<'a, R: Rng + ?Sized>(
        pool: &'a [Track],
        consumed: &HashSet<String>,
        rng: &mut R,
    ) -> Vec<&'a Track> {
        let mut remaining: Vec<&Track> = pool
            .iter()
            .filter(|track| !consumed.contains(&track.id))
            .collect();
        remaining.shuffle(rng);
        remaining.truncate(FALLBACK_TRACK_COUNT);
        remaining
    }
}
