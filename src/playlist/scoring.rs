use super::PhaseCriteria;
use crate::models::Track;
use rand::Rng;

/// Score added per distinct keyword hit
pub const KEYWORD_WEIGHT: f64 = 2.0;

/// Upper bound (exclusive) of the random jitter added to every score
pub const MAX_JITTER: f64 = 0.5;

/// A candidate paired with its phase score
#[derive(Debug, Clone)]
pub struct ScoredTrack<'a> {
    pub track: &'a Track,
    pub score: f64,
}

/// Phase scoring functionality
pub struct PhaseScoring;

impl PhaseScoring {
    /// Number of distinct configured keywords found in name + artists, weighted
    pub fn keyword_score(track: &Track, criteria: &PhaseCriteria) -> f64 {
        let Some(keywords) = criteria.active_keywords() else {
            return 0.0;
        };

        let text = track.search_text();
        let mut matched: Vec<String> = keywords
            .iter()
            .map(|keyword| keyword.to_lowercase())
            .filter(|keyword| text.contains(keyword.as_str()))
            .collect();
        matched.sort();
        matched.dedup();

        matched.len() as f64 * KEYWORD_WEIGHT
    }

    /// 1.0 at the midpoint of the duration range, falling to 0.0 at its edges
    pub fn duration_fit_score(track: &Track, criteria: &PhaseCriteria) -> f64 {
        let Some((min_ms, max_ms)) = criteria.duration_range else {
            return 0.0;
        };

        let midpoint = (min_ms as f64 + max_ms as f64) / 2.0;
        let half_width = (max_ms as f64 - min_ms as f64) / 2.0;
        let distance = (track.duration_ms as f64 - midpoint).abs();

        if half_width <= 0.0 {
            // Degenerate range: only the midpoint itself fits
            return if distance == 0.0 { 1.0 } else { 0.0 };
        }

        let normalized_distance = (distance / half_width).clamp(0.0, 1.0);
        1.0 - normalized_distance
    }

    /// Score without the random component
    pub fn base_score(track: &Track, criteria: &PhaseCriteria) -> f64 {
        Self::keyword_score(track, criteria) + Self::duration_fit_score(track, criteria)
    }

    /// Full phase score including jitter in [0, 0.5)
    pub fn calculate_phase_score<R: Rng + ?Sized>(
        track: &Track,
        criteria: &PhaseCriteria,
        rng: &mut R,
    ) -> f64 {
        Self::base_score(track, criteria) + rng.gen_range(0.0..MAX_JITTER)
    }

    /// Score every candidate and sort by descending score
    pub fn rank_candidates<'a, R: Rng + ?Sized>(
        candidates: Vec<&'a Track>,
        criteria: &PhaseCriteria,
        rng: &mut R,
    ) -> Vec<ScoredTrack<'a>> {
        let mut scored: Vec<ScoredTrack<'a>> = candidates
            .into_iter()
            .map(|track| ScoredTrack {
                track,
                score: Self::calculate_phase_score(track, criteria, rng),
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }
}
