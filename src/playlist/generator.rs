use super::filters::PhaseFilters;
use super::metadata::recalculate_phase_breakdown;
use super::scoring::PhaseScoring;
use super::selection::QuotaSelection;
use super::trimming::DurationTrimming;
use super::{GeneratedPlaylist, PhaseBreakdown, PhaseDefinition, PlaylistConfig};
use crate::error::AssembleError;
use crate::models::Track;
use log::{debug, warn};
use rand::Rng;
use std::collections::HashSet;

/// Main playlist generator
pub struct PlaylistGenerator {
    config: PlaylistConfig,
}

impl PlaylistGenerator {
    pub fn new(config: PlaylistConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlaylistConfig {
        &self.config
    }

    /// Assemble a phase-structured playlist from the candidate pool.
    ///
    /// Phases run in configured order and never see tracks claimed by an
    /// earlier phase. The combined selection is then trimmed toward the
    /// configured total and the breakdown is recomputed from what survived.
    pub fn generate_playlist<R: Rng + ?Sized>(
        &self,
        pool: &[Track],
        playlist_name: String,
        rng: &mut R,
    ) -> Result<GeneratedPlaylist, AssembleError> {
        if pool.is_empty() {
            return Err(AssembleError::EmptyPool);
        }

        let pool = Self::unique_tracks(pool);
        let pool = pool.as_slice();

        let mut selected: Vec<&Track> = Vec::new();
        let mut consumed: HashSet<String> = HashSet::new();
        let mut phase_breakdown: Vec<PhaseBreakdown> = Vec::new();

        for phase in &self.config.phases {
            let phase_tracks = Self::select_tracks_for_phase(pool, phase, &consumed, rng);

            if phase_tracks.is_empty() {
                warn!("No tracks found for phase: {}", phase.name);
                continue;
            }

            consumed.extend(phase_tracks.iter().map(|t| t.id.clone()));
            phase_breakdown.push(PhaseBreakdown::new(
                phase.name.clone(),
                phase_tracks.iter().map(|t| (*t).clone()).collect(),
            ));
            selected.extend(phase_tracks);
        }

        let adjusted =
            DurationTrimming::adjust_to_target_duration(selected, self.config.total_duration_ms);
        let tracks: Vec<Track> = adjusted.into_iter().cloned().collect();
        let total_duration_ms = tracks.iter().map(|t| t.duration_ms).sum();

        Ok(GeneratedPlaylist {
            name: playlist_name,
            phase_breakdown: recalculate_phase_breakdown(phase_breakdown, &tracks),
            tracks,
            total_duration_ms,
        })
    }

    /// Drop repeated track ids, keeping the first occurrence
    pub fn unique_tracks(pool: &[Track]) -> Vec<Track> {
        let mut seen_ids: HashSet<&str> = HashSet::new();
        let mut unique = Vec::with_capacity(pool.len());
        for track in pool {
            if seen_ids.insert(track.id.as_str()) {
                unique.push(track.clone());
            }
        }
        unique
    }

    /// Filter, rank and quota-select the tracks for one phase
    pub fn select_tracks_for_phase<'a, R: Rng + ?Sized>(
        pool: &'a [Track],
        phase: &PhaseDefinition,
        consumed: &HashSet<String>,
        rng: &mut R,
    ) -> Vec<&'a Track> {
        let candidates = PhaseFilters::candidates_for_phase(pool, phase, consumed);

        if candidates.is_empty() {
            debug!("No candidates match phase '{}', using random fallback", phase.name);
            return PhaseFilters::fallback_tracks(pool, consumed, rng);
        }

        let ranked = PhaseScoring::rank_candidates(candidates, &phase.criteria, rng);
        debug!(
            "Phase '{}': {} candidates, top score {:.2}",
            phase.name,
            ranked.len(),
            ranked.first().map(|s| s.score).unwrap_or_default()
        );

        QuotaSelection::select_tracks(
            ranked.into_iter().map(|s| s.track).collect(),
            phase.target_duration_ms,
            rng,
        )
    }
}
