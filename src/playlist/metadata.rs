use crate::models::Track;
use std::collections::HashSet;

/// The tracks one phase contributed to the playlist
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseBreakdown {
    pub phase: String,
    pub tracks: Vec<Track>,
    pub duration_ms: u64,
}

impl PhaseBreakdown {
    pub fn new(phase: String, tracks: Vec<Track>) -> Self {
        let duration_ms = tracks.iter().map(|t| t.duration_ms).sum();
        Self {
            phase,
            tracks,
            duration_ms,
        }
    }
}

/// Represents an assembled playlist with its phase breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPlaylist {
    pub name: String,
    pub tracks: Vec<Track>,
    pub total_duration_ms: u64,
    pub phase_breakdown: Vec<PhaseBreakdown>,
}

impl GeneratedPlaylist {
    /// Track URIs in playback order, as the publisher expects them
    pub fn track_uris(&self) -> Vec<String> {
        self.tracks.iter().map(|t| t.uri.clone()).collect()
    }
}

/// Recompute each phase against the tracks that survived trimming.
/// Per-phase order is kept and phases left empty are dropped.
pub fn recalculate_phase_breakdown(
    original_breakdown: Vec<PhaseBreakdown>,
    final_tracks: &[Track],
) -> Vec<PhaseBreakdown> {
    let final_ids: HashSet<&str> = final_tracks.iter().map(|t| t.id.as_str()).collect();

    original_breakdown
        .into_iter()
        .map(|entry| {
            let remaining: Vec<Track> = entry
                .tracks
                .into_iter()
                .filter(|track| final_ids.contains(track.id.as_str()))
                .collect();
            PhaseBreakdown::new(entry.phase, remaining)
        })
        .filter(|entry| !entry.tracks.is_empty())
        .collect()
}
