use crate::models::Track;

/// Totals within this distance of the target are left untouched
pub const DURATION_TOLERANCE_MS: u64 = 60_000;

/// Global duration adjustment applied after every phase has picked
pub struct DurationTrimming;

impl DurationTrimming {
    pub fn total_duration(tracks: &[&Track]) -> u64 {
        tracks.iter().map(|track| track.duration_ms).sum()
    }

    /// Index of the longest track, ties going to the earliest one
    pub fn longest_index(tracks: &[&Track]) -> Option<usize> {
        let mut longest: Option<usize> = None;
        for (i, track) in tracks.iter().enumerate() {
            match longest {
                Some(best) if tracks[best].duration_ms >= track.duration_ms => {}
                _ => longest = Some(i),
            }
        }
        longest
    }

    /// Bring an over-long selection down to the target by repeatedly dropping
    /// the longest track. Never removes the last track. Selections that fall
    /// short of the target are returned unchanged.
    pub fn adjust_to_target_duration<'a>(
        tracks: Vec<&'a Track>,
        target_duration_ms: u64,
    ) -> Vec<&'a Track> {
        let current_duration = Self::total_duration(&tracks);

        if current_duration.abs_diff(target_duration_ms) <= DURATION_TOLERANCE_MS {
            return tracks;
        }

        if current_duration <= target_duration_ms {
            // TODO: pad short playlists with unused candidates instead of accepting the undershoot
            return tracks;
        }

        let mut adjusted = tracks;
        let mut adjusted_duration = current_duration;

        while adjusted_duration > target_duration_ms && adjusted.len() > 1 {
            let Some(longest) = Self::longest_index(&adjusted) else {
                break;
            };
            adjusted_duration -= adjusted[longest].duration_ms;
            adjusted.remove(longest);
        }

        adjusted
    }
}
