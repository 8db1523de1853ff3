//! Contracts between playlist assembly and the outside world.
//!
//! Assembly only ever sees an in-memory pool of tracks. Fetching that pool,
//! publishing the result and telling someone about it all happen behind
//! these traits so the run can be exercised without a network.

use crate::models::Track;
use crate::playlist::GeneratedPlaylist;
use anyhow::Result;

/// Supplies the full candidate pool (all of a user's saved tracks)
#[cfg_attr(test, mockall::automock)]
pub trait TrackSource {
    /// Every saved track, paginating internally as needed
    fn fetch_all_tracks(&self) -> Result<Vec<Track>>;
}

/// Creates the remote playlist and fills it
#[cfg_attr(test, mockall::automock)]
pub trait Publisher {
    /// Returns the handle of the created playlist
    fn create_playlist(&self, name: &str, description: &str) -> Result<String>;

    /// Append track handles in order
    fn add_tracks(&self, playlist_id: &str, track_uris: &[String]) -> Result<()>;
}

/// Best-effort report of a finished run. Implementations swallow their own
/// failures.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    fn notify(&self, playlist: &GeneratedPlaylist, playlist_id: &str);
}
