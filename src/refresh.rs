// Bulk refresh orchestration: walk an entire category and re-fetch
// metadata item by item, pausing between calls so the server is not
// flooded. Strictly sequential and best-effort; the first error aborts
// the pass and already-refreshed items stay refreshed.

use std::thread;
use std::time::Duration;

use crate::api::LibraryBackend;
use crate::error::ClientError;

/// Sequences "refresh all X" passes over any `LibraryBackend`.
pub struct BulkRefresher<'a, B: LibraryBackend> {
    backend: &'a B,
    pacing: Duration,
}

impl<'a, B: LibraryBackend> BulkRefresher<'a, B> {
    pub fn new(backend: &'a B, pacing: Duration) -> Self {
        Self { backend, pacing }
    }

    /// Refresh every movie in the library, reporting each result as it
    /// comes in. An empty library is reported and is not an error.
    pub fn refresh_all_movies(&self) -> Result<(), ClientError> {
        let movies = self.backend.movies("")?;
        if movies.is_empty() {
            println!("No movies found.");
            return Ok(());
        }
        for movie in &movies {
            let outcome = self.backend.refresh_movie(movie.id)?;
            println!("Refreshed {} (ID: {}): {}", movie.title, movie.id, outcome);
            thread::sleep(self.pacing);
        }
        Ok(())
    }

    /// Refresh every TV show, then each of its episodes. A show with no
    /// episodes is reported and skipped; the pass moves on to the next
    /// show.
    pub fn refresh_all_tv_shows(&self) -> Result<(), ClientError> {
        let shows = self.backend.tv_shows("")?;
        if shows.is_empty() {
            println!("No TV shows found.");
            return Ok(());
        }
        for show in &shows {
            let outcome = self.backend.refresh_tv_show(show.id)?;
            println!("Refreshed {} (ID: {}): {}", show.title, show.id, outcome);
            thread::sleep(self.pacing);

            let episodes = self.backend.episodes(show.id)?;
            if episodes.is_empty() {
                println!("  No episodes found for {}.", show.title);
                continue;
            }
            for episode in &episodes {
                let outcome = self.backend.refresh_episode(episode.id)?;
                println!(
                    "  Refreshed episode {} (ID: {}): {}",
                    episode.title, episode.id, outcome
                );
                thread::sleep(self.pacing);
            }
        }
        Ok(())
    }

    /// Refresh every music video, symmetric to the movie pass.
    pub fn refresh_all_music_videos(&self) -> Result<(), ClientError> {
        let videos = self.backend.music_videos("")?;
        if videos.is_empty() {
            println!("No music videos found.");
            return Ok(());
        }
        for video in &videos {
            let outcome = self.backend.refresh_music_video(video.id)?;
            println!("Refreshed {} (ID: {}): {}", video.title, video.id, outcome);
            thread::sleep(self.pacing);
        }
        Ok(())
    }
}
