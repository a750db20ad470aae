// UI layer: provides the interactive menus using `dialoguer`.
// Navigation is a small state machine: a `Screen` enum plus a pure
// transition table, so menu wiring is testable without a server. The
// flows themselves are small and synchronous.

use crate::api::LibraryBackend;
use crate::error::ClientError;
use crate::refresh::BulkRefresher;
use anyhow::Result;
use crossterm::style::Stylize;
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// The three menu screens. `Main` is both the entry point and where the
/// sub-menus return to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Main,
    Refresh,
    Delete,
}

/// Everything a menu selection can trigger: a leaf operation, a screen
/// change, or quitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    ScanLibrary,
    CleanLibrary,
    EnterRefresh,
    EnterDelete,
    Quit,
    RefreshMovieBySearch,
    RefreshShowBySearch,
    RefreshMusicVideoBySearch,
    RefreshAllMovies,
    RefreshAllShows,
    RefreshAllMusicVideos,
    BackToMain,
    DeleteMovieBySearch,
    DeleteShowBySearch,
}

fn prompt_for(screen: Screen) -> &'static str {
    match screen {
        Screen::Main => "Kodi Library Management",
        Screen::Refresh => "Refresh Options",
        Screen::Delete => "Delete Options",
    }
}

fn menu_items(screen: Screen) -> &'static [&'static str] {
    match screen {
        Screen::Main => &[
            "Update library (scan for new items)",
            "Clean library (remove missing items)",
            "Refresh metadata",
            "Delete items",
            "Exit",
        ],
        Screen::Refresh => &[
            "Refresh a movie by search",
            "Refresh a TV show by search",
            "Refresh a music video by search",
            "Refresh all movies",
            "Refresh all TV shows and episodes",
            "Refresh all music videos",
            "Back to main menu",
        ],
        Screen::Delete => &[
            "Delete a movie by search",
            "Delete a TV show by search",
            "Back to main menu",
        ],
    }
}

/// Transition table. Total over all inputs: an out-of-range selection
/// maps to no action, which redraws the current screen.
fn action_for(screen: Screen, selection: usize) -> Option<Action> {
    match (screen, selection) {
        (Screen::Main, 0) => Some(Action::ScanLibrary),
        (Screen::Main, 1) => Some(Action::CleanLibrary),
        (Screen::Main, 2) => Some(Action::EnterRefresh),
        (Screen::Main, 3) => Some(Action::EnterDelete),
        (Screen::Main, 4) => Some(Action::Quit),
        (Screen::Refresh, 0) => Some(Action::RefreshMovieBySearch),
        (Screen::Refresh, 1) => Some(Action::RefreshShowBySearch),
        (Screen::Refresh, 2) => Some(Action::RefreshMusicVideoBySearch),
        (Screen::Refresh, 3) => Some(Action::RefreshAllMovies),
        (Screen::Refresh, 4) => Some(Action::RefreshAllShows),
        (Screen::Refresh, 5) => Some(Action::RefreshAllMusicVideos),
        (Screen::Refresh, 6) => Some(Action::BackToMain),
        (Screen::Delete, 0) => Some(Action::DeleteMovieBySearch),
        (Screen::Delete, 1) => Some(Action::DeleteShowBySearch),
        (Screen::Delete, 2) => Some(Action::BackToMain),
        _ => None,
    }
}

/// Main interactive loop. Receives any `LibraryBackend` and runs until
/// the user chooses Exit. Every leaf action completes (and prints its
/// outcome) before its menu is redrawn; listings are re-fetched on every
/// search, never cached across redraws.
pub fn run<B: LibraryBackend>(backend: &B, pacing: Duration) -> Result<()> {
    let mut screen = Screen::Main;
    loop {
        let selection = Select::new()
            .with_prompt(prompt_for(screen))
            .items(menu_items(screen))
            .default(0)
            .interact()?;
        let action = match action_for(screen, selection) {
            Some(action) => action,
            None => continue,
        };
        match action {
            Action::Quit => {
                println!("Exiting...");
                break;
            }
            Action::EnterRefresh => screen = Screen::Refresh,
            Action::EnterDelete => screen = Screen::Delete,
            Action::BackToMain => screen = Screen::Main,
            Action::ScanLibrary => run_action("Library scan", || backend.scan()),
            Action::CleanLibrary => run_action("Library clean", || backend.clean()),
            Action::RefreshMovieBySearch => refresh_movie_by_search(backend)?,
            Action::RefreshShowBySearch => refresh_show_by_search(backend)?,
            Action::RefreshMusicVideoBySearch => refresh_music_video_by_search(backend)?,
            Action::RefreshAllMovies => {
                println!("Refreshing all movies...");
                report_bulk(BulkRefresher::new(backend, pacing).refresh_all_movies());
            }
            Action::RefreshAllShows => {
                println!("Refreshing all TV shows and their episodes...");
                report_bulk(BulkRefresher::new(backend, pacing).refresh_all_tv_shows());
            }
            Action::RefreshAllMusicVideos => {
                println!("Refreshing all music videos...");
                report_bulk(BulkRefresher::new(backend, pacing).refresh_all_music_videos());
            }
            Action::DeleteMovieBySearch => delete_movie_by_search(backend)?,
            Action::DeleteShowBySearch => delete_show_by_search(backend)?,
        }
    }
    Ok(())
}

/// Run one backend action behind a spinner and print its outcome. Errors
/// are displayed, never retried, and never break the menu loop.
fn run_action(label: &str, call: impl FnOnce() -> Result<String, ClientError>) {
    let spinner = spinner(label);
    let result = call();
    spinner.finish_and_clear();
    match result {
        Ok(outcome) => println!("{}: {}", label, outcome.green()),
        Err(e) => println!("{}: {}", label, e.to_string().red()),
    }
}

fn report_bulk(result: Result<(), ClientError>) {
    match result {
        Ok(()) => println!("{}", "Done.".green()),
        Err(e) => println!("{} {}", "Bulk refresh aborted:".red(), e),
    }
}

fn spinner(msg: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.set_message(format!("{msg}..."));
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

fn search_term(prompt: &str) -> Result<String> {
    let term: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(term)
}

/// Present matched items as "Title (ID: n)" with a trailing Back entry;
/// returns the picked item, or None for Back.
fn pick<T>(mut items: Vec<T>, describe: impl Fn(&T) -> String) -> Result<Option<T>> {
    let mut labels: Vec<String> = items.iter().map(describe).collect();
    labels.push("Back".to_string());
    let selection = Select::new().items(&labels).default(0).interact()?;
    if selection >= items.len() {
        return Ok(None);
    }
    Ok(Some(items.swap_remove(selection)))
}

fn refresh_movie_by_search<B: LibraryBackend>(backend: &B) -> Result<()> {
    let term = search_term("Enter movie search term")?;
    let movies = match backend.movies(&term) {
        Ok(movies) => movies,
        Err(e) => {
            println!("{} {}", "Listing movies failed:".red(), e);
            return Ok(());
        }
    };
    if movies.is_empty() {
        println!("No movies found.");
        return Ok(());
    }
    if let Some(movie) = pick(movies, |m| format!("{} (ID: {})", m.title, m.id))? {
        run_action("Movie refresh", || backend.refresh_movie(movie.id));
    }
    Ok(())
}

fn refresh_show_by_search<B: LibraryBackend>(backend: &B) -> Result<()> {
    let term = search_term("Enter TV show search term")?;
    let shows = match backend.tv_shows(&term) {
        Ok(shows) => shows,
        Err(e) => {
            println!("{} {}", "Listing TV shows failed:".red(), e);
            return Ok(());
        }
    };
    if shows.is_empty() {
        println!("No TV shows found.");
        return Ok(());
    }
    if let Some(show) = pick(shows, |s| format!("{} (ID: {})", s.title, s.id))? {
        run_action("TV show refresh", || backend.refresh_tv_show(show.id));
    }
    Ok(())
}

fn refresh_music_video_by_search<B: LibraryBackend>(backend: &B) -> Result<()> {
    let term = search_term("Enter music video search term")?;
    let videos = match backend.music_videos(&term) {
        Ok(videos) => videos,
        Err(e) => {
            println!("{} {}", "Listing music videos failed:".red(), e);
            return Ok(());
        }
    };
    if videos.is_empty() {
        println!("No music videos found.");
        return Ok(());
    }
    if let Some(video) = pick(videos, |v| format!("{} (ID: {})", v.title, v.id))? {
        run_action("Music video refresh", || {
            backend.refresh_music_video(video.id)
        });
    }
    Ok(())
}

fn delete_movie_by_search<B: LibraryBackend>(backend: &B) -> Result<()> {
    let term = search_term("Enter movie search term")?;
    let movies = match backend.movies(&term) {
        Ok(movies) => movies,
        Err(e) => {
            println!("{} {}", "Listing movies failed:".red(), e);
            return Ok(());
        }
    };
    if movies.is_empty() {
        println!("No movies found.");
        return Ok(());
    }
    if let Some(movie) = pick(movies, |m| format!("{} (ID: {})", m.title, m.id))? {
        run_action("Movie delete", || backend.delete_movie(movie.id));
    }
    Ok(())
}

fn delete_show_by_search<B: LibraryBackend>(backend: &B) -> Result<()> {
    let term = search_term("Enter TV show search term")?;
    let shows = match backend.tv_shows(&term) {
        Ok(shows) => shows,
        Err(e) => {
            println!("{} {}", "Listing TV shows failed:".red(), e);
            return Ok(());
        }
    };
    if shows.is_empty() {
        println!("No TV shows found.");
        return Ok(());
    }
    if let Some(show) = pick(shows, |s| format!("{} (ID: {})", s.title, s.id))? {
        run_action("TV show delete", || backend.delete_tv_show(show.id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn main_screen_transitions() {
        assert_eq!(action_for(Screen::Main, 0), Some(Action::ScanLibrary));
        assert_eq!(action_for(Screen::Main, 2), Some(Action::EnterRefresh));
        assert_eq!(action_for(Screen::Main, 3), Some(Action::EnterDelete));
        assert_eq!(action_for(Screen::Main, 4), Some(Action::Quit));
    }

    #[test]
    fn sub_screens_return_to_main() {
        assert_eq!(action_for(Screen::Refresh, 6), Some(Action::BackToMain));
        assert_eq!(action_for(Screen::Delete, 2), Some(Action::BackToMain));
    }

    #[test]
    fn every_menu_item_maps_to_an_action() {
        for screen in [Screen::Main, Screen::Refresh, Screen::Delete] {
            for selection in 0..menu_items(screen).len() {
                assert!(
                    action_for(screen, selection).is_some(),
                    "{screen:?} item {selection} has no action"
                );
            }
        }
    }

    #[test]
    fn out_of_range_selection_maps_to_no_action() {
        for screen in [Screen::Main, Screen::Refresh, Screen::Delete] {
            let past_end = menu_items(screen).len();
            assert_eq!(action_for(screen, past_end), None);
            assert_eq!(action_for(screen, usize::MAX), None);
        }
    }
}
