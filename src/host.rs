//! Host player services: decoder extensions and playlist handoff.

use std::path::{Path, PathBuf};

use log::{debug, error};

/// Services the host media player provides to the browser.
pub trait PlayerHost {
    /// File extensions of every registered decoder, as reported by the host.
    fn decoder_extensions(&self) -> Vec<String>;
    fn current_playlist(&self) -> usize;
    fn playlist_count(&self) -> usize;
    fn playlist_title(&self, index: usize) -> Option<String>;
    /// Appends a new playlist and returns its index.
    fn create_playlist(&mut self, title: &str) -> usize;
    fn add_file(&mut self, playlist: usize, path: &Path) -> Result<(), String>;
    /// Adds a directory recursively.
    fn add_dir(&mut self, playlist: usize, path: &Path) -> Result<(), String>;
    fn playlist_changed(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistTarget {
    Current,
    New,
    Index(usize),
}

pub const NEW_PLAYLIST_TITLE: &str = "New Playlist";

fn resolve_target(host: &mut dyn PlayerHost, target: PlaylistTarget) -> usize {
    match target {
        PlaylistTarget::Current => host.current_playlist(),
        PlaylistTarget::New => host.create_playlist(NEW_PLAYLIST_TITLE),
        PlaylistTarget::Index(index) if index < host.playlist_count() => index,
        PlaylistTarget::Index(index) => {
            debug!(
                "Playlist {} does not exist. Falling back to the current playlist",
                index
            );
            host.current_playlist()
        }
    }
}

/// Adds files and folders to a playlist in one batch.
///
/// Failures are logged and the remaining entries are still added. Returns
/// the number of entries the host accepted.
pub fn add_paths_to_playlist(
    host: &mut dyn PlayerHost,
    paths: &[PathBuf],
    target: PlaylistTarget,
) -> usize {
    if paths.is_empty() {
        return 0;
    }
    let playlist = resolve_target(host, target);
    let mut added = 0usize;
    for path in paths {
        let result = if path.is_dir() {
            host.add_dir(playlist, path)
        } else {
            host.add_file(playlist, path)
        };
        match result {
            Ok(()) => added += 1,
            Err(err) => {
                let kind = if path.is_dir() { "folder" } else { "file" };
                error!("Failed to add {} {}: {}", kind, path.display(), err);
            }
        }
    }
    host.playlist_changed();
    added
}

/// Labels for the "Add to playlist" submenu: `"1: Title"`, one per playlist.
pub fn playlist_menu_labels(host: &dyn PlayerHost) -> Vec<String> {
    (0..host.playlist_count())
        .map(|index| {
            let title = host.playlist_title(index).unwrap_or_default();
            format!("{}: {}", index + 1, title)
        })
        .collect()
}

/// Inverse of [`playlist_menu_labels`]; unparseable labels target the
/// current playlist.
pub fn parse_playlist_label(label: &str) -> PlaylistTarget {
    label
        .split_once(':')
        .and_then(|(number, _)| number.trim().parse::<usize>().ok())
        .and_then(|number| number.checked_sub(1))
        .map(PlaylistTarget::Index)
        .unwrap_or(PlaylistTarget::Current)
}
