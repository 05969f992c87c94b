//! Desktop bookmarks (`~/.gtk-bookmarks`) reader.

use std::path::{Path, PathBuf};

use log::debug;

use crate::{file_uri::file_uri_to_path, utils};

pub const BOOKMARKS_FILE_NAME: &str = ".gtk-bookmarks";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub path: PathBuf,
    /// Display name from the bookmark line, or the directory's basename.
    pub name: String,
}

pub fn bookmarks_file() -> PathBuf {
    utils::home_dir().join(BOOKMARKS_FILE_NAME)
}

/// Parses `<file-uri>[ <display name>]` lines. Non-file URIs are skipped.
pub fn parse_bookmarks(text: &str) -> Vec<Bookmark> {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let (uri, label) = match line.split_once(' ') {
                Some((uri, label)) => (uri, Some(label.trim()).filter(|label| !label.is_empty())),
                None => (line, None),
            };
            let path = file_uri_to_path(uri)?;
            let name = label
                .map(str::to_string)
                .unwrap_or_else(|| utils::basename(&path));
            Some(Bookmark { path, name })
        })
        .collect()
}

/// Reads bookmarks from `file`, keeping only entries that are existing
/// directories. A missing or unreadable file yields no bookmarks.
pub fn load_bookmarks(file: &Path) -> Vec<Bookmark> {
    read_bookmarks(file).unwrap_or_default()
}

/// Like [`load_bookmarks`], but `None` when the file can't be read at all.
pub fn read_bookmarks(file: &Path) -> Option<Vec<Bookmark>> {
    let text = match std::fs::read_to_string(file) {
        Ok(text) => text,
        Err(err) => {
            debug!("Failed to read bookmarks {}: {}", file.display(), err);
            return None;
        }
    };
    Some(
        parse_bookmarks(&text)
            .into_iter()
            .filter(|bookmark| bookmark.path.is_dir())
            .collect(),
    )
}
