//! The set of directories the user had expanded, stored as file URIs.

use std::path::{Path, PathBuf};

use crate::file_uri::{file_uri_to_path, path_to_file_uri};

const SEPARATOR: char = ' ';

/// Ordered, duplicate-free list of expanded directory URIs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedPaths {
    uris: Vec<String>,
}

impl ExpandedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the persisted form; unparseable entries and duplicates are dropped.
    pub fn from_config_string(text: &str) -> Self {
        let mut paths = Self::new();
        for uri in text.split(SEPARATOR).filter(|uri| !uri.is_empty()) {
            if let Some(path) = file_uri_to_path(uri) {
                paths.insert(&path);
            }
        }
        paths
    }

    pub fn to_config_string(&self) -> String {
        self.uris.join(&SEPARATOR.to_string())
    }

    /// Returns false when the path was already present.
    pub fn insert(&mut self, path: &Path) -> bool {
        let uri = path_to_file_uri(path);
        if self.uris.contains(&uri) {
            return false;
        }
        self.uris.push(uri);
        true
    }

    pub fn remove(&mut self, path: &Path) -> bool {
        let uri = path_to_file_uri(path);
        let before = self.uris.len();
        self.uris.retain(|candidate| *candidate != uri);
        self.uris.len() != before
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.uris.contains(&path_to_file_uri(path))
    }

    pub fn clear(&mut self) {
        self.uris.clear();
    }

    pub fn len(&self) -> usize {
        self.uris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }

    pub fn uris(&self) -> &[String] {
        &self.uris
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.uris
            .iter()
            .filter_map(|uri| file_uri_to_path(uri))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::ExpandedPaths;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_insert_is_idempotent_and_ordered() {
        let mut paths = ExpandedPaths::new();
        assert!(paths.insert(Path::new("/music/b")));
        assert!(paths.insert(Path::new("/music/a")));
        assert!(!paths.insert(Path::new("/music/b")));
        assert_eq!(
            paths.paths(),
            vec![PathBuf::from("/music/b"), PathBuf::from("/music/a")]
        );
    }

    #[test]
    fn test_remove_only_drops_matching_path() {
        let mut paths = ExpandedPaths::new();
        paths.insert(Path::new("/music/a"));
        paths.insert(Path::new("/music/ab"));
        assert!(paths.remove(Path::new("/music/a")));
        assert!(!paths.remove(Path::new("/music/a")));
        assert!(paths.contains(Path::new("/music/ab")));
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn test_config_string_survives_spaces_in_paths() {
        let mut paths = ExpandedPaths::new();
        paths.insert(Path::new("/music/Best Of"));
        paths.insert(Path::new("/music/Live & Loud"));
        let text = paths.to_config_string();
        assert_eq!(
            text,
            "file:///music/Best%20Of file:///music/Live%20%26%20Loud"
        );
        assert_eq!(ExpandedPaths::from_config_string(&text), paths);
    }

    #[test]
    fn test_from_config_string_skips_garbage_and_duplicates() {
        let paths = ExpandedPaths::from_config_string(
            "file:///a  not-a-uri file:///a http://x/y file:///b",
        );
        assert_eq!(
            paths.paths(),
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
        assert!(ExpandedPaths::from_config_string("").is_empty());
    }
}
