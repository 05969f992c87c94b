//! `file://` URI helpers for bookmarks, persisted expand state and drag payloads.

use std::path::{Path, PathBuf};

const FILE_SCHEME: &str = "file://";

/// Encodes an absolute path as a `file://` URI, percent-encoding each segment.
pub fn path_to_file_uri(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let encoded = raw
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    if encoded.starts_with('/') {
        format!("{FILE_SCHEME}{encoded}")
    } else {
        format!("{FILE_SCHEME}/{encoded}")
    }
}

/// Decodes a `file://` URI into a local path.
///
/// Only empty and `localhost` hosts are accepted.
pub fn file_uri_to_path(uri: &str) -> Option<PathBuf> {
    let rest = uri.trim().strip_prefix(FILE_SCHEME)?;
    let path_part = if rest.starts_with('/') {
        rest
    } else {
        let (host, path_part) = rest.split_at(rest.find('/')?);
        if !host.eq_ignore_ascii_case("localhost") {
            return None;
        }
        path_part
    };
    let decoded = urlencoding::decode(path_part).ok()?;
    if decoded.is_empty() {
        return None;
    }
    Some(PathBuf::from(decoded.into_owned()))
}

/// Serializes paths as a space-separated list of file URIs.
pub fn drag_payload<P: AsRef<Path>>(paths: &[P]) -> String {
    paths
        .iter()
        .map(|path| path_to_file_uri(path.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_drag_payload(payload: &str) -> Vec<PathBuf> {
    payload
        .split_whitespace()
        .filter_map(file_uri_to_path)
        .collect()
}
