//! Small string, path and directory-listing helpers shared by the browser.

use std::{
    cmp::Ordering,
    ffi::{OsStr, OsString},
    fs,
    path::{Path, PathBuf, MAIN_SEPARATOR},
};

use log::debug;

pub fn str_equal(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Case-insensitive comparison on the lower-cased Unicode form of both strings.
pub fn str_casecmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

pub fn utf8_from_os(name: &OsStr) -> String {
    name.to_string_lossy().into_owned()
}

/// Lists the raw entry names of `dir`, sorted case-insensitively on their
/// UTF-8 display form.
///
/// Returns `None` when the directory cannot be opened. Entries that fail to
/// read are skipped.
pub fn get_file_list(dir: &Path) -> Option<Vec<OsString>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("Failed to read directory {}: {}", dir.display(), err);
            return None;
        }
    };

    let mut names = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => names.push(entry.file_name()),
            Err(err) => {
                debug!(
                    "Failed to read a directory entry in {}: {}",
                    dir.display(),
                    err
                );
            }
        }
    }
    names.sort_by(|a, b| {
        str_casecmp(&utf8_from_os(a), &utf8_from_os(b)).then_with(|| a.cmp(b))
    });
    Some(names)
}

/// `$HOME` wins over the platform lookup, which may not match the user's shell.
pub fn home_dir() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME").filter(|value| !value.is_empty()) {
        return PathBuf::from(home);
    }
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(MAIN_SEPARATOR.to_string()))
}

/// Tooltip markup can't carry a bare ampersand.
pub fn tooltip_from_uri(uri: &str) -> String {
    uri.replace('&', "&amp;")
}

pub fn strip_trailing_separator(path: &str) -> String {
    let trimmed = path.trim_end_matches(['/', MAIN_SEPARATOR]);
    if trimmed.is_empty() && !path.is_empty() {
        return MAIN_SEPARATOR.to_string();
    }
    trimmed.to_string()
}

pub fn parent_dir(path: &str) -> String {
    let normalized = strip_trailing_separator(path);
    match Path::new(&normalized).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_string_lossy().into_owned(),
        Some(_) => ".".to_string(),
        None => normalized,
    }
}

pub fn ensure_dir_all(path: &Path) -> Result<(), String> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path)
        .map_err(|err| format!("failed to create directory {}: {}", path.display(), err))
}

pub fn basename(path: &Path) -> String {
    path.file_name()
        .map(utf8_from_os)
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
