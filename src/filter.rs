//! Filename filtering by glob patterns and the hidden-file rule.

use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use log::{debug, trace};

use crate::config::FileBrowserConfig;

/// Builds the auto filter (`*.ext;` per decoder extension, lower-cased).
pub fn build_autofilter<S: AsRef<str>>(extensions: &[S]) -> String {
    let mut seen = Vec::new();
    let mut filter = String::new();
    for ext in extensions {
        let ext = ext.as_ref().trim().trim_start_matches('.').to_ascii_lowercase();
        if ext.is_empty() || seen.contains(&ext) {
            continue;
        }
        filter.push_str("*.");
        filter.push_str(&ext);
        filter.push(';');
        seen.push(ext);
    }
    trace!("autofilter: {}", filter);
    filter
}

/// Compiled visibility policy for file rows.
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    enabled: bool,
    pattern: String,
    /// `None` when every file passes.
    matcher: Option<GlobSet>,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

impl FilterPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            pattern: String::new(),
            matcher: None,
        }
    }

    pub fn new(enabled: bool, pattern: &str) -> Self {
        let matcher = if enabled { compile_filter(pattern) } else { None };
        Self {
            enabled,
            pattern: pattern.to_string(),
            matcher,
        }
    }

    pub fn from_config(config: &FileBrowserConfig, known_extensions: &str) -> Self {
        Self::new(
            config.filter_enabled,
            config.active_filter(known_extensions),
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns true when `base_name` should be shown.
    pub fn check_filtered(&self, base_name: &str) -> bool {
        let Some(matcher) = &self.matcher else {
            return true;
        };
        base_name == "*" || matcher.is_match(base_name)
    }
}

fn compile_filter(pattern: &str) -> Option<GlobSet> {
    let trimmed = pattern.trim();
    if trimmed.is_empty() || trimmed == "*" {
        return None;
    }

    let mut builder = GlobSetBuilder::new();
    let mut added = 0usize;
    for part in trimmed.split(';').map(str::trim).filter(|part| !part.is_empty()) {
        match GlobBuilder::new(part).case_insensitive(true).build() {
            Ok(glob) => {
                builder.add(glob);
                added += 1;
            }
            Err(err) => debug!("Ignoring invalid filter pattern {:?}: {}", part, err),
        }
    }
    if added == 0 {
        return None;
    }
    match builder.build() {
        Ok(set) => Some(set),
        Err(err) => {
            debug!("Failed to compile filter {:?}: {}", pattern, err);
            None
        }
    }
}

/// Returns true when the entry is hidden: a dot-prefixed basename while
/// hidden files are not shown. Applies to files and directories alike.
pub fn check_hidden(path: &Path, show_hidden: bool) -> bool {
    if show_hidden {
        return false;
    }
    path.file_name()
        .is_some_and(|name| name.as_encoded_bytes().first() == Some(&b'.'))
}
