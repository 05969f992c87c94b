//! Directory tree engine: lazy population, bookmarks, expand-state restore
//! and root changes.
//!
//! Every directory row gets an `(Empty)` placeholder child so the view shows
//! an expander; the real children replace it the first time the row is
//! expanded or selected. Directories precede files, and both keep the
//! case-insensitive listing order.

use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use log::{debug, info};

use crate::{
    bookmarks,
    config::FileBrowserConfig,
    expanded_state::ExpandedPaths,
    file_uri,
    filter::{check_hidden, FilterPolicy},
    icon_cache::{Icon, IconCache},
    tree_model::{NodeId, Row, TreeModel},
    utils,
};

pub const EMPTY_LABEL: &str = "(Empty)";
pub const ALL_HIDDEN_LABEL: &str = "(All contents hidden)";
pub const BOOKMARKS_LABEL: &str = "Bookmarks";

/// Result of a root change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChrootOutcome {
    Rebuilt,
    /// Target is not an existing directory; nothing was changed.
    InvalidPath,
}

/// View-relevant subset of the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserSettings {
    pub show_hidden: bool,
    pub show_bookmarks: bool,
    pub show_icons: bool,
    pub coverart_names: Vec<String>,
    pub icon_size: u32,
    pub chroot_on_dclick: bool,
    pub default_path: String,
}

impl BrowserSettings {
    pub fn from_config(config: &FileBrowserConfig) -> Self {
        Self {
            show_hidden: config.show_hidden_files,
            show_bookmarks: config.show_bookmarks,
            show_icons: config.show_icons,
            coverart_names: config.coverart_names(),
            icon_size: config.coverart_size,
            chroot_on_dclick: config.chroot_on_dclick,
            default_path: config.default_path.clone(),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self::from_config(&FileBrowserConfig::default())
    }
}

/// Configured default directory if it exists, otherwise the home directory.
pub fn default_dir(default_path: &str) -> PathBuf {
    if !default_path.is_empty() && Path::new(default_path).exists() {
        return PathBuf::from(default_path);
    }
    utils::home_dir()
}

pub struct FileBrowser<M: TreeModel> {
    model: M,
    settings: BrowserSettings,
    filter: FilterPolicy,
    icons: IconCache,
    bookmarks_file: PathBuf,
    expanded: ExpandedPaths,
    address: String,
    address_invalid: bool,
    bookmarks_node: Option<NodeId>,
    bookmarks_separator: Option<NodeId>,
    bookmarks_expanded: bool,
}

impl<M: TreeModel> FileBrowser<M> {
    pub fn new(model: M, settings: BrowserSettings, filter: FilterPolicy, icons: IconCache) -> Self {
        Self {
            model,
            settings,
            filter,
            icons,
            bookmarks_file: bookmarks::bookmarks_file(),
            expanded: ExpandedPaths::new(),
            address: String::new(),
            address_invalid: false,
            bookmarks_node: None,
            bookmarks_separator: None,
            bookmarks_expanded: false,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn settings(&self) -> &BrowserSettings {
        &self.settings
    }

    pub fn filter(&self) -> &FilterPolicy {
        &self.filter
    }

    pub fn icon_cache(&self) -> &IconCache {
        &self.icons
    }

    /// Takes effect on the next browse; callers usually follow with `refresh`.
    pub fn apply_settings(&mut self, settings: BrowserSettings, filter: FilterPolicy) {
        self.settings = settings;
        self.filter = filter;
    }

    pub fn set_bookmarks_file(&mut self, path: PathBuf) {
        self.bookmarks_file = path;
    }

    pub fn bookmarks_file(&self) -> &Path {
        &self.bookmarks_file
    }

    /// Current root directory as shown in the address field.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Set when the last chroot target was rejected; cleared by the next valid one.
    pub fn address_invalid(&self) -> bool {
        self.address_invalid
    }

    pub fn bookmarks_node(&self) -> Option<NodeId> {
        self.bookmarks_node.filter(|node| self.model.is_valid(*node))
    }

    pub fn expanded_paths(&self) -> &ExpandedPaths {
        &self.expanded
    }

    pub fn set_expanded_paths(&mut self, expanded: ExpandedPaths) {
        self.expanded = expanded;
    }

    fn icon_for(&self, path: &Path) -> Option<Icon> {
        if !self.settings.show_icons {
            return None;
        }
        Some(
            self.icons
                .icon_for_path(path, &self.settings.coverart_names, self.settings.icon_size),
        )
    }

    fn is_bookmarks_root(&self, node: NodeId) -> bool {
        self.bookmarks_node() == Some(node)
    }

    fn node_path(&self, node: NodeId) -> Option<PathBuf> {
        self.model.uri(node).map(Path::to_path_buf)
    }

    /// Changes the displayed root. `None` re-browses the current root.
    pub fn chroot(&mut self, directory: Option<&str>) -> ChrootOutcome {
        let requested = directory.unwrap_or(&self.address);
        let mut normalized = utils::strip_trailing_separator(requested.trim());
        if normalized.is_empty() {
            normalized = MAIN_SEPARATOR.to_string();
        }

        if !Path::new(&normalized).is_dir() {
            debug!("Not a directory: {}", normalized);
            self.address_invalid = true;
            return ChrootOutcome::InvalidPath;
        }
        self.address_invalid = false;
        self.address = normalized;

        let root = PathBuf::from(&self.address);
        info!("Browsing {}", root.display());
        self.browse(&root, None);
        ChrootOutcome::Rebuilt
    }

    pub fn refresh(&mut self) -> ChrootOutcome {
        self.chroot(None)
    }

    /// Re-browses a selected directory row, or the whole tree without one.
    pub fn refresh_node(&mut self, node: Option<NodeId>) {
        match node.and_then(|node| self.node_path(node).map(|path| (node, path))) {
            Some((node, path)) if path.is_dir() => self.browse(&path, Some(node)),
            _ => {
                let root = PathBuf::from(&self.address);
                self.browse(&root, None);
            }
        }
    }

    pub fn go_up(&mut self) -> ChrootOutcome {
        let parent = utils::parent_dir(&self.address);
        self.chroot(Some(&parent))
    }

    pub fn go_home(&mut self) -> ChrootOutcome {
        let home = utils::home_dir();
        self.chroot(Some(&home.to_string_lossy()))
    }

    pub fn go_root(&mut self) -> ChrootOutcome {
        self.chroot(Some(&MAIN_SEPARATOR.to_string()))
    }

    pub fn go_default(&mut self) -> ChrootOutcome {
        let dir = default_dir(&self.settings.default_path);
        self.chroot(Some(&dir.to_string_lossy()))
    }

    /// (Re)populates `parent`'s children from `directory`; `None` means the
    /// top level, which also reloads the bookmarks section.
    pub fn browse(&mut self, directory: &Path, parent: Option<NodeId>) {
        if let Some(parent) = parent {
            if !self.model.is_valid(parent) {
                debug!("Skipping browse of {} for a removed row", directory.display());
                return;
            }
            if self.is_bookmarks_root(parent) {
                self.load_bookmarks();
                return;
            }
        }

        let was_expanded = parent.is_some_and(|parent| self.model.is_expanded(parent));
        if parent.is_none() {
            self.remember_bookmarks_state();
            self.model.clear();
            self.bookmarks_node = None;
            self.bookmarks_separator = None;
        } else {
            self.model.clear_children(parent);
        }

        let new_dirs = self.populate(directory, parent);

        if let Some(parent) = parent {
            if was_expanded {
                self.model.set_expanded(parent, true);
            }
        }
        self.restore_expanded(&new_dirs);

        if parent.is_none() {
            self.load_bookmarks();
        }
    }

    /// Inserts rows for `directory` under `parent` and returns the new
    /// directory rows.
    fn populate(&mut self, directory: &Path, parent: Option<NodeId>) -> Vec<NodeId> {
        let Some(names) = utils::get_file_list(directory).filter(|names| !names.is_empty())
        else {
            self.model.prepend(parent, Row::placeholder(EMPTY_LABEL));
            return Vec::new();
        };

        let mut last_dir: Option<NodeId> = None;
        let mut new_dirs = Vec::new();
        let mut inserted = 0usize;
        for raw_name in names {
            let path = directory.join(&raw_name);
            let name = utils::utf8_from_os(&raw_name);
            if check_hidden(&path, self.settings.show_hidden) {
                continue;
            }
            if path.is_dir() {
                let icon = self.icon_for(&path);
                let row = Row::entry(name, path, icon);
                let Some(node) = self.model.insert_after(parent, last_dir, row) else {
                    continue;
                };
                self.model.prepend(Some(node), Row::placeholder(EMPTY_LABEL));
                last_dir = Some(node);
                new_dirs.push(node);
                inserted += 1;
            } else if self.filter.check_filtered(&name) {
                let icon = self.icon_for(&path);
                let row = Row::entry(name, path, icon);
                if self.model.append(parent, row).is_some() {
                    inserted += 1;
                }
            }
        }

        if inserted == 0 {
            self.model.prepend(parent, Row::placeholder(ALL_HIDDEN_LABEL));
        }
        new_dirs
    }

    /// Re-expands rows whose path is in the persisted set, recursively.
    fn restore_expanded(&mut self, nodes: &[NodeId]) {
        for node in nodes {
            let Some(path) = self.node_path(*node) else {
                continue;
            };
            if self.expanded.contains(&path) {
                self.expand_node(*node, &path);
            }
        }
    }

    fn expand_node(&mut self, node: NodeId, path: &Path) {
        self.model.set_expanded(node, true);
        self.browse(path, Some(node));
        self.model.set_expanded(node, true);
        let icon = self.icon_for(path);
        self.model.set_icon(node, icon);
    }

    fn remember_bookmarks_state(&mut self) {
        if let Some(node) = self.bookmarks_node() {
            self.bookmarks_expanded = self.model.is_expanded(node);
        }
    }

    fn remove_bookmarks_section(&mut self) {
        for node in [self.bookmarks_node.take(), self.bookmarks_separator.take()]
            .into_iter()
            .flatten()
        {
            self.model.remove(node);
        }
    }

    /// Builds or refreshes the "Bookmarks" section at the top of the tree.
    pub fn load_bookmarks(&mut self) {
        if !self.settings.show_bookmarks {
            self.remove_bookmarks_section();
            return;
        }
        let Some(entries) = bookmarks::read_bookmarks(&self.bookmarks_file) else {
            return;
        };

        let root = match self.bookmarks_node() {
            Some(root) => {
                self.bookmarks_expanded = self.model.is_expanded(root);
                self.model.clear_children(Some(root));
                root
            }
            None => {
                let icon = self.settings.show_icons.then_some(Icon::Bookmarks);
                let row = Row {
                    icon,
                    ..Row::placeholder(BOOKMARKS_LABEL)
                };
                let Some(root) = self.model.prepend(None, row) else {
                    return;
                };
                self.bookmarks_node = Some(root);
                self.bookmarks_separator =
                    self.model.insert_after(None, Some(root), Row::separator());
                root
            }
        };

        let mut new_dirs = Vec::new();
        for bookmark in entries {
            let icon = self.settings.show_icons.then_some(Icon::Folder);
            let Some(node) = self
                .model
                .append(Some(root), Row::entry(bookmark.name, bookmark.path, icon))
            else {
                continue;
            };
            self.model.append(Some(node), Row::placeholder(EMPTY_LABEL));
            new_dirs.push(node);
        }

        if self.bookmarks_expanded {
            self.model.set_expanded(root, true);
            self.restore_expanded(&new_dirs);
        }
    }

    /// The view expanded `node`: populate it and remember the path.
    pub fn row_expanded(&mut self, node: NodeId) {
        if self.is_bookmarks_root(node) {
            self.model.set_expanded(node, true);
            self.bookmarks_expanded = true;
            return;
        }
        let Some(path) = self.node_path(node) else {
            return;
        };
        if !path.is_dir() {
            return;
        }
        self.expanded.insert(&path);
        self.expand_node(node, &path);
    }

    pub fn row_collapsed(&mut self, node: NodeId) {
        self.model.set_expanded(node, false);
        if self.is_bookmarks_root(node) {
            self.bookmarks_expanded = false;
            return;
        }
        let Some(path) = self.node_path(node) else {
            return;
        };
        self.expanded.remove(&path);
        let icon = self.icon_for(&path);
        self.model.set_icon(node, icon);
    }

    /// Selecting a directory populates it; a row whose path vanished is removed.
    pub fn selection_changed(&mut self, node: NodeId) {
        let Some(path) = self.node_path(node) else {
            return;
        };
        if !path.exists() {
            debug!("Removing vanished entry {}", path.display());
            self.model.remove(node);
            return;
        }
        if path.is_dir() {
            self.browse(&path, Some(node));
        }
    }

    /// Double-click: enter the directory, or toggle it when chroot-on-activate is off.
    pub fn row_activated(&mut self, node: NodeId) -> Option<ChrootOutcome> {
        let path = self.node_path(node)?;
        if !path.is_dir() {
            return None;
        }
        if self.settings.chroot_on_dclick {
            return Some(self.chroot(Some(&path.to_string_lossy())));
        }
        if self.model.is_expanded(node) {
            self.row_collapsed(node);
        } else {
            self.row_expanded(node);
        }
        None
    }

    /// Expands every directory row loaded so far, one level deep.
    pub fn expand_all(&mut self) {
        for node in self.model.descendants(None) {
            if !self.model.is_valid(node) || self.model.is_expanded(node) {
                continue;
            }
            if self.is_bookmarks_root(node) || self.model.has_children(node) {
                self.row_expanded(node);
            }
        }
    }

    pub fn collapse_all(&mut self) {
        for node in self.model.descendants(None) {
            if self.model.is_expanded(node) {
                self.row_collapsed(node);
            }
        }
    }

    /// Finds the loaded row for `path`, preferring the main tree over bookmarks.
    pub fn find_node(&self, path: &Path) -> Option<NodeId> {
        let bookmarks = self.bookmarks_node();
        let mut fallback = None;
        for top in self.model.children(None) {
            let in_bookmarks = Some(top) == bookmarks;
            let candidates = std::iter::once(top).chain(self.model.descendants(Some(top)));
            for node in candidates {
                if self.model.uri(node) != Some(path) {
                    continue;
                }
                if !in_bookmarks {
                    return Some(node);
                }
                fallback = fallback.or(Some(node));
            }
        }
        fallback
    }

    /// Expands the loaded row for `path`; returns false when none is loaded.
    pub fn expand_path(&mut self, path: &Path) -> bool {
        match self.find_node(path) {
            Some(node) => {
                self.row_expanded(node);
                true
            }
            None => false,
        }
    }

    pub fn selected_paths(&self, nodes: &[NodeId]) -> Vec<PathBuf> {
        nodes
            .iter()
            .filter_map(|node| self.node_path(*node))
            .collect()
    }

    /// Drag-and-drop payload for the selected rows.
    pub fn drag_payload(&self, nodes: &[NodeId]) -> String {
        file_uri::drag_payload(&self.selected_paths(nodes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_uri::path_to_file_uri;
    use crate::tree_model::{render_tree, TreeStore};
    use crate::utils::test_support::unique_temp_dir;
    use std::fs;

    struct Fixture {
        dir: PathBuf,
        browser: FileBrowser<TreeStore>,
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            fs::remove_dir_all(&self.dir).ok();
        }
    }

    fn fixture(name: &str, filter: &str, show_bookmarks: bool) -> Fixture {
        let dir = unique_temp_dir(name);
        let settings = BrowserSettings {
            show_icons: false,
            show_bookmarks,
            ..BrowserSettings::default()
        };
        let mut browser = FileBrowser::new(
            TreeStore::new(),
            settings,
            FilterPolicy::new(true, filter),
            IconCache::new(dir.join(".cache")),
        );
        browser.set_bookmarks_file(dir.join(".gtk-bookmarks"));
        Fixture { dir, browser }
    }

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("should create parent");
        }
        fs::write(path, b"x").expect("should write fixture");
    }

    fn child_names(browser: &FileBrowser<TreeStore>, parent: Option<NodeId>) -> Vec<String> {
        browser
            .model()
            .children(parent)
            .into_iter()
            .map(|node| browser.model().row(node).expect("valid").name().to_string())
            .collect()
    }

    #[test]
    fn test_browse_lists_directories_first_and_hides_dotfiles() {
        let mut fx = fixture("browse_scenario", "*.mp3", false);
        let root = fx.dir.join("x");
        touch(&root.join("a.mp3"));
        touch(&root.join(".hidden.mp3"));
        fs::create_dir_all(root.join("sub")).expect("should create sub");

        assert_eq!(fx.browser.chroot(Some(&root.to_string_lossy())), ChrootOutcome::Rebuilt);

        let model = fx.browser.model();
        let top = model.children(None);
        assert_eq!(child_names(&fx.browser, None), vec!["sub", "a.mp3"]);
        assert_eq!(child_names(&fx.browser, Some(top[0])), vec![EMPTY_LABEL]);
        assert!(model.children(Some(top[1])).is_empty());
        assert_eq!(model.uri(top[0]), Some(root.join("sub").as_path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_keep_their_real_paths() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let mut fx = fixture("browse_non_utf8", "*.mp3", false);
        let root = fx.dir.join("music");
        let album = root.join(OsStr::from_bytes(b"Alb\xe9um"));
        let song = root.join(OsStr::from_bytes(b"caf\xe9.mp3"));
        touch(&album.join("01.mp3"));
        touch(&song);

        fx.browser.chroot(Some(&root.to_string_lossy()));
        let top = fx.browser.model().children(None);
        assert_eq!(child_names(&fx.browser, None), vec!["Alb\u{fffd}um", "caf\u{fffd}.mp3"]);
        assert_eq!(fx.browser.model().uri(top[0]), Some(album.as_path()));
        assert_eq!(fx.browser.model().uri(top[1]), Some(song.as_path()));

        fx.browser.row_expanded(top[0]);
        assert_eq!(child_names(&fx.browser, Some(top[0])), vec!["01.mp3"]);

        fx.browser.selection_changed(top[1]);
        assert!(fx.browser.model().is_valid(top[1]));
        assert_eq!(fx.browser.selected_paths(&top), vec![album, song]);
    }

    #[test]
    fn test_empty_directory_yields_single_placeholder() {
        let mut fx = fixture("browse_empty", "*.mp3", false);
        let root = fx.dir.join("y");
        fs::create_dir_all(&root).expect("should create y");

        fx.browser.chroot(Some(&root.to_string_lossy()));
        let top = fx.browser.model().children(None);
        assert_eq!(child_names(&fx.browser, None), vec![EMPTY_LABEL]);
        assert!(fx.browser.model().children(Some(top[0])).is_empty());
        assert_eq!(fx.browser.model().uri(top[0]), None);
    }

    #[test]
    fn test_fully_filtered_directory_is_labelled_hidden() {
        let mut fx = fixture("browse_all_hidden", "*.mp3", false);
        let root = fx.dir.join("z");
        touch(&root.join("notes.txt"));
        touch(&root.join(".secret"));

        fx.browser.chroot(Some(&root.to_string_lossy()));
        assert_eq!(child_names(&fx.browser, None), vec![ALL_HIDDEN_LABEL]);
    }

    #[test]
    fn test_directories_keep_case_insensitive_order() {
        let mut fx = fixture("browse_order", "", false);
        let root = fx.dir.join("order");
        for dir in ["beta", "Alpha", "gamma"] {
            fs::create_dir_all(root.join(dir)).expect("should create dir");
        }
        touch(&root.join("B.txt"));
        touch(&root.join("a.txt"));

        fx.browser.chroot(Some(&root.to_string_lossy()));
        assert_eq!(
            child_names(&fx.browser, None),
            vec!["Alpha", "beta", "gamma", "a.txt", "B.txt"]
        );
    }

    #[test]
    fn test_show_hidden_reveals_dot_entries() {
        let mut fx = fixture("browse_show_hidden", "", false);
        let root = fx.dir.join("h");
        touch(&root.join(".config").join("x"));
        touch(&root.join(".hidden.mp3"));
        let settings = BrowserSettings {
            show_hidden: true,
            ..fx.browser.settings().clone()
        };
        let filter = fx.browser.filter().clone();
        fx.browser.apply_settings(settings, filter);

        fx.browser.chroot(Some(&root.to_string_lossy()));
        assert_eq!(child_names(&fx.browser, None), vec![".config", ".hidden.mp3"]);
    }

    #[test]
    fn test_expanding_populates_lazily_and_records_path() {
        let mut fx = fixture("browse_expand", "*.mp3", false);
        let root = fx.dir.join("music");
        touch(&root.join("album").join("01.mp3"));
        touch(&root.join("album").join("cover.txt"));

        fx.browser.chroot(Some(&root.to_string_lossy()));
        let album = fx.browser.model().children(None)[0];
        fx.browser.row_expanded(album);

        assert!(fx.browser.model().is_expanded(album));
        assert_eq!(child_names(&fx.browser, Some(album)), vec!["01.mp3"]);
        assert!(fx.browser.expanded_paths().contains(&root.join("album")));

        fx.browser.row_collapsed(album);
        assert!(!fx.browser.model().is_expanded(album));
        assert!(fx.browser.expanded_paths().is_empty());
    }

    #[test]
    fn test_refresh_restores_nested_expansion() {
        let mut fx = fixture("browse_restore", "*.mp3", false);
        let root = fx.dir.join("music");
        touch(&root.join("artist").join("album").join("01.mp3"));
        fs::create_dir_all(root.join("other")).expect("should create other");

        fx.browser.chroot(Some(&root.to_string_lossy()));
        assert!(fx.browser.expand_path(&root.join("artist")));
        assert!(fx.browser.expand_path(&root.join("artist").join("album")));
        assert_eq!(fx.browser.refresh(), ChrootOutcome::Rebuilt);

        assert_eq!(
            render_tree(fx.browser.model()),
            "v artist\n  v album\n      01.mp3\n> other\n"
        );
    }

    #[test]
    fn test_persisted_expansion_survives_round_trip() {
        let mut fx = fixture("browse_persist", "*.mp3", false);
        let root = fx.dir.join("music");
        touch(&root.join("a").join("1.mp3"));
        touch(&root.join("b").join("2.mp3"));
        fs::create_dir_all(root.join("c")).expect("should create c");

        fx.browser.chroot(Some(&root.to_string_lossy()));
        fx.browser.expand_path(&root.join("b"));
        fx.browser.expand_path(&root.join("a"));
        let saved = fx.browser.expanded_paths().to_config_string();

        let mut next = fixture("browse_persist_next", "*.mp3", false);
        next.browser
            .set_expanded_paths(ExpandedPaths::from_config_string(&saved));
        next.browser.chroot(Some(&root.to_string_lossy()));

        let expanded: Vec<PathBuf> = next
            .browser
            .model()
            .descendants(None)
            .into_iter()
            .filter(|node| next.browser.model().is_expanded(*node))
            .filter_map(|node| next.browser.model().uri(node).map(Path::to_path_buf))
            .collect();
        let mut expanded_sorted = expanded;
        expanded_sorted.sort();
        assert_eq!(expanded_sorted, vec![root.join("a"), root.join("b")]);
    }

    #[test]
    fn test_invalid_chroot_changes_nothing_but_the_flag() {
        let mut fx = fixture("browse_invalid", "*.mp3", false);
        let root = fx.dir.join("music");
        touch(&root.join("a.mp3"));
        fx.browser.chroot(Some(&root.to_string_lossy()));
        let before = render_tree(fx.browser.model());
        let address = fx.browser.address().to_string();

        let missing = fx.dir.join("does-not-exist");
        assert_eq!(
            fx.browser.chroot(Some(&missing.to_string_lossy())),
            ChrootOutcome::InvalidPath
        );
        assert!(fx.browser.address_invalid());
        assert_eq!(fx.browser.address(), address);
        assert_eq!(render_tree(fx.browser.model()), before);

        let file = root.join("a.mp3");
        assert_eq!(
            fx.browser.chroot(Some(&file.to_string_lossy())),
            ChrootOutcome::InvalidPath
        );

        fx.browser.chroot(Some(&root.to_string_lossy()));
        assert!(!fx.browser.address_invalid());
    }

    #[test]
    fn test_chroot_strips_trailing_separator_and_goes_up() {
        let mut fx = fixture("browse_up", "", false);
        let root = fx.dir.join("music");
        fs::create_dir_all(root.join("inner")).expect("should create inner");

        let with_slash = format!("{}/", root.join("inner").display());
        fx.browser.chroot(Some(&with_slash));
        assert_eq!(fx.browser.address(), root.join("inner").to_string_lossy());

        assert_eq!(fx.browser.go_up(), ChrootOutcome::Rebuilt);
        assert_eq!(fx.browser.address(), root.to_string_lossy());
        assert_eq!(child_names(&fx.browser, None), vec!["inner"]);
    }

    #[test]
    fn test_go_root_browses_filesystem_root() {
        let mut fx = fixture("browse_root", "", false);
        assert_eq!(fx.browser.go_root(), ChrootOutcome::Rebuilt);
        assert_eq!(fx.browser.address(), MAIN_SEPARATOR.to_string());
    }

    #[test]
    fn test_bookmarks_section_is_first_with_separator() {
        let mut fx = fixture("browse_bookmarks", "*.mp3", true);
        let root = fx.dir.join("music");
        touch(&root.join("a.mp3"));
        let fav = fx.dir.join("favourites");
        touch(&fav.join("fav.mp3"));
        fs::write(
            fx.dir.join(".gtk-bookmarks"),
            format!(
                "{} Favs\n{}\n",
                path_to_file_uri(&fav),
                path_to_file_uri(&fx.dir.join("missing"))
            ),
        )
        .expect("should write bookmarks");

        fx.browser.chroot(Some(&root.to_string_lossy()));
        let model = fx.browser.model();
        let top = model.children(None);
        assert_eq!(Some(top[0]), fx.browser.bookmarks_node());
        assert_eq!(model.row(top[0]).expect("valid").name(), BOOKMARKS_LABEL);
        assert!(model.row(top[1]).expect("valid").is_separator());
        assert_eq!(model.row(top[2]).expect("valid").name(), "a.mp3");
        assert_eq!(child_names(&fx.browser, Some(top[0])), vec!["Favs"]);

        let favs = model.children(Some(top[0]))[0];
        fx.browser.row_expanded(favs);
        assert_eq!(child_names(&fx.browser, Some(favs)), vec!["fav.mp3"]);
    }

    #[test]
    fn test_bookmarks_expand_state_survives_rebuild() {
        let mut fx = fixture("browse_bookmarks_state", "*.mp3", true);
        let root = fx.dir.join("music");
        fs::create_dir_all(&root).expect("should create root");
        fs::write(
            fx.dir.join(".gtk-bookmarks"),
            format!("{}\n", path_to_file_uri(&root)),
        )
        .expect("should write bookmarks");

        fx.browser.chroot(Some(&root.to_string_lossy()));
        let bookmarks = fx.browser.bookmarks_node().expect("bookmarks node");
        fx.browser.row_expanded(bookmarks);
        fx.browser.refresh();

        let bookmarks = fx.browser.bookmarks_node().expect("bookmarks node rebuilt");
        assert!(fx.browser.model().is_expanded(bookmarks));
        assert!(fx.browser.expanded_paths().is_empty());

        fx.browser.row_collapsed(bookmarks);
        fx.browser.refresh();
        let bookmarks = fx.browser.bookmarks_node().expect("bookmarks node rebuilt");
        assert!(!fx.browser.model().is_expanded(bookmarks));
    }

    #[test]
    fn test_disabling_bookmarks_removes_section() {
        let mut fx = fixture("browse_bookmarks_off", "*.mp3", true);
        let root = fx.dir.join("music");
        fs::create_dir_all(&root).expect("should create root");
        fs::write(fx.dir.join(".gtk-bookmarks"), "").expect("should write bookmarks");
        fx.browser.chroot(Some(&root.to_string_lossy()));
        assert!(fx.browser.bookmarks_node().is_some());

        let settings = BrowserSettings {
            show_bookmarks: false,
            ..fx.browser.settings().clone()
        };
        let filter = fx.browser.filter().clone();
        fx.browser.apply_settings(settings, filter);
        fx.browser.load_bookmarks();
        assert!(fx.browser.bookmarks_node().is_none());
        assert_eq!(child_names(&fx.browser, None), vec![EMPTY_LABEL]);
    }

    #[test]
    fn test_selection_of_vanished_entry_removes_row() {
        let mut fx = fixture("browse_vanished", "", false);
        let root = fx.dir.join("music");
        touch(&root.join("gone.mp3"));
        touch(&root.join("kept.mp3"));
        fx.browser.chroot(Some(&root.to_string_lossy()));

        let gone = fx.browser.find_node(&root.join("gone.mp3")).expect("row exists");
        fs::remove_file(root.join("gone.mp3")).expect("should delete");
        fx.browser.selection_changed(gone);
        assert!(!fx.browser.model().is_valid(gone));
        assert_eq!(child_names(&fx.browser, None), vec!["kept.mp3"]);
    }

    #[test]
    fn test_stale_node_browse_is_ignored() {
        let mut fx = fixture("browse_stale", "", false);
        let root = fx.dir.join("music");
        fs::create_dir_all(root.join("sub")).expect("should create sub");
        fx.browser.chroot(Some(&root.to_string_lossy()));
        let sub = fx.browser.model().children(None)[0];

        fx.browser.refresh();
        fx.browser.row_expanded(sub);
        fx.browser.browse(&root.join("sub"), Some(sub));
        assert_eq!(child_names(&fx.browser, None), vec!["sub"]);
        assert!(fx.browser.expanded_paths().is_empty());
    }

    #[test]
    fn test_row_activated_chroots_or_toggles() {
        let mut fx = fixture("browse_activate", "", false);
        let root = fx.dir.join("music");
        touch(&root.join("album").join("01.mp3"));
        fx.browser.chroot(Some(&root.to_string_lossy()));

        let album = fx.browser.model().children(None)[0];
        let mut settings = fx.browser.settings().clone();
        settings.chroot_on_dclick = false;
        let filter = fx.browser.filter().clone();
        fx.browser.apply_settings(settings.clone(), filter.clone());
        assert_eq!(fx.browser.row_activated(album), None);
        assert!(fx.browser.model().is_expanded(album));
        fx.browser.row_activated(album);
        assert!(!fx.browser.model().is_expanded(album));

        settings.chroot_on_dclick = true;
        fx.browser.apply_settings(settings, filter);
        assert_eq!(fx.browser.row_activated(album), Some(ChrootOutcome::Rebuilt));
        assert_eq!(fx.browser.address(), root.join("album").to_string_lossy());
    }

    #[test]
    fn test_expand_all_and_collapse_all() {
        let mut fx = fixture("browse_expand_all", "", false);
        let root = fx.dir.join("music");
        touch(&root.join("a").join("inner").join("1.mp3"));
        touch(&root.join("b").join("2.mp3"));
        fx.browser.chroot(Some(&root.to_string_lossy()));

        fx.browser.expand_all();
        assert_eq!(
            render_tree(fx.browser.model()),
            "v a\n  > inner\nv b\n    2.mp3\n"
        );
        assert_eq!(fx.browser.expanded_paths().len(), 2);

        fx.browser.collapse_all();
        assert_eq!(render_tree(fx.browser.model()), "> a\n> b\n");
        assert!(fx.browser.expanded_paths().is_empty());
    }

    #[test]
    fn test_drag_payload_for_selected_rows() {
        let mut fx = fixture("browse_drag", "", false);
        let root = fx.dir.join("my music");
        touch(&root.join("a b.mp3"));
        fs::create_dir_all(root.join("album")).expect("should create album");
        fx.browser.chroot(Some(&root.to_string_lossy()));

        let nodes = fx.browser.model().children(None);
        let payload = fx.browser.drag_payload(&nodes);
        assert_eq!(
            payload,
            format!(
                "{} {}",
                path_to_file_uri(&root.join("album")),
                path_to_file_uri(&root.join("a b.mp3"))
            )
        );
        assert!(!payload.contains("my music"));
    }

    #[test]
    fn test_icons_are_attached_when_enabled() {
        let mut fx = fixture("browse_icons", "", false);
        let root = fx.dir.join("music");
        touch(&root.join("album").join("01.mp3"));
        touch(&root.join("song.mp3"));
        let settings = BrowserSettings {
            show_icons: true,
            ..fx.browser.settings().clone()
        };
        let filter = fx.browser.filter().clone();
        fx.browser.apply_settings(settings, filter);

        fx.browser.chroot(Some(&root.to_string_lossy()));
        let top = fx.browser.model().children(None);
        let icon = |node: NodeId| fx.browser.model().row(node).and_then(|row| row.icon.clone());
        assert_eq!(icon(top[0]), Some(Icon::Folder));
        assert_eq!(icon(top[1]), Some(Icon::File));
    }
}
