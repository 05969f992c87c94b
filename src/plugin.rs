//! Plugin lifecycle: config load/save, host notifications and the menu
//! toggles that rebuild the tree.

use std::path::PathBuf;

use log::{debug, info};

use crate::{
    browser::{default_dir, BrowserSettings, ChrootOutcome, FileBrowser},
    config::{ConfigStore, FileBrowserConfig},
    expanded_state::ExpandedPaths,
    filter::{build_autofilter, FilterPolicy},
    host::{add_paths_to_playlist, PlayerHost, PlaylistTarget},
    icon_cache::IconCache,
    tree_model::{NodeId, TreeModel},
};

/// Notifications the host sends while the plugin is running.
pub enum HostMessage<'a> {
    /// Settings were edited through the host's config dialog.
    ConfigChanged(&'a dyn ConfigStore),
    /// Decoder plugins were loaded or unloaded.
    DecodersChanged,
}

pub struct FileBrowserPlugin<M: TreeModel, H: PlayerHost> {
    browser: FileBrowser<M>,
    host: H,
    config: FileBrowserConfig,
    known_extensions: String,
}

impl<M: TreeModel, H: PlayerHost> FileBrowserPlugin<M, H> {
    pub fn new(model: M, host: H, icons: IconCache) -> Self {
        let config = FileBrowserConfig::default();
        let browser = FileBrowser::new(
            model,
            BrowserSettings::from_config(&config),
            FilterPolicy::disabled(),
            icons,
        );
        Self {
            browser,
            host,
            config,
            known_extensions: String::new(),
        }
    }

    pub fn browser(&self) -> &FileBrowser<M> {
        &self.browser
    }

    pub fn browser_mut(&mut self) -> &mut FileBrowser<M> {
        &mut self.browser
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &FileBrowserConfig {
        &self.config
    }

    pub fn known_extensions(&self) -> &str {
        &self.known_extensions
    }

    pub fn set_bookmarks_file(&mut self, path: PathBuf) {
        self.browser.set_bookmarks_file(path);
    }

    fn rebuild_autofilter(&mut self) {
        self.known_extensions = build_autofilter(&self.host.decoder_extensions());
    }

    fn apply_config(&mut self) {
        self.browser.apply_settings(
            BrowserSettings::from_config(&self.config),
            FilterPolicy::from_config(&self.config, &self.known_extensions),
        );
    }

    /// Loads settings, restores the expanded rows and shows the default directory.
    pub fn start(&mut self, store: &dyn ConfigStore) -> ChrootOutcome {
        self.config = FileBrowserConfig::load_from(store);
        if self.config.save_treeview {
            let expanded = ExpandedPaths::from_config_string(&self.config.expanded_rows);
            debug!("Restoring {} expanded rows", expanded.len());
            self.browser.set_expanded_paths(expanded);
        }
        self.rebuild_autofilter();
        self.apply_config();

        let dir = default_dir(&self.config.default_path);
        info!("File browser starting in {}", dir.display());
        self.browser.chroot(Some(&dir.to_string_lossy()))
    }

    /// Writes the expanded rows (when enabled) and every setting back to `store`.
    pub fn stop(&mut self, store: &mut dyn ConfigStore) {
        if self.config.save_treeview {
            self.config.expanded_rows = self.browser.expanded_paths().to_config_string();
        }
        self.config.save_to(store);
    }

    pub fn handle_message(&mut self, message: HostMessage<'_>) {
        match message {
            HostMessage::ConfigChanged(store) => {
                let expanded_rows = std::mem::take(&mut self.config.expanded_rows);
                self.config = FileBrowserConfig::load_from(store);
                if !self.config.save_treeview {
                    self.config.expanded_rows = expanded_rows;
                }
                self.apply_config();
                self.browser.refresh();
            }
            HostMessage::DecodersChanged => {
                self.rebuild_autofilter();
                self.apply_config();
                if self.config.auto_filter {
                    self.browser.refresh();
                }
            }
        }
    }

    fn update_config(&mut self, update: impl FnOnce(&mut FileBrowserConfig)) -> ChrootOutcome {
        update(&mut self.config);
        self.apply_config();
        self.browser.refresh()
    }

    pub fn toggle_show_hidden(&mut self) -> ChrootOutcome {
        self.update_config(|config| config.show_hidden_files = !config.show_hidden_files)
    }

    pub fn toggle_show_bookmarks(&mut self) -> ChrootOutcome {
        self.update_config(|config| config.show_bookmarks = !config.show_bookmarks)
    }

    pub fn toggle_filter(&mut self) -> ChrootOutcome {
        self.update_config(|config| config.filter_enabled = !config.filter_enabled)
    }

    /// Hands the selected rows to the host playlist; returns how many were added.
    pub fn add_selection(&mut self, nodes: &[NodeId], target: PlaylistTarget) -> usize {
        let paths = self.browser.selected_paths(nodes);
        add_paths_to_playlist(&mut self.host, &paths, target)
    }
}
