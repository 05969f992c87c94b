//! File browser configuration model, defaults and host config-store mapping.

use std::collections::BTreeMap;

pub const CONFSTR_ENABLED: &str = "filebrowser.enabled";
pub const CONFSTR_HIDDEN: &str = "filebrowser.hidden";
pub const CONFSTR_DEFAULT_PATH: &str = "filebrowser.defaultpath";
pub const CONFSTR_SHOW_HIDDEN_FILES: &str = "filebrowser.showhidden";
pub const CONFSTR_FILTER_ENABLED: &str = "filebrowser.filter_enabled";
pub const CONFSTR_FILTER: &str = "filebrowser.filter";
pub const CONFSTR_FILTER_AUTO: &str = "filebrowser.autofilter";
pub const CONFSTR_SHOW_BOOKMARKS: &str = "filebrowser.showbookmarks";
pub const CONFSTR_SHOW_ICONS: &str = "filebrowser.showicons";
pub const CONFSTR_WIDTH: &str = "filebrowser.sidebar_width";
pub const CONFSTR_COVERART: &str = "filebrowser.coverart_files";
pub const CONFSTR_COVERART_SIZE: &str = "filebrowser.coverart_size";
pub const CONFSTR_SAVE_TREEVIEW: &str = "filebrowser.save_treeview";
pub const CONFSTR_EXPANDED_ROWS: &str = "filebrowser.treeview_rows";
pub const CONFSTR_CHROOT_ON_DCLICK: &str = "filebrowser.chroot_on_dclick";
pub const CONFSTR_COLOR_BG: &str = "filebrowser.color_bg";
pub const CONFSTR_COLOR_FG: &str = "filebrowser.color_fg";
pub const CONFSTR_COLOR_BG_SEL: &str = "filebrowser.color_bg_sel";
pub const CONFSTR_COLOR_FG_SEL: &str = "filebrowser.color_fg_sel";

pub const DEFAULT_COVERART: &str = "cover.jpg;folder.jpg;front.jpg";
pub const DEFAULT_SIDEBAR_WIDTH: u32 = 200;
pub const DEFAULT_COVERART_SIZE: u32 = 24;
const MIN_SIDEBAR_WIDTH: u32 = 50;
const MAX_SIDEBAR_WIDTH: u32 = 2000;
const MIN_COVERART_SIZE: u32 = 8;
const MAX_COVERART_SIZE: u32 = 512;

/// Typed key-value access to the host's configuration store.
pub trait ConfigStore {
    fn get_int(&self, key: &str, default: i64) -> i64;
    fn get_str(&self, key: &str, default: &str) -> String;
    fn set_int(&mut self, key: &str, value: i64);
    fn set_str(&mut self, key: &str, value: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Int(i64),
    Str(String),
}

/// In-memory store for hosts that persist settings themselves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryConfigStore {
    values: BTreeMap<String, StoredValue>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.values.get(key) {
            Some(StoredValue::Int(value)) => *value,
            Some(StoredValue::Str(text)) => text.trim().parse().unwrap_or(default),
            None => default,
        }
    }

    fn get_str(&self, key: &str, default: &str) -> String {
        match self.values.get(key) {
            Some(StoredValue::Str(text)) => text.clone(),
            Some(StoredValue::Int(value)) => value.to_string(),
            None => default.to_string(),
        }
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), StoredValue::Int(value));
    }

    fn set_str(&mut self, key: &str, value: &str) {
        self.values
            .insert(key.to_string(), StoredValue::Str(value.to_string()));
    }
}

/// Sidebar colors as host color strings; empty means "use the theme".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorConfig {
    pub background: String,
    pub foreground: String,
    pub background_selected: String,
    pub foreground_selected: String,
}

/// Root file browser configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct FileBrowserConfig {
    pub enabled: bool,
    /// Sidebar hidden by the user (menu toggle), independent of `enabled`.
    pub hidden: bool,
    pub default_path: String,
    pub show_hidden_files: bool,
    pub filter_enabled: bool,
    /// Manual filter, used only when `auto_filter` is off.
    pub filter: String,
    pub auto_filter: bool,
    pub show_bookmarks: bool,
    pub show_icons: bool,
    pub sidebar_width: u32,
    /// Semicolon-separated coverart filenames, in lookup order.
    pub coverart_files: String,
    pub coverart_size: u32,
    pub save_treeview: bool,
    /// Space-separated file URIs of expanded directories.
    pub expanded_rows: String,
    pub chroot_on_dclick: bool,
    pub colors: ColorConfig,
}

impl Default for FileBrowserConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hidden: false,
            default_path: String::new(),
            show_hidden_files: false,
            filter_enabled: true,
            filter: String::new(),
            auto_filter: true,
            show_bookmarks: true,
            show_icons: true,
            sidebar_width: DEFAULT_SIDEBAR_WIDTH,
            coverart_files: DEFAULT_COVERART.to_string(),
            coverart_size: DEFAULT_COVERART_SIZE,
            save_treeview: true,
            expanded_rows: String::new(),
            chroot_on_dclick: true,
            colors: ColorConfig::default(),
        }
    }
}

fn int_to_u32(value: i64, default: u32) -> u32 {
    u32::try_from(value).unwrap_or(default)
}

impl FileBrowserConfig {
    pub fn load_from(store: &dyn ConfigStore) -> Self {
        let defaults = Self::default();
        let get_bool =
            |key: &str, default: bool| store.get_int(key, i64::from(default)) != 0;
        let config = Self {
            enabled: get_bool(CONFSTR_ENABLED, defaults.enabled),
            hidden: get_bool(CONFSTR_HIDDEN, defaults.hidden),
            default_path: store.get_str(CONFSTR_DEFAULT_PATH, &defaults.default_path),
            show_hidden_files: get_bool(CONFSTR_SHOW_HIDDEN_FILES, defaults.show_hidden_files),
            filter_enabled: get_bool(CONFSTR_FILTER_ENABLED, defaults.filter_enabled),
            filter: store.get_str(CONFSTR_FILTER, &defaults.filter),
            auto_filter: get_bool(CONFSTR_FILTER_AUTO, defaults.auto_filter),
            show_bookmarks: get_bool(CONFSTR_SHOW_BOOKMARKS, defaults.show_bookmarks),
            show_icons: get_bool(CONFSTR_SHOW_ICONS, defaults.show_icons),
            sidebar_width: int_to_u32(
                store.get_int(CONFSTR_WIDTH, i64::from(defaults.sidebar_width)),
                defaults.sidebar_width,
            ),
            coverart_files: store.get_str(CONFSTR_COVERART, &defaults.coverart_files),
            coverart_size: int_to_u32(
                store.get_int(CONFSTR_COVERART_SIZE, i64::from(defaults.coverart_size)),
                defaults.coverart_size,
            ),
            save_treeview: get_bool(CONFSTR_SAVE_TREEVIEW, defaults.save_treeview),
            expanded_rows: store.get_str(CONFSTR_EXPANDED_ROWS, &defaults.expanded_rows),
            chroot_on_dclick: get_bool(CONFSTR_CHROOT_ON_DCLICK, defaults.chroot_on_dclick),
            colors: ColorConfig {
                background: store.get_str(CONFSTR_COLOR_BG, ""),
                foreground: store.get_str(CONFSTR_COLOR_FG, ""),
                background_selected: store.get_str(CONFSTR_COLOR_BG_SEL, ""),
                foreground_selected: store.get_str(CONFSTR_COLOR_FG_SEL, ""),
            },
        };
        sanitize_config(config)
    }

    pub fn save_to(&self, store: &mut dyn ConfigStore) {
        store.set_int(CONFSTR_ENABLED, i64::from(self.enabled));
        store.set_int(CONFSTR_HIDDEN, i64::from(self.hidden));
        store.set_str(CONFSTR_DEFAULT_PATH, &self.default_path);
        store.set_int(CONFSTR_SHOW_HIDDEN_FILES, i64::from(self.show_hidden_files));
        store.set_int(CONFSTR_FILTER_ENABLED, i64::from(self.filter_enabled));
        store.set_str(CONFSTR_FILTER, &self.filter);
        store.set_int(CONFSTR_FILTER_AUTO, i64::from(self.auto_filter));
        store.set_int(CONFSTR_SHOW_BOOKMARKS, i64::from(self.show_bookmarks));
        store.set_int(CONFSTR_SHOW_ICONS, i64::from(self.show_icons));
        store.set_int(CONFSTR_WIDTH, i64::from(self.sidebar_width));
        store.set_str(CONFSTR_COVERART, &self.coverart_files);
        store.set_int(CONFSTR_COVERART_SIZE, i64::from(self.coverart_size));
        store.set_int(CONFSTR_SAVE_TREEVIEW, i64::from(self.save_treeview));
        store.set_str(CONFSTR_EXPANDED_ROWS, &self.expanded_rows);
        store.set_int(CONFSTR_CHROOT_ON_DCLICK, i64::from(self.chroot_on_dclick));
        store.set_str(CONFSTR_COLOR_BG, &self.colors.background);
        store.set_str(CONFSTR_COLOR_FG, &self.colors.foreground);
        store.set_str(CONFSTR_COLOR_BG_SEL, &self.colors.background_selected);
        store.set_str(CONFSTR_COLOR_FG_SEL, &self.colors.foreground_selected);
    }

    /// Coverart candidates in lookup order, empty entries dropped.
    pub fn coverart_names(&self) -> Vec<String> {
        self.coverart_files
            .split(';')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// The filter string in effect: the decoder-derived one in auto mode.
    pub fn active_filter<'a>(&'a self, known_extensions: &'a str) -> &'a str {
        if self.auto_filter {
            known_extensions
        } else {
            &self.filter
        }
    }
}

pub fn sanitize_config(config: FileBrowserConfig) -> FileBrowserConfig {
    FileBrowserConfig {
        sidebar_width: config
            .sidebar_width
            .clamp(MIN_SIDEBAR_WIDTH, MAX_SIDEBAR_WIDTH),
        coverart_size: config
            .coverart_size
            .clamp(MIN_COVERART_SIZE, MAX_COVERART_SIZE),
        ..config
    }
}
