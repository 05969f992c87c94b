//! Sidebar file browser engine for a media player.
//!
//! The GUI tree view, the host's config store and its playlist services are
//! reached through the [`TreeModel`], [`ConfigStore`] and [`PlayerHost`]
//! traits. Everything runs synchronously on the caller's thread.

pub mod bookmarks;
pub mod browser;
pub mod config;
pub mod config_persistence;
pub mod expanded_state;
pub mod file_uri;
pub mod filter;
pub mod host;
pub mod icon_cache;
pub mod plugin;
pub mod tree_model;
pub mod utils;

pub use browser::{ChrootOutcome, FileBrowser};
pub use config::{ConfigStore, FileBrowserConfig, MemoryConfigStore};
pub use config_persistence::TomlConfigStore;
pub use host::{PlayerHost, PlaylistTarget};
pub use icon_cache::{Icon, IconCache};
pub use plugin::{FileBrowserPlugin, HostMessage};
pub use tree_model::{NodeId, TreeModel, TreeStore};
