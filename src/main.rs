use std::path::{Path, PathBuf};

use clap::Parser;
use folderpane::{
    browser::ChrootOutcome,
    config_persistence::TomlConfigStore,
    host::PlayerHost,
    icon_cache::IconCache,
    plugin::FileBrowserPlugin,
    tree_model::{render_tree, TreeModel, TreeStore},
    utils,
};
use log::{debug, error, info, warn};

const SUPPORTED_AUDIO_EXTENSIONS: [&str; 7] = ["mp3", "wav", "ogg", "flac", "aac", "m4a", "mp4"];

/// Headless stand-in for the player: fixed decoder list, playlists kept in memory.
#[derive(Debug, Default)]
struct StandaloneHost {
    playlists: Vec<(String, Vec<PathBuf>)>,
}

impl StandaloneHost {
    fn new() -> Self {
        Self {
            playlists: vec![("Default".to_string(), Vec::new())],
        }
    }

    fn push(&mut self, playlist: usize, path: &Path) -> Result<(), String> {
        let (_, entries) = self
            .playlists
            .get_mut(playlist)
            .ok_or_else(|| format!("playlist {} does not exist", playlist))?;
        entries.push(path.to_path_buf());
        Ok(())
    }
}

impl PlayerHost for StandaloneHost {
    fn decoder_extensions(&self) -> Vec<String> {
        SUPPORTED_AUDIO_EXTENSIONS
            .iter()
            .map(|ext| ext.to_string())
            .collect()
    }

    fn current_playlist(&self) -> usize {
        0
    }

    fn playlist_count(&self) -> usize {
        self.playlists.len()
    }

    fn playlist_title(&self, index: usize) -> Option<String> {
        self.playlists.get(index).map(|(title, _)| title.clone())
    }

    fn create_playlist(&mut self, title: &str) -> usize {
        self.playlists.push((title.to_string(), Vec::new()));
        self.playlists.len() - 1
    }

    fn add_file(&mut self, playlist: usize, path: &Path) -> Result<(), String> {
        self.push(playlist, path)
    }

    fn add_dir(&mut self, playlist: usize, path: &Path) -> Result<(), String> {
        self.push(playlist, path)
    }

    fn playlist_changed(&mut self) {
        debug!("Playlist changed");
    }
}

/// Headless sidebar file browser: prints the tree for a directory.
#[derive(Parser, Debug)]
#[command(name = "folderpane", version, about)]
struct CliArgs {
    /// Config file (default: <config dir>/folderpane/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Icon cache directory
    #[arg(long, value_name = "DIR")]
    cache: Option<PathBuf>,

    /// Expand the row for PATH after loading; may be repeated
    #[arg(long, value_name = "PATH")]
    expand: Vec<PathBuf>,

    /// Log at debug level
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Directory to browse instead of the configured default
    #[arg(value_name = "DIR")]
    directory: Option<String>,
}

fn default_config_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| utils::home_dir().join(".config"))
        .join("folderpane")
        .join("config.toml")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let mut clog = colog::default_builder();
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    clog.filter(None, level);
    clog.init();

    std::panic::set_hook(Box::new(|panic_info| {
        let current_thread = std::thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
    }));

    let config_file = args.config.clone().unwrap_or_else(default_config_file);
    info!("Using config file {}", config_file.display());
    let mut store = TomlConfigStore::open(&config_file);

    let icons = IconCache::new(args.cache.clone().unwrap_or_else(IconCache::default_root));
    let mut plugin = FileBrowserPlugin::new(TreeStore::new(), StandaloneHost::new(), icons);
    if plugin.start(&store) == ChrootOutcome::InvalidPath {
        warn!("Default directory is not browsable");
    }

    if let Some(directory) = args.directory.as_deref() {
        if plugin.browser_mut().chroot(Some(directory)) == ChrootOutcome::InvalidPath {
            return Err(format!("not a directory: {}", directory).into());
        }
    }

    for path in &args.expand {
        let path = PathBuf::from(utils::strip_trailing_separator(&path.to_string_lossy()));
        if !plugin.browser_mut().expand_path(&path) {
            warn!("No loaded row for {}", path.display());
        }
    }

    let browser = plugin.browser();
    println!("{}", browser.address());
    print!("{}", render_tree(browser.model()));

    let model = browser.model();
    let files: Vec<_> = model
        .children(None)
        .into_iter()
        .filter(|node| model.uri(*node).is_some_and(Path::is_file))
        .collect();
    if !files.is_empty() {
        println!("{}", browser.drag_payload(&files));
    }

    plugin.stop(&mut store);
    if let Err(err) = store.persist() {
        error!("Failed to save config: {}", err);
    }
    Ok(())
}
