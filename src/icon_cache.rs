//! Row icons and the on-disk coverart thumbnail cache.
//!
//! Directory icons come from the first coverart file found in the folder,
//! scaled to the configured size and cached as PNG under
//! `<cache root>/icons/<size>/`. A cached thumbnail is reused while its
//! modification time is not older than the source image.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageFormat, RgbaImage};
use log::{debug, warn};
use zune_core::{colorspace::ColorSpace, options::DecoderOptions};
use zune_jpeg::JpegDecoder;

const APP_CACHE_DIR: &str = "folderpane";

/// Icon shown in a tree row.
#[derive(Debug, Clone, PartialEq)]
pub enum Icon {
    /// Generic file icon; there is no per-type detection.
    File,
    Folder,
    Bookmarks,
    Coverart(CachedIcon),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedIcon {
    pub source: PathBuf,
    pub cache_path: PathBuf,
    pub image: RgbaImage,
    /// True when the thumbnail was served from disk without regenerating.
    pub from_cache: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconCache {
    root: PathBuf,
}

impl IconCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$XDG_CACHE_HOME/folderpane`, falling back to `$HOME/.cache/folderpane`.
    pub fn default_root() -> PathBuf {
        let base = std::env::var_os("XDG_CACHE_HOME")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| crate::utils::home_dir().join(".cache"));
        base.join(APP_CACHE_DIR)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn icons_dir(&self, size: u32) -> PathBuf {
        self.root.join("icons").join(size.to_string())
    }

    pub fn cache_path(&self, source: &Path, size: u32) -> PathBuf {
        let stem = sanitize_cache_name(&source.to_string_lossy());
        self.icons_dir(size).join(format!("{stem}.png"))
    }

    /// Resolves the icon for a tree row path.
    pub fn icon_for_path<S: AsRef<str>>(&self, path: &Path, coverart_names: &[S], size: u32) -> Icon {
        if !path.is_dir() {
            return Icon::File;
        }
        for name in coverart_names {
            let candidate = path.join(name.as_ref());
            if !candidate.is_file() {
                continue;
            }
            if let Some(icon) = self.cached_icon(&candidate, size) {
                return Icon::Coverart(icon);
            }
        }
        Icon::Folder
    }

    /// Returns the scaled thumbnail for `source`, regenerating the cache entry
    /// when it is missing, stale or unreadable. Cache write failures are
    /// logged and the freshly scaled image is still returned.
    pub fn cached_icon(&self, source: &Path, size: u32) -> Option<CachedIcon> {
        let cache_path = self.cache_path(source, size);
        if cache_is_fresh(&cache_path, source) {
            match image::open(&cache_path) {
                Ok(cached) => {
                    return Some(CachedIcon {
                        source: source.to_path_buf(),
                        cache_path,
                        image: cached.to_rgba8(),
                        from_cache: true,
                    });
                }
                Err(err) => {
                    debug!(
                        "Discarding unreadable icon cache {}: {}",
                        cache_path.display(),
                        err
                    );
                    let _ = fs::remove_file(&cache_path);
                }
            }
        }

        let decoded = decode_image_from_path_with_fallback(source)?;
        let scaled = scale_to_icon(decoded, size);
        if let Err(err) = write_cache_file(&scaled, &cache_path) {
            warn!("Failed to write icon cache {}: {}", cache_path.display(), err);
        }
        Some(CachedIcon {
            source: source.to_path_buf(),
            cache_path,
            image: scaled.to_rgba8(),
            from_cache: false,
        })
    }

    /// Deletes every cached icon and returns how many files were removed.
    pub fn clear(&self) -> usize {
        let mut deleted = 0usize;
        for path in list_files_recursive(&self.root.join("icons")) {
            if fs::remove_file(path).is_ok() {
                deleted = deleted.saturating_add(1);
            }
        }
        deleted
    }
}

impl Default for IconCache {
    fn default() -> Self {
        Self::new(Self::default_root())
    }
}

/// Path separators and spaces become underscores.
pub fn sanitize_cache_name(uri: &str) -> String {
    uri.chars()
        .map(|c| match c {
            '/' | '\\' | ' ' => '_',
            other => other,
        })
        .collect()
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok()?.modified().ok()
}

fn cache_is_fresh(cache_path: &Path, source: &Path) -> bool {
    match (modified(cache_path), modified(source)) {
        (Some(cached), Some(source)) => cached >= source,
        _ => false,
    }
}

fn write_cache_file(image: &DynamicImage, target_path: &Path) -> Result<(), String> {
    let parent = target_path
        .parent()
        .ok_or_else(|| format!("no parent directory for {}", target_path.display()))?;
    crate::utils::ensure_dir_all(parent)?;
    let temp_path = target_path.with_extension("png.tmp");
    save_png_atomic(image, &temp_path, target_path)
}

fn save_png_atomic(image: &DynamicImage, temp_path: &Path, target_path: &Path) -> Result<(), String> {
    if temp_path.exists() {
        let _ = fs::remove_file(temp_path);
    }
    image
        .save_with_format(temp_path, ImageFormat::Png)
        .map_err(|err| format!("failed to encode png: {}", err))?;
    fs::rename(temp_path, target_path).map_err(|err| {
        let _ = fs::remove_file(temp_path);
        format!("failed to move png into place: {}", err)
    })
}

fn looks_like_jpeg(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0xff && bytes[1] == 0xd8
}

fn decode_jpeg_non_strict(bytes: &[u8]) -> Option<DynamicImage> {
    if !looks_like_jpeg(bytes) {
        return None;
    }

    let options = DecoderOptions::new_cmd()
        .set_strict_mode(false)
        .jpeg_set_out_colorspace(ColorSpace::RGBA);
    let mut decoder = JpegDecoder::new_with_options(bytes, options);
    let pixels = decoder.decode().ok()?;
    let (width, height) = decoder.dimensions()?;
    let image = RgbaImage::from_raw(width as u32, height as u32, pixels)?;
    Some(DynamicImage::ImageRgba8(image))
}

fn decode_image_from_memory_with_fallback(bytes: &[u8]) -> Option<DynamicImage> {
    // Scanned covers often carry trailing garbage the strict decoder rejects.
    image::load_from_memory(bytes)
        .ok()
        .or_else(|| decode_jpeg_non_strict(bytes))
}

fn decode_image_from_path_with_fallback(path: &Path) -> Option<DynamicImage> {
    image::open(path).ok().or_else(|| {
        let bytes = fs::read(path).ok()?;
        let decoded = decode_image_from_memory_with_fallback(&bytes);
        if decoded.is_none() {
            debug!("Coverart {} could not be decoded", path.display());
        }
        decoded
    })
}

fn fit_to_max_edge(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (1, 1);
    }
    let clamped = max_edge.max(1);
    if width >= height {
        let scaled_height =
            ((u64::from(height) * u64::from(clamped)) + (u64::from(width) / 2)) / u64::from(width);
        (clamped, scaled_height.max(1) as u32)
    } else {
        let scaled_width =
            ((u64::from(width) * u64::from(clamped)) + (u64::from(height) / 2)) / u64::from(height);
        (scaled_width.max(1) as u32, clamped)
    }
}

/// Scales to fit a `size`×`size` box, preserving aspect ratio.
fn scale_to_icon(decoded: DynamicImage, size: u32) -> DynamicImage {
    let (source_width, source_height) = decoded.dimensions();
    let (target_width, target_height) = fit_to_max_edge(source_width, source_height, size);
    if target_width == source_width && target_height == source_height {
        return decoded;
    }
    decoded.resize_exact(target_width, target_height, FilterType::Lanczos3)
}

fn list_files_recursive(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                stack.push(path);
            } else if file_type.is_file() {
                files.push(path);
            }
        }
    }
    files
}
