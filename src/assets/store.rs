use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{
    assets::decode::{DecodedPixels, decode_image},
    foundation::error::{PaintError, PaintResult},
    paint::image::{Image, SharedImage},
};

/// Pixel producer consulted by [`ImageStore`] on a cache miss or forced reload.
pub trait PixelSource {
    /// Produce pixels for `name`.
    fn decode(&self, name: &str) -> PaintResult<DecodedPixels>;

    /// Key [`ImageStore`] caches `name` under. Names that resolve to the same pixels should map
    /// to the same key. Defaults to the name itself.
    fn cache_key(&self, name: &str) -> PaintResult<String> {
        Ok(name.to_string())
    }
}

impl<F> PixelSource for F
where
    F: Fn(&str) -> PaintResult<DecodedPixels>,
{
    fn decode(&self, name: &str) -> PaintResult<DecodedPixels> {
        self(name)
    }
}

/// Canonical form of a root-relative image name.
///
/// Backslashes count as separators; empty and `.` segments are dropped. Absolute names, drive
/// prefixes (`C:`) and any `..` segment are rejected, so a name can never leave its root.
pub fn normalize_rel_path(name: &str) -> PaintResult<String> {
    let unified = name.replace('\\', "/");
    if unified.starts_with('/') {
        return Err(PaintError::validation(format!(
            "image name '{name}' is absolute"
        )));
    }

    let segments = unified
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .map(|seg| match seg {
            ".." => Err(PaintError::validation(format!(
                "image name '{name}' escapes its root"
            ))),
            _ if seg.ends_with(':') => Err(PaintError::validation(format!(
                "image name '{name}' carries a drive prefix"
            ))),
            _ => Ok(seg),
        })
        .collect::<PaintResult<Vec<_>>>()?;

    if segments.is_empty() {
        return Err(PaintError::validation(format!(
            "image name '{name}' has no file component"
        )));
    }
    Ok(segments.join("/"))
}

/// Filesystem producer: reads `root/<name>` and decodes it with [`decode_image`].
#[derive(Clone, Debug)]
pub struct FsPixelSource {
    root: PathBuf,
}

impl FsPixelSource {
    /// Producer resolving names against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory used when resolving names.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_bytes(&self, norm_path: &str) -> PaintResult<Vec<u8>> {
        let path = self.root.join(Path::new(norm_path));
        std::fs::read(&path)
            .with_context(|| format!("read image bytes from '{}'", path.display()))
            .map_err(PaintError::from)
    }
}

impl PixelSource for FsPixelSource {
    fn decode(&self, name: &str) -> PaintResult<DecodedPixels> {
        let bytes = self.read_bytes(&normalize_rel_path(name)?)?;
        decode_image(&bytes)
    }

    fn cache_key(&self, name: &str) -> PaintResult<String> {
        normalize_rel_path(name)
    }
}

/// Whether [`ImageStore::load`] may answer from the cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ForceReload {
    /// Return the cached instance when there is one.
    #[default]
    No,
    /// Decode again and replace the cache entry.
    Yes,
}

/// Limits applied by [`ImageStore`] to producer output.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ImageStoreOpts {
    /// Largest accepted pixel count for one image.
    pub max_pixels: usize,
}

impl Default for ImageStoreOpts {
    fn default() -> Self {
        Self {
            // 16k x 16k.
            max_pixels: 1 << 28,
        }
    }
}

/// Name-keyed cache of shared images in front of a [`PixelSource`].
///
/// The cache is an ordinary value owned by the caller; create as many as needed.
#[derive(Debug)]
pub struct ImageStore<S = FsPixelSource> {
    source: S,
    opts: ImageStoreOpts,
    images: HashMap<String, SharedImage>,
}

impl ImageStore<FsPixelSource> {
    /// Store reading files below `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self::new(FsPixelSource::new(root))
    }
}

impl<S: PixelSource> ImageStore<S> {
    /// Store over `source` with default options.
    pub fn new(source: S) -> Self {
        Self::with_opts(source, ImageStoreOpts::default())
    }

    /// Store over `source` with explicit options.
    pub fn with_opts(source: S, opts: ImageStoreOpts) -> Self {
        Self {
            source,
            opts,
            images: HashMap::new(),
        }
    }

    /// The underlying producer.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Options in effect.
    pub fn opts(&self) -> &ImageStoreOpts {
        &self.opts
    }

    /// Load `name`, reporting producer failures.
    ///
    /// A failed forced reload leaves the previous cache entry in place.
    #[tracing::instrument(skip(self))]
    pub fn try_load(&mut self, name: &str, reload: ForceReload) -> PaintResult<SharedImage> {
        let key = self.source.cache_key(name)?;
        if reload == ForceReload::No
            && let Some(img) = self.images.get(&key)
        {
            tracing::debug!(%key, "image cache hit");
            return Ok(img.clone());
        }

        let decoded = self.source.decode(name)?;
        let area = decoded.size.area();
        if area > self.opts.max_pixels {
            return Err(PaintError::validation(format!(
                "image '{name}' has {area} pixels, limit is {}",
                self.opts.max_pixels
            )));
        }

        let mut img = decoded.into_image()?;
        img.set_name(key.as_str());
        tracing::debug!(size = %img.size(), format = ?img.format(), "image decoded");

        let shared = img.into_shared();
        self.images.insert(key, shared.clone());
        Ok(shared)
    }

    /// Load `name`; failures are logged and yield an uncached null image.
    pub fn load(&mut self, name: &str, reload: ForceReload) -> SharedImage {
        match self.try_load(name, reload) {
            Ok(img) => img,
            Err(err) => {
                tracing::warn!(name, %err, "image load failed, returning null image");
                Image::null().into_shared()
            }
        }
    }

    /// Cached instance for `name`, without touching the producer.
    pub fn get(&self, name: &str) -> Option<SharedImage> {
        self.images.get(&self.source.cache_key(name).ok()?).cloned()
    }

    /// `true` when `name` is cached.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Drop the cache entry for `name`. Outstanding handles stay alive.
    pub fn evict(&mut self, name: &str) -> Option<SharedImage> {
        let key = self.source.cache_key(name).ok()?;
        self.images.remove(&key)
    }

    /// Drop every cache entry.
    pub fn clear(&mut self) {
        self.images.clear();
    }

    /// Number of cached images.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
