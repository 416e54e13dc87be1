//! Image decoding and the CPU-side texture cache.
//!
//! Decoded pixels stay resident here as RGBA8; the renderer owns the GPU
//! textures and uploads an entry whenever its dirty flag is set. Files are
//! decoded once and identified by path; raw pixel buffers are identified by
//! their data pointer so redrawing an animated buffer reuses one texture.

use std::collections::HashMap;

use easel_core::TextureKey;
use thiserror::Error;

/// Failure to load an asset from disk.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to parse font {path}: {msg}")]
    Font { path: String, msg: String },
}

pub(crate) struct ImagePixels {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
    pub dirty: bool,
}

#[derive(Default)]
pub(crate) struct ImageCache {
    by_path: HashMap<String, TextureKey>,
    by_ptr: HashMap<usize, TextureKey>,
    entries: HashMap<TextureKey, ImagePixels>,
    next_key: u64,
}

impl ImageCache {
    /// Decodes an image file, normalizing to RGBA8. Repeated loads of the
    /// same path return the cached entry without touching the disk.
    pub fn load_file(&mut self, path: &str) -> Result<TextureKey, AssetError> {
        if let Some(&key) = self.by_path.get(path) {
            return Ok(key);
        }
        let dynamic = image::ImageReader::open(path)
            .map_err(|source| AssetError::Io { path: path.to_string(), source })?
            .decode()
            .map_err(|source| AssetError::Decode { path: path.to_string(), source })?;
        let rgba = dynamic.to_rgba8();
        let (width, height) = rgba.dimensions();

        let key = self.alloc_key();
        self.entries.insert(key, ImagePixels { width, height, rgba: rgba.into_raw(), dirty: true });
        self.by_path.insert(path.to_string(), key);
        Ok(key)
    }

    /// Registers a caller-owned RGBA8 buffer.
    ///
    /// The buffer is identified by its address. A buffer seen before is
    /// only re-copied when `reload` is set (or its dimensions changed), so
    /// callers animating a buffer pass `reload = true` after mutating it
    /// and `false` to reuse the pixels already uploaded. Returns `None`
    /// when the buffer is smaller than `width * height * 4`.
    pub fn put_raw(&mut self, data: &[u8], width: u32, height: u32, reload: bool) -> Option<TextureKey> {
        let needed = width as usize * height as usize * 4;
        if width == 0 || height == 0 || data.len() < needed {
            return None;
        }
        let ptr = data.as_ptr() as usize;
        if let Some(&key) = self.by_ptr.get(&ptr)
            && let Some(entry) = self.entries.get_mut(&key)
        {
            if reload || entry.width != width || entry.height != height {
                entry.width = width;
                entry.height = height;
                entry.rgba.clear();
                entry.rgba.extend_from_slice(&data[..needed]);
                entry.dirty = true;
            }
            return Some(key);
        }
        let key = self.alloc_key();
        self.by_ptr.insert(ptr, key);
        self.entries.insert(
            key,
            ImagePixels { width, height, rgba: data[..needed].to_vec(), dirty: true },
        );
        Some(key)
    }

    pub fn size_of(&self, key: TextureKey) -> Option<(u32, u32)> {
        self.entries.get(&key).map(|e| (e.width, e.height))
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = (TextureKey, &mut ImagePixels)> {
        self.entries.iter_mut().map(|(&k, v)| (k, v))
    }

    fn alloc_key(&mut self) -> TextureKey {
        let key = TextureKey(self.next_key);
        self.next_key += 1;
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_io_error() {
        let mut cache = ImageCache::default();
        match cache.load_file("/no/such/image.png") {
            Err(AssetError::Io { path, .. }) => assert_eq!(path, "/no/such/image.png"),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn raw_buffer_reuses_its_texture_key() {
        let mut cache = ImageCache::default();
        let pixels = vec![0u8; 2 * 2 * 4];
        let first = cache.put_raw(&pixels, 2, 2, false).unwrap();
        let second = cache.put_raw(&pixels, 2, 2, false).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.size_of(first), Some((2, 2)));
    }

    #[test]
    fn raw_buffer_recopies_only_on_reload() {
        let mut cache = ImageCache::default();
        let mut pixels = vec![0u8; 4];
        let key = cache.put_raw(&pixels, 1, 1, false).unwrap();
        pixels[0] = 0xff;
        cache.put_raw(&pixels, 1, 1, false).unwrap();
        let stale = cache.entries.get(&key).unwrap().rgba[0];
        assert_eq!(stale, 0);
        cache.put_raw(&pixels, 1, 1, true).unwrap();
        let fresh = cache.entries.get(&key).unwrap().rgba[0];
        assert_eq!(fresh, 0xff);
    }

    #[test]
    fn undersized_raw_buffer_is_rejected() {
        let mut cache = ImageCache::default();
        let pixels = vec![0u8; 7];
        assert!(cache.put_raw(&pixels, 2, 2, false).is_none());
        assert!(cache.put_raw(&pixels, 0, 4, false).is_none());
    }

    #[test]
    fn distinct_buffers_get_distinct_keys() {
        let mut cache = ImageCache::default();
        let a = vec![0u8; 4];
        let b = vec![0u8; 4];
        let ka = cache.put_raw(&a, 1, 1, false).unwrap();
        let kb = cache.put_raw(&b, 1, 1, false).unwrap();
        assert_ne!(ka, kb);
    }
}
