//! Content-addressed cache of rendered diagram images.
//!
//! Entries live at `{root}/diagrams/{hash}.{ext}`. A `VERSION` file in the
//! cache root is checked on construction; a mismatch or a missing file wipes
//! the whole cache directory so images from older builds are never reused.
//! Cache I/O errors are logged and otherwise ignored.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Subdirectory of the cache root holding diagram images.
const BUCKET: &str = "diagrams";

/// Parameters that affect a rendered image.
#[derive(Debug, Clone, Copy)]
pub struct DiagramKey<'a> {
    /// Diagram source, verbatim.
    pub source: &'a str,
    /// Renderer settings (command, theme, size, scale, background).
    pub fingerprint: &'a str,
    /// Output format extension ("png" or "svg").
    pub format: &'a str,
}

impl DiagramKey<'_> {
    /// SHA-256 of `"{fingerprint}:{format}:{source}"`, hex-encoded.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        let content = format!("{}:{}:{}", self.fingerprint, self.format, self.source);
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// File-based store of rendered images keyed by [`DiagramKey`] hash.
pub struct DiagramCache {
    dir: PathBuf,
}

impl DiagramCache {
    /// Open the cache rooted at `root`, validating its version.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        validate_version(&root, version);
        Self {
            dir: root.join(BUCKET),
        }
    }

    fn entry(&self, hash: &str, ext: &str) -> PathBuf {
        self.dir.join(format!("{hash}.{ext}"))
    }

    /// Cached image bytes, or `None` on miss.
    #[must_use]
    pub fn get(&self, hash: &str, ext: &str) -> Option<Vec<u8>> {
        fs::read(self.entry(hash, ext)).ok()
    }

    /// Store image bytes, overwriting any existing entry.
    pub fn set(&self, hash: &str, ext: &str, data: &[u8]) {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            tracing::warn!(error = %e, "Failed to create diagram cache directory");
            return;
        }
        if let Err(e) = fs::write(self.entry(hash, ext), data) {
            tracing::warn!(error = %e, "Failed to write diagram cache entry");
        }
    }
}

/// Validate the cache version, wiping the directory on mismatch.
fn validate_version(root: &Path, version: &str) {
    let version_file = root.join("VERSION");

    match fs::read_to_string(&version_file) {
        Ok(stored) if stored == version => {
            tracing::debug!(version, "Cache version matches");
            return;
        }
        Ok(stored) => {
            tracing::info!(%stored, current = version, "Cache version mismatch, wiping cache");
        }
        Err(_) => {
            tracing::info!("No cache VERSION file found, initializing cache");
        }
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        tracing::warn!(error = %e, "Failed to remove cache directory");
    }
    if let Err(e) = fs::create_dir_all(root) {
        tracing::warn!(error = %e, "Failed to create cache directory");
        return;
    }
    if let Err(e) = fs::write(&version_file, version) {
        tracing::warn!(error = %e, "Failed to write cache VERSION file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key<'a>(source: &'a str, fingerprint: &'a str) -> DiagramKey<'a> {
        DiagramKey {
            source,
            fingerprint,
            format: "png",
        }
    }

    #[test]
    fn test_hash_stable_and_sensitive() {
        let a = key("A-->B", "mmdc:default");
        let b = key("A-->B", "mmdc:default");
        let c = key("A-->C", "mmdc:default");
        let d = key("A-->B", "mmdc:dark");
        let e = DiagramKey { format: "svg", ..a };

        assert_eq!(a.compute_hash(), b.compute_hash());
        assert_ne!(a.compute_hash(), c.compute_hash());
        assert_ne!(a.compute_hash(), d.compute_hash());
        assert_ne!(a.compute_hash(), e.compute_hash());
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let hash = key("source", "fp").compute_hash();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_set_and_get() {
        let tmp = TempDir::new().unwrap();
        let cache = DiagramCache::new(tmp.path().join("cache"), "v1");

        assert_eq!(cache.get("abc", "png"), None);
        cache.set("abc", "png", b"\x89PNG");
        assert_eq!(cache.get("abc", "png"), Some(b"\x89PNG".to_vec()));
        assert_eq!(cache.get("abc", "svg"), None);
        assert!(tmp.path().join("cache/diagrams/abc.png").exists());
    }

    #[test]
    fn test_version_mismatch_wipes_cache() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        DiagramCache::new(root.clone(), "v1").set("abc", "png", b"old");
        let cache = DiagramCache::new(root.clone(), "v2");

        assert_eq!(cache.get("abc", "png"), None);
        assert_eq!(fs::read_to_string(root.join("VERSION")).unwrap(), "v2");
    }

    #[test]
    fn test_same_version_keeps_entries() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        DiagramCache::new(root.clone(), "v1").set("abc", "png", b"data");
        let cache = DiagramCache::new(root, "v1");

        assert_eq!(cache.get("abc", "png"), Some(b"data".to_vec()));
    }
}
