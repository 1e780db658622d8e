//! Local cache of exported anchor bytes
//!
//! Entries are keyed by anchor id and version so a stale local copy is never
//! imported after another device saved a newer one. Only the newest version
//! of each anchor is kept.

use crate::error::Result;
use rustc_hash::FxHashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, warn};

/// Storage for exported anchor payloads
///
/// Calls are synchronous; payloads are small and the cache sits next to
/// the download that would otherwise be needed.
pub trait AnchorCache: Send + Sync {
    fn contains(&self, id: &str, version: u32) -> bool;

    /// Bytes for exactly this version, if cached
    fn load(&self, id: &str, version: u32) -> Result<Option<Vec<u8>>>;

    /// Store bytes for a version, replacing older versions of the anchor
    fn save(&self, id: &str, version: u32, bytes: &[u8]) -> Result<()>;
}

// =============================================================================
// MEMORY
// =============================================================================

/// In-process cache, used when no cache directory is configured
#[derive(Default)]
pub struct MemoryAnchorCache {
    entries: RwLock<FxHashMap<String, (u32, Vec<u8>)>>,
}

impl MemoryAnchorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AnchorCache for MemoryAnchorCache {
    fn contains(&self, id: &str, version: u32) -> bool {
        self.entries
            .read()
            .map(|entries| matches!(entries.get(id), Some((v, _)) if *v == version))
            .unwrap_or(false)
    }

    fn load(&self, id: &str, version: u32) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries
            .get(id)
            .filter(|(v, _)| *v == version)
            .map(|(_, bytes)| bytes.clone()))
    }

    fn save(&self, id: &str, version: u32, bytes: &[u8]) -> Result<()> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.insert(id.to_string(), (version, bytes.to_vec()));
        Ok(())
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> io::Error {
    io::Error::new(io::ErrorKind::Other, "anchor cache lock poisoned")
}

// =============================================================================
// FILE SYSTEM
// =============================================================================

/// Directory-backed cache
///
/// Files are named `<hash(id)>.<version>.anchor` so ids with path-hostile
/// characters are safe and all versions of one anchor share a prefix.
pub struct FileAnchorCache {
    dir: PathBuf,
}

impl FileAnchorCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name prefix for an anchor id
    ///
    /// 64-bit FNV-1a over the id's UTF-8 bytes. The value is part of the
    /// on-disk format and must not change between releases.
    fn key(id: &str) -> String {
        const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
        const PRIME: u64 = 0x0000_0100_0000_01b3;

        let hash = id.bytes().fold(OFFSET_BASIS, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(PRIME)
        });
        format!("{:016x}", hash)
    }

    fn path(&self, id: &str, version: u32) -> PathBuf {
        self.dir
            .join(format!("{}.{}.anchor", Self::key(id), version))
    }

    /// Remove every cached version of `id` except `keep`
    fn prune(&self, id: &str, keep: u32) -> io::Result<()> {
        let prefix = format!("{}.", Self::key(id));
        let keep_name = format!("{}{}.anchor", prefix, keep);

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.starts_with(&prefix) && name.ends_with(".anchor") && name != keep_name {
                fs::remove_file(entry.path())?;
                debug!(file = name, "pruned stale anchor cache entry");
            }
        }
        Ok(())
    }
}

impl AnchorCache for FileAnchorCache {
    fn contains(&self, id: &str, version: u32) -> bool {
        self.path(id, version).is_file()
    }

    fn load(&self, id: &str, version: u32) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path(id, version)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, id: &str, version: u32, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        // Write then rename so a crash never leaves a truncated entry
        let path = self.path(id, version);
        let partial = path.with_extension("partial");
        fs::write(&partial, bytes)?;
        fs::rename(&partial, &path)?;

        if let Err(err) = self.prune(id, version) {
            warn!("failed to prune anchor cache for {}: {}", id, err);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "enklu-anchor-cache-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_memory_cache_is_versioned() {
        let cache = MemoryAnchorCache::new();
        assert!(cache.is_empty());

        cache.save("a1", 1, b"v1").unwrap();
        assert!(cache.contains("a1", 1));
        assert_eq!(cache.load("a1", 1).unwrap(), Some(b"v1".to_vec()));

        cache.save("a1", 2, b"v2").unwrap();
        assert!(!cache.contains("a1", 1));
        assert_eq!(cache.load("a1", 1).unwrap(), None);
        assert_eq!(cache.load("a1", 2).unwrap(), Some(b"v2".to_vec()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_file_keys_are_stable() {
        assert_eq!(FileAnchorCache::key(""), "cbf29ce484222325");
        assert_eq!(FileAnchorCache::key("foobar"), "85944171f73967e8");
        assert_eq!(FileAnchorCache::key("anchor-1"), "44381c763c21c71e");

        let cache = FileAnchorCache::new("/cache");
        assert_eq!(
            cache.path("anchor-1", 3),
            Path::new("/cache").join("44381c763c21c71e.3.anchor")
        );
    }

    #[test]
    fn test_file_cache_round_trip_and_prune() {
        let dir = scratch_dir("prune");
        let cache = FileAnchorCache::new(&dir);

        assert_eq!(cache.load("scene/anchor:1", 1).unwrap(), None);

        cache.save("scene/anchor:1", 1, b"first").unwrap();
        cache.save("other", 7, b"other").unwrap();
        assert!(cache.contains("scene/anchor:1", 1));

        cache.save("scene/anchor:1", 2, b"second").unwrap();
        assert!(!cache.contains("scene/anchor:1", 1));
        assert_eq!(
            cache.load("scene/anchor:1", 2).unwrap(),
            Some(b"second".to_vec())
        );

        // Other anchors are untouched by pruning
        assert!(cache.contains("other", 7));
        let files = fs::read_dir(&dir).unwrap().count();
        assert_eq!(files, 2);

        fs::remove_dir_all(&dir).unwrap();
    }
}
