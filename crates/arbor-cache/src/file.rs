//! On-disk cache for rendered views.
//!
//! Each bucket is a directory under the cache root and each entry is one file
//! named after its key:
//!
//! ```text
//! [stored_at: u64 LE, unix seconds][etag_len: u32 LE][etag bytes][data bytes]
//! ```
//!
//! The header is decoded before any data is read, so etag mismatches and age
//! checks never load the rendered body. Entries are written to a hidden
//! sibling file and renamed into place, so readers never see half an entry.
//!
//! The cache root holds a `VERSION` file. When it differs from the running
//! version the root is emptied, so views rendered by another build are never
//! served.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::{Cache, CacheBucket};

const VERSION_FILE: &str = "VERSION";

/// File-based [`Cache`] rooted at a directory on disk.
///
/// Directory layout:
/// ```text
/// {root}/
/// +-- VERSION            # version of the build that wrote the entries
/// +-- browse/            # bucket "browse"
/// |   +-- 3f2a...        # entry keyed by view fingerprint
/// +-- children/          # bucket "children"
///     +-- ...
/// ```
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Open the cache at `root` for the build identified by `version`.
    ///
    /// A missing or different `VERSION` file empties the root first. A root
    /// that cannot be prepared is logged; its buckets then simply miss.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        if let Err(e) = ensure_version(&root, version) {
            tracing::warn!(
                root = %root.display(),
                error = %e,
                "Cache directory unusable, views will be rendered fresh"
            );
        }
        Self { root }
    }

    /// Cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Cache for FileCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(FileCacheBucket {
            dir: self.root.join(name),
        })
    }
}

/// Make `root` hold entries of `version` only.
fn ensure_version(root: &Path, version: &str) -> io::Result<()> {
    let version_file = root.join(VERSION_FILE);
    let stored = fs::read_to_string(&version_file).ok();
    if stored.as_deref() == Some(version) {
        tracing::debug!(version, "Cache version matches");
        return Ok(());
    }

    tracing::info!(
        stored = stored.as_deref().unwrap_or("none"),
        current = version,
        "Resetting view cache"
    );
    if root.exists() {
        fs::remove_dir_all(root)?;
    }
    fs::create_dir_all(root)?;
    fs::write(version_file, version)
}

/// Decoded entry header.
struct Header {
    stored_at: u64,
    etag: Vec<u8>,
}

impl Header {
    fn read(reader: &mut impl Read) -> Option<Self> {
        let mut stamp = [0u8; 8];
        reader.read_exact(&mut stamp).ok()?;
        let mut len = [0u8; 4];
        reader.read_exact(&mut len).ok()?;
        let mut etag = vec![0u8; usize::try_from(u32::from_le_bytes(len)).ok()?];
        reader.read_exact(&mut etag).ok()?;
        Some(Self {
            stored_at: u64::from_le_bytes(stamp),
            etag,
        })
    }

    /// An empty `etag` matches any stored etag.
    fn matches(&self, etag: &str) -> bool {
        etag.is_empty() || self.etag == etag.as_bytes()
    }

    fn age(&self) -> Duration {
        let stored = UNIX_EPOCH + Duration::from_secs(self.stored_at);
        // A clock that moved backwards reports a fresh entry
        SystemTime::now()
            .duration_since(stored)
            .unwrap_or(Duration::ZERO)
    }
}

/// Serialize an entry stamped with the current time.
fn encode(etag: &str, value: &[u8]) -> Option<Vec<u8>> {
    let etag_len = u32::try_from(etag.len()).ok()?;
    let stored_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());

    let mut buf = Vec::with_capacity(12 + etag.len() + value.len());
    buf.extend_from_slice(&stored_at.to_le_bytes());
    buf.extend_from_slice(&etag_len.to_le_bytes());
    buf.extend_from_slice(etag.as_bytes());
    buf.extend_from_slice(value);
    Some(buf)
}

/// A single bucket backed by a directory on disk.
struct FileCacheBucket {
    dir: PathBuf,
}

impl FileCacheBucket {
    /// Entry file for `key`, or `None` unless `key` is a plain visible file name.
    fn entry_path(&self, key: &str) -> Option<PathBuf> {
        let plain = !key.is_empty() && !key.starts_with('.') && !key.contains(['/', '\\']);
        plain.then(|| self.dir.join(key))
    }

    /// Open the entry for `key` positioned after its header.
    fn open(&self, key: &str) -> Option<(BufReader<File>, Header)> {
        let file = File::open(self.entry_path(key)?).ok()?;
        let mut reader = BufReader::new(file);
        let header = Header::read(&mut reader)?;
        Some((reader, header))
    }

    fn write(&self, key: &str, entry: &Path, buf: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let staging = self.dir.join(format!(".{key}.tmp"));
        fs::write(&staging, buf)?;
        fs::rename(&staging, entry)
    }
}

impl CacheBucket for FileCacheBucket {
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>> {
        let (mut reader, header) = self.open(key)?;
        if !header.matches(etag) {
            return None;
        }
        let mut data = Vec::new();
        reader.read_to_end(&mut data).ok()?;
        Some(data)
    }

    fn set(&self, key: &str, etag: &str, value: &[u8]) {
        let Some(entry) = self.entry_path(key) else {
            tracing::debug!(key, "Cache key is not a file name, not stored");
            return;
        };
        let Some(buf) = encode(etag, value) else {
            return;
        };
        if let Err(e) = self.write(key, &entry, &buf) {
            tracing::debug!(path = %entry.display(), error = %e, "Failed to write cache entry");
        }
    }

    fn age(&self, key: &str) -> Option<Duration> {
        self.open(key).map(|(_, header)| header.age())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn browse_bucket(tmp: &TempDir) -> Box<dyn CacheBucket> {
        FileCache::new(tmp.path().join("cache"), "v1").bucket("browse")
    }

    #[test]
    fn test_set_and_get() {
        let tmp = TempDir::new().unwrap();
        let bucket = browse_bucket(&tmp);

        bucket.set("fingerprint", "etag1", br#"{"references":[]}"#);

        assert_eq!(
            bucket.get("fingerprint", "etag1"),
            Some(br#"{"references":[]}"#.to_vec())
        );
        assert_eq!(bucket.get("fingerprint", "etag2"), None);
        assert_eq!(bucket.get("fingerprint", ""), Some(br#"{"references":[]}"#.to_vec()));
    }

    #[test]
    fn test_overwrite_replaces_etag() {
        let tmp = TempDir::new().unwrap();
        let bucket = browse_bucket(&tmp);

        bucket.set("key", "etag1", b"first");
        bucket.set("key", "etag2", b"second");

        assert_eq!(bucket.get("key", "etag1"), None);
        assert_eq!(bucket.get("key", "etag2"), Some(b"second".to_vec()));
    }

    #[test]
    fn test_buckets_are_isolated() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache"), "v1");
        let browse = cache.bucket("browse");
        let children = cache.bucket("children");

        browse.set("key", "etag", b"browse-data");
        children.set("key", "etag", b"children-data");

        assert_eq!(browse.get("key", "etag"), Some(b"browse-data".to_vec()));
        assert_eq!(children.get("key", "etag"), Some(b"children-data".to_vec()));
    }

    #[test]
    fn test_age_of_fresh_entry() {
        let tmp = TempDir::new().unwrap();
        let bucket = browse_bucket(&tmp);

        assert_eq!(bucket.age("key"), None);

        bucket.set("key", "etag", b"data");
        assert!(bucket.age("key").unwrap() < Duration::from_secs(60));
    }

    #[test]
    fn test_age_comes_from_header() {
        let tmp = TempDir::new().unwrap();
        let bucket = browse_bucket(&tmp);
        let an_hour_ago = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            - 3600;
        let mut entry = an_hour_ago.to_le_bytes().to_vec();
        entry.extend_from_slice(&1u32.to_le_bytes());
        entry.extend_from_slice(b"edata");
        fs::create_dir_all(tmp.path().join("cache/browse")).unwrap();
        fs::write(tmp.path().join("cache/browse/key"), entry).unwrap();

        let age = bucket.age("key").unwrap();

        assert!(age >= Duration::from_secs(3600));
        assert_eq!(bucket.get("key", "e"), Some(b"data".to_vec()));
    }

    #[test]
    fn test_truncated_entry_misses() {
        let tmp = TempDir::new().unwrap();
        let bucket = browse_bucket(&tmp);
        fs::create_dir_all(tmp.path().join("cache/browse")).unwrap();
        fs::write(tmp.path().join("cache/browse/key"), [1u8, 2, 3]).unwrap();

        assert_eq!(bucket.get("key", ""), None);
        assert_eq!(bucket.age("key"), None);
    }

    #[test]
    fn test_keys_must_be_plain_file_names() {
        let tmp = TempDir::new().unwrap();
        let bucket = browse_bucket(&tmp);

        for key in ["", "../escape", "a/b", ".hidden"] {
            bucket.set(key, "etag", b"data");
            assert_eq!(bucket.get(key, "etag"), None);
        }

        assert!(!tmp.path().join("cache/escape").exists());
    }

    #[test]
    fn test_write_leaves_no_staging_file() {
        let tmp = TempDir::new().unwrap();
        let bucket = browse_bucket(&tmp);

        bucket.set("key", "etag", b"data");

        let names: Vec<String> = fs::read_dir(tmp.path().join("cache/browse"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["key"]);
    }

    #[test]
    fn test_version_match_keeps_entries() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        FileCache::new(root.clone(), "v1")
            .bucket("browse")
            .set("key", "etag1", b"preserved");
        let reopened = FileCache::new(root, "v1");

        assert_eq!(
            reopened.bucket("browse").get("key", "etag1"),
            Some(b"preserved".to_vec())
        );
    }

    #[test]
    fn test_version_change_empties_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");

        FileCache::new(root.clone(), "v1")
            .bucket("browse")
            .set("key", "etag1", b"stale");
        let upgraded = FileCache::new(root.clone(), "v2");

        assert_eq!(upgraded.bucket("browse").get("key", "etag1"), None);
        assert_eq!(fs::read_to_string(root.join(VERSION_FILE)).unwrap(), "v2");
        assert_eq!(upgraded.root(), root.as_path());
    }

    #[test]
    fn test_missing_version_file_empties_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");
        fs::create_dir_all(root.join("browse")).unwrap();
        fs::write(root.join("browse/orphan"), b"stale data").unwrap();

        let cache = FileCache::new(root.clone(), "v1");

        assert_eq!(cache.bucket("browse").get("orphan", ""), None);
        assert_eq!(fs::read_to_string(root.join(VERSION_FILE)).unwrap(), "v1");
    }
}
