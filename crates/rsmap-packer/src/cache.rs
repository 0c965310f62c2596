//! Directory-backed cache provider.
//!
//! Layout: `<root>/<archive>/<group>/<file>`, with named groups and files
//! stored under their names. Reads of missing entries answer `None`; write
//! failures are logged, not propagated, matching the provider contract.

use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::error;

use rsmap_worldmap::providers::CacheProvider;

pub struct DirCache {
    root: PathBuf,
}

impl DirCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn group_dir(&self, archive: i32, group: &str) -> PathBuf {
        self.root.join(archive.to_string()).join(group)
    }

    fn entry_path(&self, archive: i32, group: &str, file: &str) -> PathBuf {
        self.group_dir(archive, group).join(file)
    }

    fn read_path(path: &Path) -> Option<Bytes> {
        fs::read(path).ok().map(Bytes::from)
    }

    fn write_path(&self, path: &Path, data: &[u8]) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("cannot create {}: {e}", parent.display());
                return;
            }
        }
        if let Err(e) = fs::write(path, data) {
            error!("cannot write {}: {e}", path.display());
        }
    }

    fn numeric_entries(dir: &Path) -> Vec<i32> {
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut ids: Vec<i32> = entries
            .flatten()
            .filter_map(|entry| entry.file_name().to_str().and_then(|name| name.parse().ok()))
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl CacheProvider for DirCache {
    fn read(&self, archive: i32, group: i32, file: i32) -> Option<Bytes> {
        Self::read_path(&self.entry_path(archive, &group.to_string(), &file.to_string()))
    }

    fn read_named(&self, archive: i32, group: &str, file: &str) -> Option<Bytes> {
        Self::read_path(&self.entry_path(archive, group, file))
    }

    fn exists(&self, archive: i32, group: i32, file: i32) -> bool {
        self.entry_path(archive, &group.to_string(), &file.to_string())
            .is_file()
    }

    fn exists_named(&self, archive: i32, group: &str, file: &str) -> bool {
        self.entry_path(archive, group, file).is_file()
    }

    fn write(&self, archive: i32, group: i32, file: i32, data: &[u8]) {
        self.write_path(
            &self.entry_path(archive, &group.to_string(), &file.to_string()),
            data,
        );
    }

    fn write_named(&self, archive: i32, group: &str, file: &str, data: &[u8]) {
        self.write_path(&self.entry_path(archive, group, file), data);
    }

    fn write_named_with_id(&self, archive: i32, group: &str, file: &str, _file_id: i32, data: &[u8]) {
        self.write_path(&self.entry_path(archive, group, file), data);
    }

    fn list(&self, archive: i32) -> Vec<i32> {
        Self::numeric_entries(&self.root.join(archive.to_string()))
    }

    fn list_group(&self, archive: i32, group: i32) -> Vec<i32> {
        Self::numeric_entries(&self.group_dir(archive, &group.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DirCache::new(dir.path());
        assert!(!cache.exists(18, 4, 0));
        assert_eq!(cache.read(18, 4, 0), None);

        cache.write(18, 4, 0, b"geography");
        assert!(cache.exists(18, 4, 0));
        assert_eq!(cache.read(18, 4, 0).unwrap().as_ref(), b"geography");
        assert_eq!(cache.list(18), vec![4]);
        assert_eq!(cache.list_group(18, 4), vec![0]);
    }

    #[test]
    fn roundtrip_named() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DirCache::new(dir.path());
        cache.write_named(19, "details", "zanaris", b"details");
        assert!(cache.exists_named(19, "details", "zanaris"));
        assert_eq!(cache.read_named(19, "details", "zanaris").unwrap().as_ref(), b"details");
        // Named groups do not pollute numeric listings.
        assert_eq!(cache.list(19), Vec::<i32>::new());
    }

    #[test]
    fn allocate_empty_skips_used_ids() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DirCache::new(dir.path());
        cache.write(20, 0, 0, b"a");
        cache.write(20, 1, 0, b"b");
        cache.write(20, 3, 0, b"c");
        assert_eq!(cache.allocate_empty(20), Some(2));
        cache.write(20, 2, 0, b"d");
        assert_eq!(cache.allocate_empty(20), Some(4));
    }
}
