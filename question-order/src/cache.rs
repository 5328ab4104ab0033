//! File-based cache of random values (JSON on disk).
//!
//! Why cache?
//! - Quantum draws are quota-bound; re-running for the same questions should
//!   cost zero new draws.
//! - Cached values keep the order stable across runs for unchanged questions.
//!
//! Key: `QuestionId` (SHA-1 of the question text), so reordering or inserting
//! questions between runs never invalidates unrelated entries.
//! Layout: `{"<bits>": {"<question id>": <value>, ...}, ...}`. Only the
//! namespace for the current bit width is consulted; other namespaces are
//! carried through unchanged on save.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::bits;
use crate::errors::CacheError;
use crate::question::QuestionId;

/// Mapping from question identifier to its assigned random value.
pub type Assignments = BTreeMap<QuestionId, u64>;

/// Result of partitioning identifiers against the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lookup {
    /// Identifiers already present, with their cached values.
    pub hits: Assignments,
    /// Identifiers needing a fresh draw, in first-appearance order, deduplicated.
    pub misses: Vec<QuestionId>,
}

/// Persistent random value cache for one bit width.
#[derive(Debug, Clone)]
pub struct RandomCache {
    path: PathBuf,
    bits: u32,
    current: Assignments,
    others: BTreeMap<String, Assignments>,
}

impl RandomCache {
    /// Empty cache that will be written to `path`.
    pub fn empty(path: impl Into<PathBuf>, bits: u32) -> Self {
        Self {
            path: path.into(),
            bits,
            current: Assignments::new(),
            others: BTreeMap::new(),
        }
    }

    /// Cache pre-populated with `entries` for `bits`, not yet written to `path`.
    pub fn from_entries(path: impl Into<PathBuf>, bits: u32, entries: Assignments) -> Self {
        let mut cache = Self::empty(path, bits);
        cache.current = entries;
        cache
    }

    /// Loads the cache from `path`.
    ///
    /// A missing, unreadable or malformed file yields an empty cache. Entries
    /// that do not fit in `bits` are dropped so they get redrawn.
    pub fn load(path: impl Into<PathBuf>, bits: u32) -> Self {
        let mut cache = Self::empty(path, bits);
        if !cache.path.exists() {
            debug!(path = %cache.path.display(), "random cache missing, starting empty");
            return cache;
        }

        let mut namespaces: BTreeMap<String, Assignments> = match fs::read(&cache.path)
            .map_err(CacheError::from)
            .and_then(|data| serde_json::from_slice(&data).map_err(CacheError::from))
        {
            Ok(n) => n,
            Err(e) => {
                warn!(path = %cache.path.display(), error = %e, "could not read random cache");
                return cache;
            }
        };

        let mut current = namespaces.remove(&bits.to_string()).unwrap_or_default();
        let before = current.len();
        current.retain(|_, v| bits::fits(*v, bits));
        if current.len() != before {
            warn!(
                dropped = before - current.len(),
                bits, "dropped cached values outside the bit range"
            );
        }

        debug!(
            path = %cache.path.display(),
            entries = current.len(),
            other_namespaces = namespaces.len(),
            "random cache loaded"
        );
        cache.current = current;
        cache.others = namespaces;
        cache
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Entries for the current bit width.
    pub fn entries(&self) -> &Assignments {
        &self.current
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Splits `ids` into cache hits and misses.
    pub fn lookup<'a, I>(&self, ids: I) -> Lookup
    where
        I: IntoIterator<Item = &'a QuestionId>,
    {
        let mut out = Lookup::default();
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id) {
                continue;
            }
            match self.current.get(id) {
                Some(v) => {
                    out.hits.insert(id.clone(), *v);
                }
                None => out.misses.push(id.clone()),
            }
        }
        out
    }

    /// Unions `new_entries` into the cache and rewrites the whole file.
    ///
    /// The file is written to a temporary sibling and renamed over the
    /// destination, so an interrupted write leaves the previous cache intact.
    pub fn merge_and_save(&mut self, new_entries: &Assignments) -> Result<(), CacheError> {
        self.current
            .extend(new_entries.iter().map(|(k, v)| (k.clone(), *v)));

        let mut doc: BTreeMap<String, &Assignments> =
            self.others.iter().map(|(k, v)| (k.clone(), v)).collect();
        doc.insert(self.bits.to_string(), &self.current);
        let mut json = serde_json::to_vec_pretty(&doc)?;
        json.push(b'\n');

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;

        debug!(
            path = %self.path.display(),
            added = new_entries.len(),
            entries = self.current.len(),
            "random cache saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn id(s: &str) -> QuestionId {
        QuestionId::from_text(s)
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let cache = RandomCache::load(dir.path().join("nope.json"), 27);
        assert!(cache.is_empty());
    }

    #[test]
    fn corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, b"{ not json").unwrap();
        let cache = RandomCache::load(&path, 27);
        assert!(cache.is_empty());
    }

    #[test]
    fn round_trip_lookup() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");

        let mut cache = RandomCache::load(&path, 27);
        let mut new = Assignments::new();
        new.insert(id("A"), 3);
        new.insert(id("B"), 7);
        cache.merge_and_save(&new).unwrap();

        let reloaded = RandomCache::load(&path, 27);
        let lookup = reloaded.lookup([&id("A"), &id("B")]);
        assert_eq!(lookup.hits, new);
        assert!(lookup.misses.is_empty());
    }

    #[test]
    fn lookup_orders_and_dedups_misses() {
        let mut cache = RandomCache::empty("unused.json", 27);
        cache.current.insert(id("b"), 1);

        let ids = [id("c"), id("b"), id("a"), id("c")];
        let lookup = cache.lookup(ids.iter());
        assert_eq!(lookup.misses, vec![id("c"), id("a")]);
        assert_eq!(lookup.hits.get(&id("b")), Some(&1));
    }

    #[test]
    fn other_bit_widths_survive_save() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let old = format!(r#"{{"16": {{"{}": 42}}}}"#, id("x"));
        fs::write(&path, old).unwrap();

        let mut cache = RandomCache::load(&path, 27);
        assert!(cache.is_empty());
        cache
            .merge_and_save(&Assignments::from([(id("y"), 9)]))
            .unwrap();

        let raw: BTreeMap<String, BTreeMap<String, u64>> =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["16"][id("x").as_str()], 42);
        assert_eq!(raw["27"][id("y").as_str()], 9);
    }

    #[test]
    fn out_of_range_entries_are_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let raw = format!(
            r#"{{"16": {{"{}": 65535, "{}": 65536}}}}"#,
            id("ok"),
            id("too-big")
        );
        fs::write(&path, raw).unwrap();

        let cache = RandomCache::load(&path, 16);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.entries().get(&id("ok")), Some(&65535));
    }

    #[test]
    fn save_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cache.json");
        let mut cache = RandomCache::load(&path, 27);
        cache
            .merge_and_save(&Assignments::from([(id("q"), 1)]))
            .unwrap();
        cache
            .merge_and_save(&Assignments::from([(id("r"), 2)]))
            .unwrap();

        let names: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("cache.json")]);
        assert_eq!(RandomCache::load(&path, 27).len(), 2);
    }
}
