//! Source cache
//!
//! Real files are keyed by path and revalidated against their modification
//! time; virtual files (console entries, editor buffers) are registered
//! explicitly and never touched on disk.

use super::highlight_source;
use lru::LruCache;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::num::NonZeroUsize;
use std::time::SystemTime;
use tracing::{debug, trace};

/// Lines shown before the marked line in an excerpt.
pub const DEFAULT_CONTEXT: usize = 4;
const DEFAULT_CAPACITY: usize = 256;

static GLOBAL: Lazy<SourceCache> = Lazy::new(SourceCache::new);

/// Content hash of a cached source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    pub fn of(source: &str) -> Self {
        Self(*blake3::hash(source.as_bytes()).as_bytes())
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub filename: String,
    pub source: String,
    pub lines: Vec<String>,
    /// `None` for virtual files
    pub mtime: Option<SystemTime>,
    pub hash: ContentHash,
}

impl CacheEntry {
    fn new(filename: &str, source: String, mtime: Option<SystemTime>) -> Self {
        let hash = ContentHash::of(&source);
        Self::with_hash(filename, source, mtime, hash)
    }

    fn with_hash(filename: &str, source: String, mtime: Option<SystemTime>, hash: ContentHash) -> Self {
        let lines = split_lines(&source);
        Self { filename: filename.to_string(), source, lines, mtime, hash }
    }
}

/// Cache statistics
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    /// Files re-read because their content changed
    pub reloads: usize,
    /// Files whose modification time changed but not their content
    pub unchanged: usize,
}

struct CacheState {
    virtual_files: HashMap<String, CacheEntry>,
    files: LruCache<String, CacheEntry>,
    stats: CacheStats,
}

pub struct SourceCache {
    state: Mutex<CacheState>,
    context: usize,
}

impl Default for SourceCache {
    fn default() -> Self {
        Self::new()
    }
}

/// `str.splitlines()` with every line terminated by a newline.
fn split_lines(source: &str) -> Vec<String> {
    source
        .split_inclusive('\n')
        .flat_map(|chunk| {
            let body = chunk.trim_end_matches(['\n', '\r']);
            body.split('\r').map(|line| format!("{}\n", line)).collect::<Vec<_>>()
        })
        .collect()
}

fn is_virtual(filename: &str) -> bool {
    filename.starts_with('<')
}

impl SourceCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Mutex::new(CacheState {
                virtual_files: HashMap::new(),
                files: LruCache::new(capacity),
                stats: CacheStats::default(),
            }),
            context: DEFAULT_CONTEXT,
        }
    }

    pub fn with_context(mut self, context: usize) -> Self {
        self.context = context;
        self
    }

    /// Process-wide cache shared by sessions that do not bring their own.
    pub fn global() -> &'static SourceCache {
        &GLOBAL
    }

    /// Registers `source` under `filename`. Names that look like real paths
    /// are stored without a timestamp, so the registered text wins until the
    /// entry is removed.
    pub fn add(&self, filename: &str, source: &str) {
        let entry = CacheEntry::new(filename, source.to_string(), None);
        debug!(filename, lines = entry.lines.len(), "source registered");
        let mut state = self.state.lock();
        state.files.pop(filename);
        state.virtual_files.insert(filename.to_string(), entry);
    }

    pub fn remove(&self, filename: &str) {
        let mut state = self.state.lock();
        state.virtual_files.remove(filename);
        state.files.pop(filename);
    }

    pub fn stats(&self) -> CacheStats {
        self.state.lock().stats
    }

    /// Full entry for `filename`, reading or re-reading the file if needed.
    pub fn entry(&self, filename: &str) -> Option<CacheEntry> {
        let mut state = self.state.lock();
        if let Some(entry) = state.virtual_files.get(filename) {
            let entry = entry.clone();
            state.stats.hits += 1;
            return Some(entry);
        }
        if is_virtual(filename) {
            state.stats.misses += 1;
            return None;
        }

        let mtime = fs::metadata(filename).and_then(|m| m.modified()).ok();
        if let Some(entry) = state.files.get(filename) {
            if entry.mtime.is_some() && entry.mtime == mtime {
                let entry = entry.clone();
                state.stats.hits += 1;
                return Some(entry);
            }
        }

        let Ok(source) = fs::read_to_string(filename) else {
            trace!(filename, "source unavailable");
            state.files.pop(filename);
            state.stats.misses += 1;
            return None;
        };
        let hash = ContentHash::of(&source);
        let entry = match state.files.pop(filename) {
            Some(stale) if stale.hash == hash => {
                trace!(filename, "modification time changed, content did not");
                state.stats.unchanged += 1;
                CacheEntry { mtime, ..stale }
            }
            Some(_) => {
                debug!(filename, "source reloaded");
                state.stats.reloads += 1;
                CacheEntry::with_hash(filename, source, mtime, hash)
            }
            None => {
                state.stats.misses += 1;
                CacheEntry::with_hash(filename, source, mtime, hash)
            }
        };
        state.files.put(filename.to_string(), entry.clone());
        Some(entry)
    }

    /// Lines of `filename`, each ending with a newline; empty if unavailable.
    pub fn get_lines(&self, filename: &str) -> Vec<String> {
        self.entry(filename).map(|e| e.lines).unwrap_or_default()
    }

    /// Like [`get_lines`](Self::get_lines) with an extra blank line, which
    /// lets end-of-file errors point past the last line.
    pub fn get_source_lines(&self, filename: &str) -> Vec<String> {
        let mut lines = self.get_lines(filename);
        lines.push("\n".to_string());
        lines
    }

    /// Numbered excerpt around `linenumber` and the text of that line.
    ///
    /// `offset` is the 1-based column used for a caret mark.
    pub fn get_formatted_excerpt(
        &self,
        filename: &str,
        linenumber: usize,
        offset: Option<usize>,
    ) -> (String, String) {
        self.get_formatted_partial_source(filename, linenumber, offset, None)
    }

    pub fn get_formatted_partial_source(
        &self,
        filename: &str,
        linenumber: usize,
        offset: Option<usize>,
        text_range: Option<(usize, usize)>,
    ) -> (String, String) {
        let lines = self.get_source_lines(filename);
        if lines.iter().all(|line| line.trim().is_empty()) || linenumber == 0 {
            return (String::new(), String::new());
        }
        let begin = linenumber.saturating_sub(self.context);
        let end = (linenumber + 1).min(lines.len());
        if begin >= end {
            return (String::new(), String::new());
        }
        highlight_source(linenumber, begin + 1, &lines[begin..end], offset, text_range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("a\nb"), vec!["a\n", "b\n"]);
        assert_eq!(split_lines("a\r\nb\n"), vec!["a\n", "b\n"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn test_virtual_file() {
        let cache = SourceCache::new();
        cache.add("<console:1>", "x = 1\ny = 2");
        assert_eq!(cache.get_lines("<console:1>"), vec!["x = 1\n", "y = 2\n"]);
        assert!(cache.get_lines("<console:2>").is_empty());
        assert_eq!(cache.get_source_lines("<console:1>").len(), 3);
    }

    #[test]
    fn test_real_file_is_cached() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "a = 1\n").unwrap();
        let path = file.path().to_string_lossy().to_string();
        let cache = SourceCache::new();
        assert_eq!(cache.get_lines(&path), vec!["a = 1\n"]);
        assert_eq!(cache.get_lines(&path), vec!["a = 1\n"]);
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn test_touched_file_keeps_its_entry() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "a = 1\nb = 2\n").unwrap();
        let path = file.path().to_string_lossy().to_string();
        let cache = SourceCache::new();
        let first = cache.entry(&path).unwrap();

        let later = first.mtime.unwrap() + Duration::from_secs(5);
        file.as_file().set_modified(later).unwrap();
        let second = cache.entry(&path).unwrap();
        assert_eq!(second.hash, first.hash);
        assert_eq!(second.lines, first.lines);
        assert_ne!(second.mtime, first.mtime);

        cache.entry(&path).unwrap();
        let stats = cache.stats();
        assert_eq!((stats.misses, stats.unchanged, stats.reloads, stats.hits), (1, 1, 0, 1));
    }

    #[test]
    fn test_missing_file() {
        let cache = SourceCache::new();
        assert!(cache.get_lines("/definitely/not/here.py").is_empty());
        let (excerpt, line) = cache.get_formatted_excerpt("/definitely/not/here.py", 1, None);
        assert!(excerpt.is_empty() && line.is_empty());
    }

    #[test]
    fn test_excerpt() {
        let cache = SourceCache::new();
        cache.add("<demo>", "a = 1\nb = 2\nc = a / 0\nd = 4\n");
        let (excerpt, bad_line) = cache.get_formatted_excerpt("<demo>", 3, None);
        assert_eq!(bad_line, "c = a / 0\n");
        assert_eq!(
            excerpt,
            "       1: a = 1\n       2: b = 2\n    -->3: c = a / 0\n       4: d = 4"
        );
    }
}
