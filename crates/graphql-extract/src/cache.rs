use crate::{select_at, ExtractConfig, Extractor, Language, Position, Result, SourceFragment};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Number of documents kept by [`SourceCache::new`]
pub const DEFAULT_CACHE_CAPACITY: usize = 5;

/// Hit/miss counters for a [`SourceCache`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    /// Number of times the extractor actually ran
    pub misses: usize,
}

/// Memoizes extraction results keyed by the complete document text.
///
/// The key is the text itself, so a hit can never be stale. Entries are
/// evicted least-recently-used first once `capacity` documents are stored.
///
/// The cache needs `&mut self` on every lookup and is not meant to be shared
/// across threads without external locking.
#[derive(Debug)]
pub struct SourceCache {
    extractor: Extractor,
    entries: LruCache<String, Arc<[SourceFragment]>>,
    stats: CacheStats,
}

impl SourceCache {
    pub fn new(language: Language, config: &ExtractConfig) -> Result<Self> {
        let capacity = NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self::with_capacity(language, config, capacity)
    }

    pub fn with_capacity(
        language: Language,
        config: &ExtractConfig,
        capacity: NonZeroUsize,
    ) -> Result<Self> {
        Ok(Self {
            extractor: Extractor::new(language, config)?,
            entries: LruCache::new(capacity),
            stats: CacheStats::default(),
        })
    }

    /// Fragments of `text`, extracting only on a cache miss
    pub fn get(&mut self, text: &str) -> Arc<[SourceFragment]> {
        self.extract(text, true)
    }

    /// Fragments of `text`; `use_cache = false` always re-extracts and
    /// leaves the cache untouched
    pub fn extract(&mut self, text: &str, use_cache: bool) -> Arc<[SourceFragment]> {
        if !use_cache {
            self.stats.misses += 1;
            return self.extractor.extract(text).into();
        }

        if let Some(fragments) = self.entries.get(text) {
            self.stats.hits += 1;
            tracing::trace!(len = text.len(), "Source cache hit");
            return Arc::clone(fragments);
        }

        self.stats.misses += 1;
        let fragments: Arc<[SourceFragment]> = self.extractor.extract(text).into();
        if let Some((evicted, _)) = self.entries.push(text.to_string(), Arc::clone(&fragments)) {
            tracing::debug!(len = evicted.len(), "Evicted document from source cache");
        }

        fragments
    }

    /// The fragment under `position` in `text`, see [`select_at`]
    pub fn select_at(&mut self, text: &str, position: Position) -> Option<SourceFragment> {
        let fragments = self.get(text);
        select_at(&fragments, text, position).cloned()
    }

    #[must_use]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains(text)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize) -> SourceCache {
        SourceCache::with_capacity(
            Language::ReScript,
            &ExtractConfig::default(),
            NonZeroUsize::new(capacity).unwrap(),
        )
        .unwrap()
    }

    fn document(n: usize) -> String {
        format!("module F{n} = %relay(`fragment F{n} on User {{ id }}`)")
    }

    #[test]
    fn test_hit_returns_same_fragments() {
        let mut cache = cache(5);
        let first = cache.get(&document(1));
        let second = cache.get(&document(1));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_bypass_always_extracts() {
        let mut cache = cache(5);
        let doc = document(1);
        let first = cache.extract(&doc, false);
        let second = cache.extract(&doc, false);

        assert_eq!(first, second);
        assert_eq!(cache.stats(), CacheStats { hits: 0, misses: 2 });
        assert!(cache.is_empty());
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = cache(2);
        cache.get(&document(1));
        cache.get(&document(2));
        // Touch 1 so that 2 becomes the least recently used entry
        cache.get(&document(1));
        cache.get(&document(3));

        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&document(1)));
        assert!(!cache.contains(&document(2)));
        assert!(cache.contains(&document(3)));

        let misses_before = cache.stats().misses;
        cache.get(&document(2));
        assert_eq!(cache.stats().misses, misses_before + 1);
    }

    #[test]
    fn test_default_capacity() {
        let mut cache = SourceCache::new(Language::ReScript, &ExtractConfig::default()).unwrap();
        for n in 0..DEFAULT_CACHE_CAPACITY + 2 {
            cache.get(&document(n));
        }
        assert_eq!(cache.len(), DEFAULT_CACHE_CAPACITY);
        assert!(!cache.contains(&document(0)));
        assert!(!cache.contains(&document(1)));
    }

    #[test]
    fn test_key_is_exact_text() {
        let mut cache = cache(5);
        let doc = document(1);
        cache.get(&doc);
        cache.get(&format!("{doc} "));
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_select_at_through_cache() {
        let mut cache = cache(5);
        let text = format!("{}\n{}", document(1), document(2));

        let selected = cache.select_at(&text, Position::new(1, 30)).unwrap();
        assert_eq!(selected.module_label(), "F2");
        assert_eq!(cache.stats().misses, 1);

        cache.select_at(&text, Position::new(0, 30));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }
}
