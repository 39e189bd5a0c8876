//! Keyed query cache
//!
//! Holds query results for every view of the client. Entries are only
//! replaced by fetches or patched in place by [`QueryCache::patch_all`];
//! each call runs under one write lock, so a patch applies to all matching
//! entries before any reader sees the result.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::api::{FeedPage, FeedSelector, Profile, Tweet};

/// Generic keyed store with in-place patching
pub struct QueryCache<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, V>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, V>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the entry under `key`
    pub fn get(&self, key: &K) -> Option<V> {
        self.read().get(key).cloned()
    }

    /// Replace the entry under `key`
    pub fn set(&self, key: K, value: V) {
        self.write().insert(key, value);
    }

    /// Patch the entry under `key` in place
    ///
    /// # Returns
    /// `false` if nothing is cached under `key`
    pub fn update<F>(&self, key: &K, update: F) -> bool
    where
        F: FnOnce(&mut V),
    {
        match self.write().get_mut(key) {
            Some(value) => {
                update(value);
                true
            }
            None => false,
        }
    }

    /// Apply `update` to every entry whose key satisfies `matcher`
    ///
    /// # Returns
    /// Number of entries patched
    pub fn patch_all<M, F>(&self, matcher: M, mut update: F) -> usize
    where
        M: Fn(&K) -> bool,
        F: FnMut(&mut V),
    {
        let mut entries = self.write();
        let mut patched = 0;
        for (key, value) in entries.iter_mut() {
            if matcher(key) {
                update(value);
                patched += 1;
            }
        }
        patched
    }

    /// Drop the entry under `key`
    ///
    /// # Returns
    /// `true` if an entry was removed
    pub fn invalidate(&self, key: &K) -> bool {
        self.write().remove(key).is_some()
    }

    /// Keys currently cached
    pub fn keys(&self) -> Vec<K> {
        self.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl<K, V> Default for QueryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Cache key of one infinite feed query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeedKey {
    pub selector: FeedSelector,
    pub page_size: usize,
}

impl FeedKey {
    pub fn new(selector: FeedSelector, page_size: usize) -> Self {
        Self {
            selector,
            page_size,
        }
    }
}

/// Pages fetched so far for one feed, in fetch order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfiniteData {
    pub pages: Vec<FeedPage>,
}

impl InfiniteData {
    pub fn from_first_page(page: FeedPage) -> Self {
        Self { pages: vec![page] }
    }

    /// Cursor of the page after the last fetched one
    pub fn next_cursor(&self) -> Option<&str> {
        self.pages.last().and_then(|page| page.next_cursor.as_deref())
    }

    pub fn has_more(&self) -> bool {
        self.pages.last().is_some_and(FeedPage::has_more)
    }

    /// Tweets of every page, concatenated in fetch order
    pub fn tweets(&self) -> impl Iterator<Item = &Tweet> {
        self.pages.iter().flat_map(|page| page.tweets.iter())
    }

    /// Mutable access to every cached tweet with this ID
    pub fn tweets_with_id_mut<'a>(
        &'a mut self,
        tweet_id: &'a str,
    ) -> impl Iterator<Item = &'a mut Tweet> + 'a {
        self.pages
            .iter_mut()
            .flat_map(|page| page.tweets.iter_mut())
            .filter(move |tweet| tweet.id == tweet_id)
    }
}

/// Every query result the client holds
///
/// Passed to feeds, views and the mutation dispatcher as an explicit
/// dependency (usually behind an `Arc`).
#[derive(Default)]
pub struct ClientCache {
    pub feeds: QueryCache<FeedKey, InfiniteData>,
    pub profiles: QueryCache<String, Profile>,
}

impl ClientCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_all_touches_only_matching_keys() {
        let cache: QueryCache<&'static str, u32> = QueryCache::new();
        cache.set("a1", 1);
        cache.set("a2", 2);
        cache.set("b1", 10);

        let patched = cache.patch_all(|key| key.starts_with('a'), |value| *value += 100);

        assert_eq!(patched, 2);
        assert_eq!(cache.get(&"a1"), Some(101));
        assert_eq!(cache.get(&"a2"), Some(102));
        assert_eq!(cache.get(&"b1"), Some(10));
    }

    #[test]
    fn update_and_invalidate_report_missing_keys() {
        let cache: QueryCache<String, u32> = QueryCache::new();
        assert!(!cache.update(&"missing".to_string(), |value| *value += 1));
        assert!(!cache.invalidate(&"missing".to_string()));

        cache.set("present".to_string(), 1);
        assert!(cache.update(&"present".to_string(), |value| *value += 1));
        assert_eq!(cache.get(&"present".to_string()), Some(2));
        assert!(cache.invalidate(&"present".to_string()));
        assert!(cache.is_empty());
    }

    #[test]
    fn get_returns_a_snapshot() {
        let cache: QueryCache<u8, Vec<u8>> = QueryCache::new();
        cache.set(1, vec![1]);

        let mut snapshot = cache.get(&1).unwrap();
        snapshot.push(2);

        assert_eq!(cache.get(&1), Some(vec![1]));
    }

    #[test]
    fn infinite_data_reports_cursor_of_last_page() {
        let mut data = InfiniteData::from_first_page(FeedPage {
            tweets: vec![],
            next_cursor: Some("c1".to_string()),
        });
        assert_eq!(data.next_cursor(), Some("c1"));

        data.pages.push(FeedPage {
            tweets: vec![],
            next_cursor: None,
        });
        assert!(!data.has_more());
    }
}
