//! Mutation dispatcher
//!
//! Runs like, follow and create calls and patches cached query data once a
//! call succeeded. Nothing is written to the cache before the server
//! answered, so a failed call leaves every view unchanged.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::cache::{ClientCache, FeedKey, InfiniteData};
use super::error::ClientError;
use super::remote::FeedApi;
use crate::api::{FeedSelector, Profile, Tweet};

/// State of one mutation call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MutationStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error(String),
}

impl MutationStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Apply a like toggle result to cached feed pages
///
/// # Returns
/// Number of tweet entries patched
pub fn apply_like(data: &mut InfiniteData, tweet_id: &str, added: bool) -> usize {
    let mut patched = 0;
    for tweet in data.tweets_with_id_mut(tweet_id) {
        tweet.like_count = if added {
            tweet.like_count.saturating_add(1)
        } else {
            tweet.like_count.saturating_sub(1)
        };
        tweet.liked_by_me = added;
        patched += 1;
    }
    patched
}

/// Apply a follow toggle result to a cached profile
pub fn apply_follow(profile: &mut Profile, added: bool) {
    profile.followers_count = if added {
        profile.followers_count.saturating_add(1)
    } else {
        profile.followers_count.saturating_sub(1)
    };
    profile.is_following = added;
}

/// Feeds that may hold a tweet by `author_id`
fn holds_author(key: &FeedKey, author_id: &str) -> bool {
    match &key.selector {
        FeedSelector::Global | FeedSelector::Following => true,
        FeedSelector::Profile(profile_id) => profile_id == author_id,
    }
}

/// Issues mutations and keeps the shared cache consistent with their results
pub struct MutationDispatcher {
    api: Arc<dyn FeedApi>,
    cache: Arc<ClientCache>,
    likes: Mutex<HashMap<String, MutationStatus>>,
    follows: Mutex<HashMap<String, MutationStatus>>,
    create: Mutex<MutationStatus>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Where a mutation records its status
enum Slot<'a> {
    /// Per-item statuses; only `Pending` and `Error` entries are kept
    Keyed(&'a Mutex<HashMap<String, MutationStatus>>, String),
    Single(&'a Mutex<MutationStatus>),
}

impl Slot<'_> {
    fn update<R>(&self, f: impl FnOnce(&mut MutationStatus) -> R) -> R {
        match self {
            Slot::Keyed(statuses, id) => {
                let mut statuses = lock(statuses);
                let status = statuses.entry(id.clone()).or_default();
                let out = f(&mut *status);
                if matches!(status, MutationStatus::Idle | MutationStatus::Success) {
                    statuses.remove(id);
                }
                out
            }
            Slot::Single(status) => f(&mut *lock(status)),
        }
    }
}

/// Marks a mutation pending for as long as its call runs
///
/// Dropping the guard before [`PendingGuard::finish`] (the caller's future
/// was dropped mid-call) resets the status to `Idle`.
struct PendingGuard<'a> {
    slot: Slot<'a>,
    settled: bool,
}

impl<'a> PendingGuard<'a> {
    fn begin(slot: Slot<'a>) -> Result<Self, ClientError> {
        slot.update(|status| {
            if status.is_pending() {
                return Err(ClientError::AlreadyPending);
            }
            *status = MutationStatus::Pending;
            Ok(())
        })?;
        Ok(Self {
            slot,
            settled: false,
        })
    }

    fn finish<T>(mut self, result: &Result<T, ClientError>) {
        let next = match result {
            Ok(_) => MutationStatus::Success,
            Err(error) => MutationStatus::Error(error.to_string()),
        };
        self.slot.update(|status| *status = next);
        self.settled = true;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.slot.update(|status| {
                if status.is_pending() {
                    *status = MutationStatus::Idle;
                }
            });
        }
    }
}

/// Mark `id` pending unless it already is
fn begin<'a>(
    statuses: &'a Mutex<HashMap<String, MutationStatus>>,
    id: &str,
) -> Result<PendingGuard<'a>, ClientError> {
    PendingGuard::begin(Slot::Keyed(statuses, id.to_string()))
}

impl MutationDispatcher {
    pub fn new(api: Arc<dyn FeedApi>, cache: Arc<ClientCache>) -> Self {
        Self {
            api,
            cache,
            likes: Mutex::new(HashMap::new()),
            follows: Mutex::new(HashMap::new()),
            create: Mutex::new(MutationStatus::Idle),
        }
    }

    /// Toggle the viewer's like on a tweet
    ///
    /// On success patches the tweet in every cached global, following and
    /// author profile feed, whatever their page size.
    ///
    /// # Returns
    /// `true` if a like was added, `false` if it was removed
    ///
    /// # Errors
    /// [`ClientError::AlreadyPending`] if a toggle for this tweet is running,
    /// else the remote call's error. The cache is untouched on error.
    pub async fn toggle_like(&self, tweet_id: &str, author_id: &str) -> Result<bool, ClientError> {
        let pending = begin(&self.likes, tweet_id)?;

        let result = self
            .api
            .toggle_like(tweet_id.to_string())
            .await
            .map(|response| response.added_like);

        match &result {
            Ok(added) => {
                let added = *added;
                let mut patched = 0;
                let feeds = self.cache.feeds.patch_all(
                    |key| holds_author(key, author_id),
                    |data| patched += apply_like(data, tweet_id, added),
                );
                tracing::debug!(tweet_id, added, feeds, patched, "Applied like toggle");
            }
            Err(error) => tracing::warn!(tweet_id, %error, "Like toggle failed"),
        }

        pending.finish(&result);
        result
    }

    /// Toggle the viewer's follow on a profile
    ///
    /// On success patches the cached profile, if any.
    ///
    /// # Returns
    /// `true` if the viewer now follows the profile
    pub async fn toggle_follow(&self, profile_id: &str) -> Result<bool, ClientError> {
        let pending = begin(&self.follows, profile_id)?;

        let result = self
            .api
            .toggle_follow(profile_id.to_string())
            .await
            .map(|response| response.added_follow);

        match &result {
            Ok(added) => {
                let cached = self
                    .cache
                    .profiles
                    .update(&profile_id.to_string(), |profile| apply_follow(profile, *added));
                tracing::debug!(profile_id, added, cached, "Applied follow toggle");
            }
            Err(error) => tracing::warn!(profile_id, %error, "Follow toggle failed"),
        }

        pending.finish(&result);
        result
    }

    /// Create a tweet
    ///
    /// Cached feeds are left as they are; the tweet shows up on the next
    /// fetch of the first page.
    pub async fn create_tweet(&self, content: &str) -> Result<Tweet, ClientError> {
        let pending = PendingGuard::begin(Slot::Single(&self.create))?;

        let result = self.api.create_tweet(content.to_string()).await;

        match &result {
            Ok(tweet) => tracing::info!(tweet_id = %tweet.id, "Tweet created"),
            Err(error) => tracing::warn!(%error, "Tweet creation failed"),
        }
        pending.finish(&result);
        result
    }

    /// Status of the last like toggle on a tweet
    ///
    /// A settled successful toggle reads as `Idle`.
    pub fn like_status(&self, tweet_id: &str) -> MutationStatus {
        lock(&self.likes).get(tweet_id).cloned().unwrap_or_default()
    }

    /// Tweets whose like toggle is in flight
    pub fn pending_likes(&self) -> HashSet<String> {
        lock(&self.likes)
            .iter()
            .filter(|(_, status)| status.is_pending())
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn follow_status(&self, profile_id: &str) -> MutationStatus {
        lock(&self.follows)
            .get(profile_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn create_status(&self) -> MutationStatus {
        lock(&self.create).clone()
    }
}
