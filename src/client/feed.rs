//! Cursor-paginated feed queries
//!
//! [`pages`] is the bare forward-only page sequence; [`FeedQuery`] is the
//! stateful query a view holds, storing its pages in the shared cache.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::Stream;
use futures::stream;

use super::cache::{ClientCache, FeedKey, InfiniteData};
use super::error::ClientError;
use super::remote::FeedApi;
use crate::api::{FeedPage, FeedSelector, Tweet};

/// Lazy, forward-only sequence of feed pages
///
/// The first fetch carries no cursor, each following fetch carries the
/// previous page's `next_cursor`, and the stream ends after the page without
/// one. A failed fetch is yielded as an error and ends the stream; calling
/// `pages` again restarts from the first page.
pub fn pages(
    api: Arc<dyn FeedApi>,
    selector: FeedSelector,
    page_size: usize,
) -> impl Stream<Item = Result<FeedPage, ClientError>> {
    enum Position {
        Start,
        At(String),
        Done,
    }

    stream::unfold(Position::Start, move |position| {
        let api = api.clone();
        let selector = selector.clone();
        async move {
            let cursor = match position {
                Position::Start => None,
                Position::At(cursor) => Some(cursor),
                Position::Done => return None,
            };

            match api.list_feed(selector, cursor, page_size).await {
                Ok(page) => {
                    let next = match &page.next_cursor {
                        Some(cursor) => Position::At(cursor.clone()),
                        None => Position::Done,
                    };
                    Some((Ok(page), next))
                }
                Err(error) => Some((Err(error), Position::Done)),
            }
        }
    })
}

/// What a call to [`FeedQuery::fetch_next`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was fetched and stored
    Fetched { tweets: usize },
    /// Another page request is in flight
    InFlight,
    /// The last cached page has no next cursor
    Exhausted,
    /// The query was restarted while the request ran; its result was dropped
    Discarded,
}

/// Snapshot of a feed for rendering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedState {
    /// Tweets of every fetched page, None before the first page arrived
    pub tweets: Option<Vec<Tweet>>,
    /// First page requested and not yet resolved
    pub is_loading: bool,
    /// A next-page request is in flight
    pub is_fetching_next: bool,
    /// The last fetch failed
    pub is_error: bool,
    /// Message of the last failure
    pub error: Option<String>,
    pub has_more: bool,
}

#[derive(Debug, Default)]
struct FetchStatus {
    in_flight: bool,
    error: Option<String>,
    generation: u64,
}

/// Clears `in_flight` when a fetch future is dropped before it settles
///
/// A restart since the fetch began owns the flag, so the guard leaves it
/// alone once the generation moved on.
struct InFlightGuard<'a> {
    query: &'a FeedQuery,
    generation: u64,
    settled: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut status = self.query.status();
        if status.generation == self.generation {
            status.in_flight = false;
        }
    }
}

/// Infinite feed query bound to one cache key
///
/// Page N+1 is never requested before page N resolved: `fetch_next` returns
/// [`FetchOutcome::InFlight`] while a request is running.
pub struct FeedQuery {
    api: Arc<dyn FeedApi>,
    cache: Arc<ClientCache>,
    key: FeedKey,
    status: Mutex<FetchStatus>,
}

impl FeedQuery {
    pub fn new(
        api: Arc<dyn FeedApi>,
        cache: Arc<ClientCache>,
        selector: FeedSelector,
        page_size: usize,
    ) -> Self {
        Self {
            api,
            cache,
            key: FeedKey::new(selector, page_size),
            status: Mutex::new(FetchStatus::default()),
        }
    }

    pub fn key(&self) -> &FeedKey {
        &self.key
    }

    fn status(&self) -> MutexGuard<'_, FetchStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the first page if nothing is cached, else the next page
    ///
    /// On failure the cached pages stay as they were and the error flag is
    /// set; calling again retries the same cursor.
    pub async fn fetch_next(&self) -> Result<FetchOutcome, ClientError> {
        let (cursor, generation) = {
            let mut status = self.status();
            if status.in_flight {
                return Ok(FetchOutcome::InFlight);
            }

            let cursor = match self.cache.feeds.get(&self.key) {
                None => None,
                Some(data) => match data.next_cursor() {
                    Some(cursor) => Some(cursor.to_string()),
                    None => return Ok(FetchOutcome::Exhausted),
                },
            };

            status.in_flight = true;
            (cursor, status.generation)
        };

        let mut guard = InFlightGuard {
            query: self,
            generation,
            settled: false,
        };

        tracing::debug!(feed = ?self.key.selector, cursor = ?cursor, "Fetching feed page");
        let result = self
            .api
            .list_feed(self.key.selector.clone(), cursor.clone(), self.key.page_size)
            .await;

        guard.settled = true;
        let mut status = self.status();
        if status.generation != generation {
            tracing::debug!(feed = ?self.key.selector, "Dropping page of restarted feed");
            return Ok(FetchOutcome::Discarded);
        }
        status.in_flight = false;

        match result {
            Ok(page) => {
                status.error = None;
                let tweets = page.tweets.len();
                self.store_page(cursor.as_deref(), page);
                Ok(FetchOutcome::Fetched { tweets })
            }
            Err(error) => {
                tracing::warn!(feed = ?self.key.selector, %error, "Feed page fetch failed");
                status.error = Some(error.to_string());
                Err(error)
            }
        }
    }

    fn store_page(&self, cursor: Option<&str>, page: FeedPage) {
        match cursor {
            None => self
                .cache
                .feeds
                .set(self.key.clone(), InfiniteData::from_first_page(page)),
            Some(cursor) => {
                self.cache.feeds.update(&self.key, |data| {
                    if data.next_cursor() == Some(cursor) {
                        data.pages.push(page);
                    }
                });
            }
        }
    }

    /// Drop the cached pages and fetch the first page again
    pub async fn restart(&self) -> Result<FetchOutcome, ClientError> {
        {
            let mut status = self.status();
            status.generation += 1;
            status.in_flight = false;
            status.error = None;
            self.cache.feeds.invalidate(&self.key);
        }
        self.fetch_next().await
    }

    /// Current state for the list view
    pub fn state(&self) -> FeedState {
        let status = self.status();
        let data = self.cache.feeds.get(&self.key);
        let has_data = data.is_some();

        FeedState {
            tweets: data
                .as_ref()
                .map(|data| data.tweets().cloned().collect()),
            is_loading: status.in_flight && !has_data,
            is_fetching_next: status.in_flight && has_data,
            is_error: status.error.is_some(),
            error: status.error.clone(),
            has_more: data.as_ref().is_some_and(InfiniteData::has_more),
        }
    }
}
