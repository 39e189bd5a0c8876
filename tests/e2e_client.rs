//! E2E tests for the feed client against a running server

mod common;

use std::sync::Arc;
use std::time::Duration;

use chirp::api::FeedSelector;
use chirp::client::{
    ClientCache, FeedApi, FeedQuery, FetchOutcome, HttpFeedApi, InfiniteList, ListView,
    MutationDispatcher, ProfilePage, ScrollPosition, TweetComposer, load_profile, pages,
};
use common::TestServer;
use futures::StreamExt;

fn api_for(server: &TestServer, token: Option<&str>) -> Arc<dyn FeedApi> {
    let api = HttpFeedApi::new(&server.addr, Duration::from_secs(10)).unwrap();
    match token {
        Some(token) => Arc::new(api.with_session_token(token)),
        None => Arc::new(api),
    }
}

#[tokio::test]
async fn test_page_stream_walks_whole_feed() {
    let server = TestServer::new().await;
    server.create_user("bob", "Bob").await;
    server.seed_tweets("bob", 5).await;

    let results: Vec<_> = pages(api_for(&server, None), FeedSelector::Global, 2)
        .collect()
        .await;

    assert_eq!(results.len(), 3);
    let total: usize = results
        .into_iter()
        .map(|page| page.unwrap().tweets.len())
        .sum();
    assert_eq!(total, 5);
}

#[tokio::test]
async fn test_infinite_list_scrolls_to_the_end() {
    let server = TestServer::new().await;
    server.create_user("bob", "Bob").await;
    server.seed_tweets("bob", 5).await;

    let query = FeedQuery::new(
        api_for(&server, None),
        Arc::new(ClientCache::new()),
        FeedSelector::Global,
        2,
    );
    let list = InfiniteList::from_config(&server.state.config.client);
    let bottom = ScrollPosition {
        offset: 900,
        viewport: 100,
        content: 1000,
    };

    query.fetch_next().await.unwrap();
    while list.on_scroll(&query, &bottom).await.unwrap().is_some() {}

    assert_eq!(query.fetch_next().await.unwrap(), FetchOutcome::Exhausted);
    let view = chirp::client::list::render(&query.state(), false, &Default::default());
    let ListView::Items {
        cards,
        trailing_loader,
    } = view
    else {
        panic!("expected items");
    };
    assert_eq!(cards.len(), 5);
    assert!(!trailing_loader);
    assert!(cards.iter().all(|card| card.profile_href == "/profiles/bob"));
}

#[tokio::test]
async fn test_like_converges_across_cached_feeds() {
    let server = TestServer::new().await;
    server.create_user("bob", "Bob").await;
    let ids = server.seed_tweets("bob", 3).await;
    let newest = ids.last().unwrap().clone();
    let token = server.create_test_token("alice", "Alice");

    let api = api_for(&server, Some(&token));
    let cache = Arc::new(ClientCache::new());
    let global = FeedQuery::new(api.clone(), cache.clone(), FeedSelector::Global, 2);
    let profile_feed = FeedQuery::new(
        api.clone(),
        cache.clone(),
        FeedSelector::Profile("bob".to_string()),
        10,
    );
    global.fetch_next().await.unwrap();
    profile_feed.fetch_next().await.unwrap();

    let dispatcher = MutationDispatcher::new(api.clone(), cache.clone());
    assert!(dispatcher.toggle_like(&newest, "bob").await.unwrap());

    for query in [&global, &profile_feed] {
        let tweets = query.state().tweets.unwrap();
        let liked = tweets.iter().find(|t| t.id == newest).unwrap();
        assert_eq!(liked.like_count, 1);
        assert!(liked.liked_by_me);
    }

    // The patched cache agrees with a fresh fetch
    global.restart().await.unwrap();
    let refetched = global.state().tweets.unwrap();
    let liked = refetched.iter().find(|t| t.id == newest).unwrap();
    assert_eq!(liked.like_count, 1);
    assert!(liked.liked_by_me);
}

#[tokio::test]
async fn test_follow_and_profile_page() {
    let server = TestServer::new().await;
    server.create_user("bob", "Bob").await;
    server.seed_tweets("bob", 1).await;
    let token = server.create_test_token("alice", "Alice");
    let api = api_for(&server, Some(&token));
    let cache = Arc::new(ClientCache::new());

    let viewer = api.session().await.unwrap();
    assert_eq!(viewer.as_ref().map(|s| s.user_id.as_str()), Some("alice"));

    let profile = load_profile(api.as_ref(), &cache, "bob").await.unwrap();
    let page = ProfilePage::from_query(profile.as_ref(), viewer.as_ref(), false);
    let ProfilePage::Found(header) = page else {
        panic!("expected bob's profile");
    };
    assert_eq!(header.summary, "1 Tweet - 0 Followers - 0 Following");
    assert_eq!(header.follow_button.map(|b| b.label), Some("Follow"));

    let dispatcher = MutationDispatcher::new(api.clone(), cache.clone());
    assert!(dispatcher.toggle_follow("bob").await.unwrap());

    let cached = cache.profiles.get(&"bob".to_string()).unwrap();
    assert_eq!(cached.followers_count, 1);
    assert!(cached.is_following);

    let page = ProfilePage::from_query(Some(&cached), viewer.as_ref(), false);
    let ProfilePage::Found(header) = page else {
        panic!("expected bob's profile");
    };
    assert_eq!(header.summary, "1 Tweet - 1 Follower - 0 Following");
    assert_eq!(header.follow_button.map(|b| b.label), Some("Unfollow"));

    let missing = load_profile(api.as_ref(), &cache, "nobody").await.unwrap();
    assert_eq!(
        ProfilePage::from_query(missing.as_ref(), viewer.as_ref(), false),
        ProfilePage::NotFound
    );
}

#[tokio::test]
async fn test_composer_does_not_touch_cached_feed() {
    let server = TestServer::new().await;
    let token = server.create_test_token("alice", "Alice");
    let api = api_for(&server, Some(&token));
    let cache = Arc::new(ClientCache::new());
    let query = FeedQuery::new(api.clone(), cache.clone(), FeedSelector::Global, 10);
    query.fetch_next().await.unwrap();
    assert_eq!(query.state().tweets, Some(vec![]));

    let viewer = api.session().await.unwrap();
    let mut composer = TweetComposer::for_viewer(viewer.as_ref()).unwrap();
    composer.set_input("hello world");
    let dispatcher = MutationDispatcher::new(api.clone(), cache.clone());
    composer.submit(&dispatcher).await.unwrap();

    assert_eq!(composer.input(), "");
    assert_eq!(query.state().tweets, Some(vec![]));

    query.restart().await.unwrap();
    let tweets = query.state().tweets.unwrap();
    assert_eq!(tweets.len(), 1);
    assert_eq!(tweets[0].content, "hello world");
}

#[tokio::test]
async fn test_anonymous_mutation_fails_without_patching() {
    let server = TestServer::new().await;
    server.create_user("bob", "Bob").await;
    let ids = server.seed_tweets("bob", 1).await;
    let api = api_for(&server, None);
    let cache = Arc::new(ClientCache::new());
    let query = FeedQuery::new(api.clone(), cache.clone(), FeedSelector::Global, 10);
    query.fetch_next().await.unwrap();
    let before = query.state();

    let dispatcher = MutationDispatcher::new(api, cache);
    assert!(dispatcher.toggle_like(&ids[0], "bob").await.is_err());

    assert_eq!(query.state(), before);
    assert!(TweetComposer::for_viewer(None).is_none());
}

#[tokio::test]
async fn test_profile_id_with_slash_reaches_its_routes() {
    let server = TestServer::new().await;
    server.create_user("org/bob", "Bob").await;
    server.seed_tweets("org/bob", 2).await;
    let token = server.create_test_token("alice", "Alice");
    let api = api_for(&server, Some(&token));
    let cache = Arc::new(ClientCache::new());

    let profile = load_profile(api.as_ref(), &cache, "org/bob").await.unwrap();
    assert_eq!(profile.map(|p| p.tweets_count), Some(2));

    let query = FeedQuery::new(
        api.clone(),
        cache.clone(),
        FeedSelector::Profile("org/bob".to_string()),
        10,
    );
    query.fetch_next().await.unwrap();
    let tweets = query.state().tweets.unwrap();
    assert_eq!(tweets.len(), 2);
    assert!(tweets.iter().all(|t| t.user.id == "org/bob"));

    let dispatcher = MutationDispatcher::new(api, cache.clone());
    assert!(dispatcher.toggle_follow("org/bob").await.unwrap());
    let cached = cache.profiles.get(&"org/bob".to_string()).unwrap();
    assert_eq!(cached.followers_count, 1);
}
