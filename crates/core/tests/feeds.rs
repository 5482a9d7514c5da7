//! Timelines, explore, search and the notification read side.

#![allow(clippy::unwrap_used)]

mod common;

use chirp_common::AppError;
use chirp_core::{SearchHit, SearchKind, UpdateProfileInput};
use common::Harness;
use maplit::hashset;
use std::collections::HashSet;

#[tokio::test]
async fn follower_sees_new_tweet_and_followee_is_notified() {
    let h = Harness::new().await;
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;

    h.following.follow(&alice.id, &bob.id).await.unwrap();
    let tweet = h.post(&bob, "hello").await;

    let home = h.timeline.home(&alice.id, None, None).await.unwrap();
    assert_eq!(home.items.len(), 1);
    assert_eq!(home.items[0].id, tweet.id);
    assert_eq!(home.items[0].author.username, "bob");
    assert!(home.next_cursor.is_none());

    let notes = h.notifications.list(&bob.id, 20, None, true).await.unwrap();
    assert_eq!(notes.items.len(), 1);
    assert_eq!(notes.items[0].actor.id, alice.id);
    assert!(!notes.items[0].is_read);
}

#[tokio::test]
async fn home_timeline_follows_graph_changes() {
    let h = Harness::new().await;
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let carol = h.user("carol").await;

    let own = h.post(&alice, "mine").await;
    let from_bob = h.post(&bob, "bob here").await;
    h.post(&carol, "carol here").await;

    let home = h.timeline.home(&alice.id, None, None).await.unwrap();
    let ids: Vec<&str> = home.items.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, [own.id.as_str()]);

    h.following.follow(&alice.id, &bob.id).await.unwrap();
    let home = h.timeline.home(&alice.id, None, None).await.unwrap();
    let ids: Vec<&str> = home.items.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, [from_bob.id.as_str(), own.id.as_str()]);

    h.following.unfollow(&alice.id, &bob.id).await.unwrap();
    let home = h.timeline.home(&alice.id, None, None).await.unwrap();
    assert_eq!(home.items.len(), 1);
}

#[tokio::test]
async fn profile_timeline_pages_by_cursor() {
    let h = Harness::new().await;
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;

    let mut posted = Vec::new();
    for i in 0..5 {
        posted.push(h.post(&alice, &format!("tweet {i}")).await.id);
        h.post(&bob, "noise").await;
    }
    posted.reverse();

    let mut seen = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = h
            .timeline
            .profile("ALICE", Some(2), cursor.as_deref())
            .await
            .unwrap();
        assert!(page.items.iter().all(|t| t.author.id == alice.id));
        seen.extend(page.items.into_iter().map(|t| t.id));
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    assert_eq!(seen, posted);
}

#[tokio::test]
async fn malformed_cursor_is_rejected() {
    let h = Harness::new().await;
    let alice = h.user("alice").await;

    let err = h
        .timeline
        .home(&alice.id, None, Some("not-a-cursor"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_) | AppError::BadRequest(_)));
}

#[tokio::test]
async fn retweet_records_embed_their_original_one_level_deep() {
    let h = Harness::new().await;
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let tweet = h.post(&bob, "original").await;

    h.retweets.retweet(&alice.id, &tweet.id).await.unwrap();

    let profile = h.timeline.profile("alice", None, None).await.unwrap();
    assert_eq!(profile.items.len(), 1);
    let record = &profile.items[0];
    assert!(record.is_retweet);
    assert_eq!(record.author.username, "alice");

    let original = record.original_tweet.as_deref().unwrap();
    assert_eq!(original.id, tweet.id);
    assert_eq!(original.author.username, "bob");
    assert_eq!(original.author.name, "bob Display");
    assert!(original.original_tweet.is_none());
}

#[tokio::test]
async fn explore_ranks_by_retweets_then_likes_then_recency() {
    let h = Harness::new().await;
    let author = h.user("author").await;
    let x = h.user("xavier").await;
    let y = h.user("yvonne").await;

    let t1 = h.post(&author, "one").await;
    let t2 = h.post(&author, "two").await;
    let t3 = h.post(&author, "three").await;
    let t4 = h.post(&author, "four").await;

    h.likes.like(&x.id, &t2.id).await.unwrap();
    h.likes.like(&y.id, &t2.id).await.unwrap();
    h.likes.like(&x.id, &t4.id).await.unwrap();
    let r1 = h.retweets.retweet(&x.id, &t1.id).await.unwrap();

    let expected = [&t1.id, &t2.id, &t4.id, &r1.id, &t3.id];

    let all = h.timeline.explore(None, Some(10)).await.unwrap();
    let ids: Vec<&String> = all.items.iter().map(|t| &t.id).collect();
    assert_eq!(ids, expected);
    assert_eq!(all.page, 1);
    assert!(!all.has_more);

    let first = h.timeline.explore(Some(1), Some(2)).await.unwrap();
    assert!(first.has_more);
    assert_eq!(first.items[0].id, t1.id);

    let zero = h.timeline.explore(Some(0), Some(2)).await.unwrap();
    assert_eq!(zero.page, 1);
    assert_eq!(zero.items[0].id, t1.id);

    let last = h.timeline.explore(Some(3), Some(2)).await.unwrap();
    assert_eq!(last.page, 3);
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.items[0].id, t3.id);
    assert!(!last.has_more);
}

#[tokio::test]
async fn mixed_search_is_bounded_and_tagged() {
    let h = Harness::new().await;
    for i in 0..7 {
        let dev = h.user(&format!("Dev{i}")).await;
        h.post(&dev, "Shipping RUST today").await;
    }
    let other = h.user("other").await;
    for _ in 0..12 {
        h.post(&other, "learning rust").await;
    }

    let hits = h.search.search("dev", SearchKind::All, None).await.unwrap();
    let users = hits.iter().filter(|h| matches!(h, SearchHit::User(_))).count();
    assert_eq!(users, 5);

    let hits = h.search.search("Rust", SearchKind::All, None).await.unwrap();
    let tweets = hits.iter().filter(|h| matches!(h, SearchHit::Tweet(_))).count();
    assert_eq!(tweets, 10);
    assert!(matches!(hits[0], SearchHit::Tweet(_)));

    let json = serde_json::to_value(&hits[0]).unwrap();
    assert_eq!(json["type"], "tweet");

    let only_users = h.search.search("DEV", SearchKind::Users, Some(3)).await.unwrap();
    assert_eq!(only_users.len(), 3);
    assert!(only_users.iter().all(|h| matches!(h, SearchHit::User(_))));
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
    let h = Harness::new().await;
    let alice = h.user("alice").await;
    let literal = h.post(&alice, "100% sure").await;
    h.post(&alice, "plain").await;

    let hits = h.search.search("%", SearchKind::Tweets, None).await.unwrap();
    let ids: HashSet<String> = hits
        .into_iter()
        .filter_map(|hit| match hit {
            SearchHit::Tweet(t) => Some(t.id),
            SearchHit::User(_) => None,
        })
        .collect();
    assert_eq!(ids, hashset! { literal.id });

    let err = h.search.search("   ", SearchKind::All, None).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn search_folds_non_ascii_case() {
    let h = Harness::new().await;
    let alice = h.user("alice").await;
    let cafe = h.post(&alice, "CAFÉ opening").await;
    h.post(&alice, "cafe without accent").await;

    let hits = h.search.search("café", SearchKind::Tweets, None).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert!(matches!(&hits[0], SearchHit::Tweet(t) if t.id == cafe.id));

    h.users
        .update_profile(
            &alice.id,
            UpdateProfileInput {
                name: Some("Zoë ÜNAL".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let hits = h.search.search("ünal", SearchKind::Users, None).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert!(matches!(&hits[0], SearchHit::User(u) if u.name == "Zoë ÜNAL"));
}

#[tokio::test]
async fn notifications_are_private_to_their_recipient() {
    let h = Harness::new().await;
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let carol = h.user("carol").await;

    h.following.follow(&alice.id, &bob.id).await.unwrap();
    h.following.follow(&carol.id, &bob.id).await.unwrap();

    let page = h.notifications.list(&bob.id, 20, None, false).await.unwrap();
    assert_eq!(page.items.len(), 2);
    // Newest first.
    assert_eq!(page.items[0].actor.id, carol.id);

    let id = page.items[0].id.clone();
    let err = h.notifications.mark_as_read(&alice.id, &id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    h.notifications.mark_as_read(&bob.id, &id).await.unwrap();
    assert_eq!(h.unread(&bob).await, 1);

    assert_eq!(h.notifications.mark_all_as_read(&bob.id).await.unwrap(), 1);
    assert_eq!(h.unread(&bob).await, 0);
}

#[tokio::test]
async fn follower_lists_carry_viewer_state() {
    let h = Harness::new().await;
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let carol = h.user("carol").await;

    h.following.follow(&alice.id, &bob.id).await.unwrap();
    h.following.follow(&carol.id, &bob.id).await.unwrap();
    h.following.follow(&alice.id, &carol.id).await.unwrap();

    let followers = h
        .following
        .followers("bob", Some(&alice.id), 10, 0)
        .await
        .unwrap();
    let names: Vec<&str> = followers.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["carol", "alice"]);
    assert_eq!(followers[0].is_following, Some(true));
    assert_eq!(followers[1].is_following, Some(false));

    let following = h.following.following("alice", None, 10, 0).await.unwrap();
    assert_eq!(following.len(), 2);
    assert!(following.iter().all(|u| u.is_following.is_none()));
}
