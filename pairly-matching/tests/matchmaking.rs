mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Barrier;

use pairly_matching::config::MatchingConfig;
use pairly_matching::matching::session::{BrowseStart, NextCandidate};
use pairly_matching::models::{BroadcastStatus, Gender, NewBroadcast, ProfileChanges, Seeking, UserId};
use pairly_matching::notify::Content;
use pairly_matching::services::{LikeOutcome, Reaction, ReactionSource};
use pairly_matching::store;
use pairly_shared::errors::ErrorCode;

use common::{add_user, harness, harness_with, Harness};

async fn walk(harness: &Harness, viewer: UserId) -> Vec<UserId> {
    let mut served = Vec::new();
    if let BrowseStart::Empty = harness.matchmaker.start_browsing(viewer).await.unwrap() {
        return served;
    }
    while let NextCandidate::Candidate(candidate) = harness.matchmaker.next_candidate(viewer).await.unwrap() {
        served.push(candidate.user_id);
    }
    served
}

fn photos(contents: &[Content]) -> usize {
    contents.iter().filter(|c| matches!(c, Content::Photo { .. })).count()
}

#[tokio::test]
async fn two_users_browse_like_and_match() {
    let h = harness();
    add_user(&h, 1, "Ivan", 25, Gender::Male, Seeking::Any, &[2]).await;
    add_user(&h, 2, "Olga", 27, Gender::Female, Seeking::Male, &[2, 5]).await;

    let BrowseStart::Ready(handle) = h.matchmaker.start_browsing(1).await.unwrap() else {
        panic!("expected a shortlist");
    };
    assert_eq!(handle.size, 1);

    let NextCandidate::Candidate(candidate) = h.matchmaker.next_candidate(1).await.unwrap() else {
        panic!("expected a candidate");
    };
    assert_eq!(candidate.user_id, 2);
    assert_eq!(candidate.shared_interests, 1);
    assert_eq!(candidate.age_difference, 2);

    assert_eq!(h.matchmaker.like(1, 2).await.unwrap(), LikeOutcome::NoMatch);
    assert!(matches!(h.transport.sent_to(2).as_slice(), [Content::Text(_)]));

    let LikeOutcome::Match(event) = h.matchmaker.like(2, 1).await.unwrap() else {
        panic!("expected a match");
    };
    assert_eq!((event.user_a, event.user_b), (2, 1));
    assert!(event.undelivered.is_empty());
    assert_eq!(event.contact_of_a, "tg://user?id=2");
    assert_eq!(photos(&h.transport.sent_to(1)), 1);
    assert_eq!(photos(&h.transport.sent_to(2)), 1);

    // Already mutual: no second announcement.
    assert_eq!(h.matchmaker.like(1, 2).await.unwrap(), LikeOutcome::NoMatch);
    assert_eq!(photos(&h.transport.sent_to(1)), 1);
    assert_eq!(photos(&h.transport.sent_to(2)), 1);
}

#[tokio::test]
async fn ranking_orders_by_shared_interests_then_age_gap_then_id() {
    let h = harness();
    add_user(&h, 1, "Viewer", 25, Gender::Male, Seeking::Female, &[1, 2, 3]).await;
    add_user(&h, 2, "Anna", 30, Gender::Female, Seeking::Any, &[1, 2]).await;
    add_user(&h, 3, "Bea", 26, Gender::Female, Seeking::Any, &[1]).await;
    add_user(&h, 4, "Cleo", 26, Gender::Female, Seeking::Any, &[1, 2]).await;
    add_user(&h, 5, "Dora", 24, Gender::Female, Seeking::Any, &[1]).await;
    add_user(&h, 6, "Egon", 25, Gender::Male, Seeking::Female, &[1, 2, 3]).await;

    assert_eq!(walk(&h, 1).await, vec![4, 2, 3, 5]);
}

#[tokio::test]
async fn gender_filter_is_one_directional() {
    let h = harness();
    add_user(&h, 1, "Viewer", 30, Gender::Female, Seeking::Male, &[]).await;
    add_user(&h, 2, "Seeks women", 30, Gender::Male, Seeking::Female, &[]).await;
    add_user(&h, 3, "Seeks men", 30, Gender::Male, Seeking::Male, &[]).await;
    add_user(&h, 4, "Woman", 30, Gender::Female, Seeking::Any, &[]).await;

    assert_eq!(walk(&h, 1).await, vec![2, 3]);
}

#[tokio::test]
async fn served_candidates_are_never_repeated() {
    let h = harness();
    add_user(&h, 1, "Viewer", 30, Gender::Male, Seeking::Any, &[]).await;
    add_user(&h, 2, "Anna", 30, Gender::Female, Seeking::Any, &[]).await;
    add_user(&h, 3, "Bea", 31, Gender::Female, Seeking::Any, &[]).await;

    h.matchmaker.start_browsing(1).await.unwrap();
    let NextCandidate::Candidate(first) = h.matchmaker.next_candidate(1).await.unwrap() else {
        panic!("expected a candidate");
    };
    assert_eq!(first.user_id, 2);

    // Restarting re-ranks without the candidate already shown.
    assert_eq!(walk(&h, 1).await, vec![3]);
    assert_eq!(h.matchmaker.start_browsing(1).await.unwrap(), BrowseStart::Empty);
}

#[tokio::test]
async fn exhausted_session_ends_once() {
    let h = harness();
    add_user(&h, 1, "Viewer", 30, Gender::Male, Seeking::Any, &[]).await;
    add_user(&h, 2, "Anna", 30, Gender::Female, Seeking::Any, &[]).await;

    h.matchmaker.start_browsing(1).await.unwrap();
    assert!(matches!(h.matchmaker.next_candidate(1).await.unwrap(), NextCandidate::Candidate(_)));
    assert_eq!(h.matchmaker.next_candidate(1).await.unwrap(), NextCandidate::Exhausted);

    let err = h.matchmaker.next_candidate(1).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::SessionNotFound);
}

#[tokio::test]
async fn one_block_hides_both_directions() {
    let h = harness();
    add_user(&h, 1, "Ana", 30, Gender::Female, Seeking::Any, &[]).await;
    add_user(&h, 2, "Ben", 30, Gender::Male, Seeking::Any, &[]).await;
    add_user(&h, 3, "Cy", 30, Gender::Male, Seeking::Any, &[]).await;

    h.matchmaker.block(1, 2, Some("rude".into())).await.unwrap();

    assert_eq!(walk(&h, 1).await, vec![3]);
    assert_eq!(walk(&h, 2).await, vec![3]);
}

#[tokio::test]
async fn candidate_blocking_mid_session_is_passed_over() {
    let h = harness();
    add_user(&h, 1, "Ana", 30, Gender::Female, Seeking::Any, &[]).await;
    add_user(&h, 2, "Ben", 30, Gender::Male, Seeking::Any, &[]).await;
    add_user(&h, 3, "Cy", 30, Gender::Male, Seeking::Any, &[]).await;
    add_user(&h, 4, "Dan", 30, Gender::Male, Seeking::Any, &[]).await;

    h.matchmaker.start_browsing(1).await.unwrap();
    let NextCandidate::Candidate(served) = h.matchmaker.next_candidate(1).await.unwrap() else {
        panic!("expected a candidate");
    };
    assert_eq!(served.user_id, 2);

    h.matchmaker.block(2, 1, None).await.unwrap();
    h.matchmaker.block(3, 1, None).await.unwrap();

    let outcome = h.matchmaker.react(1, Reaction::Like).await.unwrap();
    assert_eq!(outcome.target, 2);
    assert!(outcome.like.is_none());
    let Some(NextCandidate::Candidate(next)) = outcome.next else {
        panic!("expected the session to move on");
    };
    assert_eq!(next.user_id, 4);
    assert!(h.transport.sent_to(2).is_empty());

    let outcome = h.matchmaker.react(1, Reaction::Like).await.unwrap();
    assert_eq!(outcome.target, 4);
    assert_eq!(outcome.like, Some(LikeOutcome::NoMatch));
    assert_eq!(outcome.next, Some(NextCandidate::Exhausted));
}

#[tokio::test]
async fn report_blocks_unless_configured_otherwise() {
    let h = harness();
    add_user(&h, 1, "Ana", 30, Gender::Female, Seeking::Any, &[]).await;
    add_user(&h, 2, "Ben", 30, Gender::Male, Seeking::Any, &[]).await;

    let outcome = h.matchmaker.report(1, 2, None).await.unwrap();
    assert!(outcome.blocked);
    assert!(walk(&h, 2).await.is_empty());
    {
        let mut conn = h.pool.get().unwrap();
        assert!(store::ledger::report_exists(&mut conn, 1, 2).unwrap());
        assert!(store::ledger::is_blocked_between(&mut conn, 2, 1).unwrap());
    }

    let config = MatchingConfig { report_implies_block: false, ..MatchingConfig::default() };
    let h = harness_with(config);
    add_user(&h, 1, "Ana", 30, Gender::Female, Seeking::Any, &[]).await;
    add_user(&h, 2, "Ben", 30, Gender::Male, Seeking::Any, &[]).await;

    let outcome = h.matchmaker.report(1, 2, Some("spam".into())).await.unwrap();
    assert!(!outcome.blocked);
    assert_eq!(walk(&h, 2).await, vec![1]);
}

#[tokio::test]
async fn pending_likers_exclude_reciprocated_likes() {
    let h = harness();
    add_user(&h, 1, "Ana", 30, Gender::Female, Seeking::Any, &[]).await;
    add_user(&h, 2, "Ben", 30, Gender::Male, Seeking::Any, &[]).await;
    add_user(&h, 3, "Cy", 30, Gender::Male, Seeking::Any, &[]).await;

    h.matchmaker.like(2, 1).await.unwrap();
    h.matchmaker.like(3, 1).await.unwrap();

    let pending: Vec<UserId> = h
        .matchmaker
        .pending_likers(1, None)
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.user_id)
        .collect();
    assert_eq!(pending, vec![3, 2]);

    h.matchmaker.like(1, 2).await.unwrap();
    let pending = h.matchmaker.pending_likers(1, None).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].user_id, 3);
}

#[tokio::test]
async fn interests_are_replaced_and_capped() {
    let h = harness();
    add_user(&h, 1, "Ana", 30, Gender::Female, Seeking::Any, &[]).await;

    let err = h.matchmaker.set_interests(1, vec![1, 2, 3, 4, 5, 6]).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::TooManyInterests);

    h.matchmaker.set_interests(1, vec![1, 2]).await.unwrap();
    let current = h.matchmaker.set_interests(1, vec![3]).await.unwrap();
    assert_eq!(current.iter().map(|i| i.id).collect::<Vec<_>>(), vec![3]);
    assert_eq!(h.matchmaker.get_profile(1).await.unwrap().interests, vec!["Movies".to_string()]);

    let err = h.matchmaker.set_interests(1, vec![99]).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnknownInterest);

    let err = h.matchmaker.set_interests(7, vec![1]).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ProfileNotFound);
}

#[tokio::test]
async fn empty_profile_edit_is_not_found() {
    let h = harness();
    add_user(&h, 1, "Ana", 30, Gender::Female, Seeking::Any, &[]).await;

    let err = h.matchmaker.update_profile(1, ProfileChanges::default()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NothingToUpdate);
    assert!(err.code().is_not_found());

    let updated = h
        .matchmaker
        .update_profile(1, ProfileChanges { age: Some(31), ..Default::default() })
        .await
        .unwrap();
    assert_eq!(updated.age, 31);

    let err = h
        .matchmaker
        .update_profile(1, ProfileChanges { age: Some(12), ..Default::default() })
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);
}

#[tokio::test]
async fn invalid_submission_is_rejected() {
    let h = harness();
    let mut submission = common::submission("Ana", 17, Gender::Female, Seeking::Any);
    let err = h.matchmaker.submit_profile(1, submission.clone()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);

    submission.age = 18;
    submission.alias = Some("@ana".into());
    let profile = h.matchmaker.submit_profile(1, submission).await.unwrap();
    assert_eq!(profile.alias.as_deref(), Some("ana"));
}

#[tokio::test]
async fn self_and_unknown_targets_are_rejected() {
    let h = harness();
    add_user(&h, 1, "Ana", 30, Gender::Female, Seeking::Any, &[]).await;

    assert_eq!(h.matchmaker.like(1, 1).await.unwrap_err().code(), ErrorCode::SelfInteraction);
    assert_eq!(h.matchmaker.block(1, 1, None).await.unwrap_err().code(), ErrorCode::SelfInteraction);
    assert_eq!(h.matchmaker.like(1, 9).await.unwrap_err().code(), ErrorCode::ProfileNotFound);
}

#[tokio::test]
async fn failed_delivery_does_not_undo_the_match() {
    let h = harness();
    add_user(&h, 1, "Ana", 30, Gender::Female, Seeking::Any, &[]).await;
    add_user(&h, 2, "Ben", 30, Gender::Male, Seeking::Any, &[]).await;
    h.transport.mark_unreachable(2);

    h.matchmaker.like(2, 1).await.unwrap();
    let LikeOutcome::Match(event) = h.matchmaker.like(1, 2).await.unwrap() else {
        panic!("expected a match");
    };
    assert_eq!(event.undelivered, vec![2]);
    assert_eq!(photos(&h.transport.sent_to(1)), 1);

    let mut conn = h.pool.get().unwrap();
    assert!(store::ledger::is_matched(&mut conn, 1, 2).unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_opposite_likes_match_exactly_once() {
    let h = harness();

    for round in 0..25 {
        let (ana, ben) = (100 + 2 * round, 101 + 2 * round);
        add_user(&h, ana, "Ana", 30, Gender::Female, Seeking::Any, &[]).await;
        add_user(&h, ben, "Ben", 30, Gender::Male, Seeking::Any, &[]).await;

        let barrier = Arc::new(Barrier::new(2));
        let first = {
            let (matchmaker, barrier) = (h.matchmaker.clone(), barrier.clone());
            tokio::spawn(async move {
                barrier.wait().await;
                matchmaker.like(ana, ben).await
            })
        };
        let second = {
            let (matchmaker, barrier) = (h.matchmaker.clone(), barrier.clone());
            tokio::spawn(async move {
                barrier.wait().await;
                matchmaker.like(ben, ana).await
            })
        };
        let outcomes = [first.await.unwrap().unwrap(), second.await.unwrap().unwrap()];

        let matches = outcomes.iter().filter(|o| matches!(o, LikeOutcome::Match(_))).count();
        assert_eq!(matches, 1, "round {round}");
        assert_eq!(photos(&h.transport.sent_to(ana)), 1, "round {round}");
        assert_eq!(photos(&h.transport.sent_to(ben)), 1, "round {round}");
    }
}

#[tokio::test]
async fn pending_liker_takes_priority_over_browsing() {
    let h = harness();
    add_user(&h, 1, "Ana", 30, Gender::Female, Seeking::Female, &[]).await;
    add_user(&h, 2, "Ben", 30, Gender::Male, Seeking::Any, &[]).await;
    add_user(&h, 3, "Cleo", 30, Gender::Female, Seeking::Any, &[]).await;

    h.matchmaker.like(2, 1).await.unwrap();
    h.matchmaker.start_browsing(1).await.unwrap();
    h.matchmaker.next_candidate(1).await.unwrap();

    let shown = h.matchmaker.next_pending_liker(1).await.unwrap().expect("a pending liker");
    assert_eq!(shown.user_id, 2);

    let outcome = h.matchmaker.react(1, Reaction::Like).await.unwrap();
    assert_eq!(outcome.source, ReactionSource::PendingLiker);
    assert_eq!(outcome.target, 2);
    assert!(matches!(outcome.like, Some(LikeOutcome::Match(_))));

    // The reply context is consumed; the next reaction resolves the browsing session.
    let outcome = h.matchmaker.react(1, Reaction::Dislike).await.unwrap();
    assert_eq!(outcome.source, ReactionSource::Browsing);
    assert_eq!(outcome.target, 3);
    assert_eq!(outcome.next, Some(NextCandidate::Exhausted));

    let err = h.matchmaker.react(1, Reaction::Like).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoActiveTarget);
}

#[tokio::test]
async fn dismissed_pending_liker_is_not_shown_again() {
    let h = harness();
    add_user(&h, 1, "Ana", 30, Gender::Female, Seeking::Any, &[]).await;
    add_user(&h, 2, "Ben", 30, Gender::Male, Seeking::Any, &[]).await;

    h.matchmaker.like(2, 1).await.unwrap();
    assert!(h.matchmaker.next_pending_liker(1).await.unwrap().is_some());

    let outcome = h.matchmaker.react(1, Reaction::Dislike).await.unwrap();
    assert_eq!(outcome.source, ReactionSource::PendingLiker);
    assert!(outcome.like.is_none());

    assert!(h.matchmaker.next_pending_liker(1).await.unwrap().is_none());
    // Still unreciprocated, so the plain listing keeps it.
    assert_eq!(h.matchmaker.pending_likers(1, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn stale_sessions_are_swept() {
    let h = harness_with(MatchingConfig { session_ttl: Duration::from_secs(60), ..MatchingConfig::default() });
    add_user(&h, 1, "Ana", 30, Gender::Female, Seeking::Any, &[]).await;
    add_user(&h, 2, "Ben", 30, Gender::Male, Seeking::Any, &[]).await;

    h.matchmaker.start_browsing(1).await.unwrap();
    let removed = h
        .matchmaker
        .expire_stale_sessions(store::now() + chrono::Duration::minutes(5))
        .unwrap();
    assert_eq!(removed, 1);

    let err = h.matchmaker.next_candidate(1).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::SessionNotFound);
}

#[tokio::test]
async fn oversized_session_ttl_keeps_sessions_alive() {
    let h = harness_with(MatchingConfig {
        session_ttl: Duration::from_secs(10_000_000_000_000),
        ..MatchingConfig::default()
    });
    add_user(&h, 1, "Ana", 30, Gender::Female, Seeking::Any, &[]).await;
    add_user(&h, 2, "Ben", 30, Gender::Male, Seeking::Any, &[]).await;
    add_user(&h, 3, "Cy", 30, Gender::Male, Seeking::Any, &[]).await;

    h.matchmaker.start_browsing(1).await.unwrap();
    assert!(matches!(h.matchmaker.next_candidate(1).await.unwrap(), NextCandidate::Candidate(_)));

    let outcome = h.matchmaker.react(1, Reaction::Dislike).await.unwrap();
    assert_eq!(outcome.target, 2);
    assert_eq!(h.matchmaker.expire_stale_sessions(store::now()).unwrap(), 0);

    let outcome = h.matchmaker.react(1, Reaction::Dislike).await.unwrap();
    assert_eq!(outcome.target, 3);
}

#[tokio::test]
async fn broadcasts_reach_interest_holders_after_approval() {
    let admin = 100;
    let h = harness_with(MatchingConfig { admin_id: Some(admin), ..MatchingConfig::default() });
    add_user(&h, 1, "Sender", 30, Gender::Female, Seeking::Any, &[4]).await;
    add_user(&h, 2, "Traveller", 30, Gender::Male, Seeking::Any, &[4]).await;
    add_user(&h, 3, "Reader", 30, Gender::Male, Seeking::Any, &[5]).await;
    add_user(&h, 4, "Cook", 30, Gender::Male, Seeking::Any, &[8]).await;

    let broadcast = h
        .matchmaker
        .request_broadcast(1, "Hiking trip this Saturday!".into(), vec![4, 5])
        .await
        .unwrap();
    assert_eq!(h.transport.sent_to(admin).len(), 1);

    let err = h.matchmaker.approve_broadcast(2, broadcast.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::Forbidden);

    let report = h.matchmaker.approve_broadcast(admin, broadcast.id).await.unwrap();
    assert_eq!((report.recipients, report.delivered, report.failed), (2, 2, 0));
    assert_eq!(h.transport.sent_to(2).len(), 1);
    assert_eq!(h.transport.sent_to(3).len(), 1);
    assert!(h.transport.sent_to(4).is_empty());
    assert!(h.transport.sent_to(1).is_empty());

    let err = h.matchmaker.decline_broadcast(admin, broadcast.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::BroadcastAlreadyDecided);
    let err = h.matchmaker.approve_broadcast(admin, 999).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::BroadcastNotFound);
}

#[tokio::test]
async fn undecodable_broadcast_tags_keep_it_pending() {
    let admin = 100;
    let h = harness_with(MatchingConfig { admin_id: Some(admin), ..MatchingConfig::default() });
    add_user(&h, 1, "Sender", 30, Gender::Female, Seeking::Any, &[4]).await;
    add_user(&h, 2, "Traveller", 30, Gender::Male, Seeking::Any, &[4]).await;

    let mut conn = h.pool.get().unwrap();
    let broadcast = store::broadcasts::insert(
        &mut conn,
        &NewBroadcast {
            sender_id: 1,
            body: "Hiking trip".into(),
            interest_ids: "[4,".into(),
            status: BroadcastStatus::Pending,
            created_at: store::now(),
        },
    )
    .unwrap();

    let err = h.matchmaker.approve_broadcast(admin, broadcast.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InternalError);
    assert!(h.transport.sent_to(2).is_empty());

    let stored = store::broadcasts::find(&mut conn, broadcast.id).unwrap().unwrap();
    assert_eq!(stored.status, BroadcastStatus::Pending);
    let declined = h.matchmaker.decline_broadcast(admin, broadcast.id).await.unwrap();
    assert_eq!(declined.status, BroadcastStatus::Declined);
}

#[tokio::test]
async fn broadcasts_need_an_admin() {
    let h = harness();
    add_user(&h, 1, "Sender", 30, Gender::Female, Seeking::Any, &[4]).await;

    let err = h.matchmaker.request_broadcast(1, "hello".into(), vec![4]).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::AdminNotConfigured);
}

#[tokio::test]
async fn touch_records_alias_used_in_contact() {
    let h = harness();
    add_user(&h, 1, "Ana", 30, Gender::Female, Seeking::Any, &[]).await;
    add_user(&h, 2, "Ben", 30, Gender::Male, Seeking::Any, &[]).await;

    let profile = h.matchmaker.touch(1, Some("@ana_k".into())).await.unwrap();
    assert_eq!(profile.alias.as_deref(), Some("ana_k"));

    h.matchmaker.like(2, 1).await.unwrap();
    let LikeOutcome::Match(event) = h.matchmaker.like(1, 2).await.unwrap() else {
        panic!("expected a match");
    };
    assert_eq!(event.contact_of_a, "@ana_k (https://t.me/ana_k)");
}
