//! Rating ledger and aggregation semantics against a real database.

mod common;

use storepulse_api::db::{RatingRepository, StoreRepository, UserRepository};
use storepulse_api::services::aggregation::{AggregationEngine, AggregationError};
use storepulse_api::services::ledger::{LedgerError, RatingLedger, SubmitOutcome};
use storepulse_core::{Role, StoreId};

use common::{seed_store, seed_user, test_pool};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[tokio::test]
async fn unrated_store_has_zero_summary() {
    let pool = test_pool().await;
    let store = seed_store(&pool, "Quiet Corner Books", "quiet@example.com", "1 Elm St").await;

    let aggregation = AggregationEngine::new(&pool);
    let summary = aggregation.store_summary(store).await.expect("summary");

    assert!(approx(summary.average_rating, 0.0));
    assert_eq!(summary.total_ratings, 0);
}

#[tokio::test]
async fn summary_for_missing_store_is_not_found() {
    let pool = test_pool().await;

    let aggregation = AggregationEngine::new(&pool);
    let err = aggregation
        .store_summary(StoreId::new(999))
        .await
        .expect_err("missing store");

    assert!(matches!(err, AggregationError::StoreNotFound));
}

#[tokio::test]
async fn resubmission_updates_in_place() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Ada", "ada@example.com", Role::User, None).await;
    let store = seed_store(&pool, "Corner Cafe", "cafe@example.com", "2 Oak Ave").await;

    let ledger = RatingLedger::new(&pool);

    let (first, outcome) = ledger.submit(user, store, 4).await.expect("submit");
    assert_eq!(outcome, SubmitOutcome::Created);

    let (second, outcome) = ledger.submit(user, store, 4).await.expect("resubmit");
    assert_eq!(outcome, SubmitOutcome::Updated);

    // Same identity, no second row.
    assert_eq!(first.id, second.id);
    let ratings = RatingRepository::new(&pool);
    assert_eq!(ratings.count_all().await.expect("count"), 1);
}

#[tokio::test]
async fn rapid_resubmission_never_misreports_creation() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Ada", "ada@example.com", Role::User, None).await;
    let store = seed_store(&pool, "Corner Cafe", "cafe@example.com", "2 Oak Ave").await;

    let ledger = RatingLedger::new(&pool);
    let (_, outcome) = ledger.submit(user, store, 3).await.expect("submit");
    assert_eq!(outcome, SubmitOutcome::Created);

    // Overwrites landing as fast as the loop can drive them must all be
    // reported as updates, even when they fall in the same clock tick as
    // the original insert.
    for value in [1, 2, 3, 4, 5] {
        let (_, outcome) = ledger.submit(user, store, value).await.expect("resubmit");
        assert_eq!(outcome, SubmitOutcome::Updated);
    }

    let ratings = RatingRepository::new(&pool);
    assert_eq!(ratings.count_all().await.expect("count"), 1);
}

#[tokio::test]
async fn averages_follow_submissions_and_updates() {
    let pool = test_pool().await;
    let alice = seed_user(&pool, "Alice", "alice@example.com", Role::User, None).await;
    let bob = seed_user(&pool, "Bob", "bob@example.com", Role::User, None).await;
    let store = seed_store(&pool, "Corner Cafe", "cafe@example.com", "2 Oak Ave").await;

    let ledger = RatingLedger::new(&pool);
    let aggregation = AggregationEngine::new(&pool);

    ledger.submit(alice, store, 4).await.expect("submit");
    let summary = aggregation.store_summary(store).await.expect("summary");
    assert!(approx(summary.average_rating, 4.0));
    assert_eq!(summary.total_ratings, 1);

    ledger.submit(bob, store, 2).await.expect("submit");
    let summary = aggregation.store_summary(store).await.expect("summary");
    assert!(approx(summary.average_rating, 3.0));
    assert_eq!(summary.total_ratings, 2);

    // Bob changes his mind; the count must not grow.
    ledger.submit(bob, store, 5).await.expect("update");
    let summary = aggregation.store_summary(store).await.expect("summary");
    assert!(approx(summary.average_rating, 4.5));
    assert_eq!(summary.total_ratings, 2);
}

#[tokio::test]
async fn average_rounds_to_two_decimals() {
    let pool = test_pool().await;
    let store = seed_store(&pool, "Corner Cafe", "cafe@example.com", "2 Oak Ave").await;
    let ledger = RatingLedger::new(&pool);

    for (i, value) in [5, 4, 4].into_iter().enumerate() {
        let user = seed_user(
            &pool,
            "Rater",
            &format!("rater{i}@example.com"),
            Role::User,
            None,
        )
        .await;
        ledger.submit(user, store, value).await.expect("submit");
    }

    // 13 / 3 = 4.333... -> 4.33
    let aggregation = AggregationEngine::new(&pool);
    let summary = aggregation.store_summary(store).await.expect("summary");
    assert!(approx(summary.average_rating, 4.33));
}

#[tokio::test]
async fn submission_rejects_out_of_range_and_missing_store() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Ada", "ada@example.com", Role::User, None).await;
    let store = seed_store(&pool, "Corner Cafe", "cafe@example.com", "2 Oak Ave").await;

    let ledger = RatingLedger::new(&pool);

    let err = ledger.submit(user, store, 0).await.expect_err("too low");
    assert!(matches!(err, LedgerError::InvalidValue(_)));
    let err = ledger.submit(user, store, 6).await.expect_err("too high");
    assert!(matches!(err, LedgerError::InvalidValue(_)));

    let err = ledger
        .submit(user, StoreId::new(999), 3)
        .await
        .expect_err("missing store");
    assert!(matches!(err, LedgerError::StoreNotFound));
}

#[tokio::test]
async fn delete_rating_requires_existing_row() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Ada", "ada@example.com", Role::User, None).await;
    let store = seed_store(&pool, "Corner Cafe", "cafe@example.com", "2 Oak Ave").await;

    let ledger = RatingLedger::new(&pool);

    let err = ledger.delete(user, store).await.expect_err("nothing there");
    assert!(matches!(err, LedgerError::RatingNotFound));

    ledger.submit(user, store, 3).await.expect("submit");
    ledger.delete(user, store).await.expect("delete");
    assert!(ledger
        .get_for_user_and_store(user, store)
        .await
        .expect("read")
        .is_none());
}

#[tokio::test]
async fn distribution_buckets_sum_to_total_and_sort_descending() {
    let pool = test_pool().await;
    let store = seed_store(&pool, "Corner Cafe", "cafe@example.com", "2 Oak Ave").await;
    let ledger = RatingLedger::new(&pool);

    // Two fives, one four, one one. No 2s or 3s.
    for (i, value) in [5, 5, 4, 1].into_iter().enumerate() {
        let user = seed_user(
            &pool,
            "Rater",
            &format!("rater{i}@example.com"),
            Role::User,
            None,
        )
        .await;
        ledger.submit(user, store, value).await.expect("submit");
    }

    let aggregation = AggregationEngine::new(&pool);
    let buckets = aggregation
        .rating_distribution(store)
        .await
        .expect("distribution");

    let values: Vec<i64> = buckets.iter().map(|b| b.value).collect();
    assert_eq!(values, vec![5, 4, 1]);

    let summary = aggregation.store_summary(store).await.expect("summary");
    let bucket_total: i64 = buckets.iter().map(|b| b.count).sum();
    assert_eq!(bucket_total, summary.total_ratings);
}

#[tokio::test]
async fn top_stores_excludes_unrated_and_breaks_ties_by_id() {
    let pool = test_pool().await;
    let ledger = RatingLedger::new(&pool);

    let low = seed_store(&pool, "Low Marks", "low@example.com", "3 Pine Rd").await;
    let high_a = seed_store(&pool, "High A", "high-a@example.com", "4 Pine Rd").await;
    let high_b = seed_store(&pool, "High B", "high-b@example.com", "5 Pine Rd").await;
    let _unrated = seed_store(&pool, "Unrated", "unrated@example.com", "6 Pine Rd").await;

    for (i, (store, value)) in [(low, 2), (high_a, 5), (high_b, 5)].into_iter().enumerate() {
        let user = seed_user(
            &pool,
            "Rater",
            &format!("rater{i}@example.com"),
            Role::User,
            None,
        )
        .await;
        ledger.submit(user, store, value).await.expect("submit");
    }

    let aggregation = AggregationEngine::new(&pool);
    let top = aggregation.top_stores(10).await.expect("top stores");

    let ids: Vec<_> = top.iter().map(|t| t.store_id).collect();
    // Tied averages fall back to store ID ascending; the unrated store is absent.
    assert_eq!(ids, vec![high_a, high_b, low]);

    let top = aggregation.top_stores(2).await.expect("top stores");
    assert_eq!(top.len(), 2);
}

#[tokio::test]
async fn deleting_a_store_cascades_ratings_and_unlinks_owner() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Ada", "ada@example.com", Role::User, None).await;
    let store = seed_store(&pool, "Corner Cafe", "cafe@example.com", "2 Oak Ave").await;
    let owner = seed_user(
        &pool,
        "Owner",
        "owner@example.com",
        Role::StoreOwner,
        Some(store),
    )
    .await;

    let ledger = RatingLedger::new(&pool);
    ledger.submit(user, store, 4).await.expect("submit");

    let stores = StoreRepository::new(&pool);
    stores.delete(store).await.expect("delete store");

    let ratings = RatingRepository::new(&pool);
    assert_eq!(ratings.count_all().await.expect("count"), 0);

    let aggregation = AggregationEngine::new(&pool);
    assert!(matches!(
        aggregation.store_summary(store).await,
        Err(AggregationError::StoreNotFound)
    ));

    // The owner keeps their account, minus the store link.
    let users = UserRepository::new(&pool);
    let owner = users
        .get_by_id(owner)
        .await
        .expect("read owner")
        .expect("owner exists");
    assert_eq!(owner.store_id, None);
}

#[tokio::test]
async fn deleting_a_user_cascades_their_ratings() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Ada", "ada@example.com", Role::User, None).await;
    let store = seed_store(&pool, "Corner Cafe", "cafe@example.com", "2 Oak Ave").await;

    let ledger = RatingLedger::new(&pool);
    ledger.submit(user, store, 5).await.expect("submit");

    let users = UserRepository::new(&pool);
    users.delete(user).await.expect("delete user");

    let aggregation = AggregationEngine::new(&pool);
    let summary = aggregation.store_summary(store).await.expect("summary");
    assert_eq!(summary.total_ratings, 0);
    assert!(approx(summary.average_rating, 0.0));
}

#[tokio::test]
async fn concurrent_submissions_collapse_to_one_row() {
    let pool = test_pool().await;
    let user = seed_user(&pool, "Ada", "ada@example.com", Role::User, None).await;
    let store = seed_store(&pool, "Corner Cafe", "cafe@example.com", "2 Oak Ave").await;

    let ledger_a = RatingLedger::new(&pool);
    let ledger_b = RatingLedger::new(&pool);

    let (a, b) = tokio::join!(
        ledger_a.submit(user, store, 2),
        ledger_b.submit(user, store, 5),
    );
    a.expect("first submit");
    b.expect("second submit");

    let ratings = RatingRepository::new(&pool);
    assert_eq!(ratings.count_all().await.expect("count"), 1);

    // Whichever writer came last won; the value is one of the two submitted.
    let rating = ratings
        .get_for_user_and_store(user, store)
        .await
        .expect("read")
        .expect("row exists");
    assert!([2, 5].contains(&rating.value.as_i64()));
}

#[tokio::test]
async fn recent_ratings_and_platform_counts() {
    let pool = test_pool().await;
    let _admin = seed_user(&pool, "Root", "root@example.com", Role::Admin, None).await;
    let user = seed_user(&pool, "Ada", "ada@example.com", Role::User, None).await;
    let store = seed_store(&pool, "Corner Cafe", "cafe@example.com", "2 Oak Ave").await;

    let ledger = RatingLedger::new(&pool);
    ledger.submit(user, store, 4).await.expect("submit");

    let aggregation = AggregationEngine::new(&pool);

    let recent = aggregation.recent_ratings(10).await.expect("recent");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent.first().map(|r| r.value), Some(4));
    assert_eq!(recent.first().map(|r| r.user_name.as_str()), Some("Ada"));

    let counts = aggregation.platform_counts().await.expect("counts");
    assert_eq!(counts.total_users, 2);
    assert_eq!(counts.total_stores, 1);
    assert_eq!(counts.total_ratings, 1);
    assert_eq!(counts.users_by_role.get("admin"), Some(&1));
    assert_eq!(counts.users_by_role.get("user"), Some(&1));
}
