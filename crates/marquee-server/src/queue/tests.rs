//! Insert queue tests.

#![allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use marquee_core::NewMovie;

use super::InsertQueue;
use crate::storage::CatalogDatabase;

fn sample(title: &str) -> NewMovie {
    NewMovie {
        title: title.to_string(),
        description: format!("{title} description"),
        rating: 7.0,
        release_date: "2000-01-01".to_string(),
        duration: 100,
        genre: Vec::new(),
        director: None,
        cast: Vec::new(),
        poster: None,
        imdb_id: None,
    }
}

/// Poll until the store holds `expected` movies or the deadline passes.
async fn wait_for_total(db: &CatalogDatabase, expected: i64) -> bool {
    for _ in 0..100 {
        let (_, total) = db.list_movies(0, 100).await.unwrap();
        if total == expected {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn enqueued_movie_lands_in_store() {
    let db = CatalogDatabase::open_in_memory().await.unwrap();
    let queue = InsertQueue::start(db.clone());

    let job_id = queue.enqueue(sample("Heat")).unwrap();
    assert!(job_id > 0);

    assert!(wait_for_total(&db, 1).await);
    let (movies, _) = db.list_movies(0, 10).await.unwrap();
    assert_eq!(movies[0].title, "Heat");
    assert!(queue.failed_jobs().is_empty());
}

#[tokio::test]
async fn duplicate_titles_become_updates() {
    let db = CatalogDatabase::open_in_memory().await.unwrap();
    let queue = InsertQueue::start(db.clone());

    queue.enqueue(sample("Heat")).unwrap();
    let mut second = sample("Heat");
    second.rating = 9.0;
    queue.enqueue(second).unwrap();

    assert!(wait_for_total(&db, 1).await);
    // The worker is sequential, so once the second job is visible the
    // rating reflects the update.
    for _ in 0..100 {
        let (movies, total) = db.list_movies(0, 10).await.unwrap();
        assert_eq!(total, 1);
        if movies[0].rating == 9.0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("second job never applied");
}

#[tokio::test]
async fn job_ids_are_distinct() {
    let db = CatalogDatabase::open_in_memory().await.unwrap();
    let queue = InsertQueue::start(db.clone());

    let a = queue.enqueue(sample("A")).unwrap();
    let b = queue.enqueue(sample("B")).unwrap();
    assert_ne!(a, b);
}

#[tokio::test]
async fn exhausted_retries_are_retained_for_inspection() {
    let db = CatalogDatabase::open_in_memory().await.unwrap();
    let queue = InsertQueue::start_with_backoff(db.clone(), Duration::ZERO);

    // Close the pool so every attempt fails.
    db.pool().close().await;
    queue.enqueue(sample("Doomed")).unwrap();

    for _ in 0..100 {
        let failed = queue.failed_jobs();
        if !failed.is_empty() {
            assert_eq!(failed[0].title, "Doomed");
            assert_eq!(failed[0].attempts, 3);
            assert!(!failed[0].error.is_empty());
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("job never reported as failed");
}
