//! Fallback ledger tests.

#![allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]

use marquee_core::user::NewUser;
use marquee_core::{MoviePatch, NewMovie, Role, SortField, SortOrder};

use super::FallbackLedger;

fn offline(title: &str, rating: f64, release_date: &str, duration: i64) -> NewMovie {
    NewMovie {
        title: title.to_string(),
        description: format!("{title} description"),
        rating,
        release_date: release_date.to_string(),
        duration,
        genre: Vec::new(),
        director: None,
        cast: Vec::new(),
        poster: None,
        imdb_id: None,
    }
}

#[test]
fn seeded_ledger_serves_known_ids() {
    let ledger = FallbackLedger::seeded();
    let movie = ledger.get("1").unwrap();
    assert_eq!(movie.title, "The Shawshank Redemption");

    let (page, total) = ledger.page(0, 10);
    assert_eq!(total, 5);
    assert_eq!(page.len(), 5);
    assert_eq!(page[0].id, "1");
}

#[test]
fn page_slices_in_insertion_order() {
    let ledger = FallbackLedger::seeded();
    let (page, total) = ledger.page(2, 2);
    assert_eq!(total, 5);
    let ids: Vec<&str> = page.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "4"]);

    let (beyond, _) = ledger.page(10, 2);
    assert!(beyond.is_empty());
}

#[test]
fn sorted_page_by_rating_desc() {
    let ledger = FallbackLedger::seeded();
    let (movies, _) = ledger.sorted_page(SortField::Rating, SortOrder::Desc, 0, 10);
    for pair in movies.windows(2) {
        assert!(pair[0].rating >= pair[1].rating);
    }
}

#[test]
fn sorted_page_ties_keep_insertion_order() {
    let ledger = FallbackLedger::empty();
    ledger.append(offline("First", 7.0, "2000-01-01", 90));
    ledger.append(offline("Second", 7.0, "2000-01-01", 90));
    ledger.append(offline("Third", 9.0, "2000-01-01", 90));

    let (movies, _) = ledger.sorted_page(SortField::Rating, SortOrder::Desc, 0, 10);
    let titles: Vec<&str> = movies.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Third", "First", "Second"]);
}

#[test]
fn sorted_page_title_is_case_insensitive() {
    let ledger = FallbackLedger::empty();
    ledger.append(offline("banana", 5.0, "2000-01-01", 90));
    ledger.append(offline("Apple", 5.0, "2000-01-01", 90));

    let (movies, _) = ledger.sorted_page(SortField::Name, SortOrder::Asc, 0, 10);
    assert_eq!(movies[0].title, "Apple");
}

#[test]
fn search_matches_title_or_description() {
    let ledger = FallbackLedger::seeded();

    let (hits, total) = ledger.search("dark knight", 0, 10);
    assert_eq!(total, 1);
    assert_eq!(hits[0].id, "3");

    // Substring of a description only.
    let (hits, _) = ledger.search("dream-sharing", 0, 10);
    assert_eq!(hits[0].title, "Inception");

    let (hits, total) = ledger.search("zzzzz", 0, 10);
    assert!(hits.is_empty());
    assert_eq!(total, 0);
}

#[test]
fn append_assigns_synthetic_id_and_placeholder_poster() {
    let ledger = FallbackLedger::seeded();
    let movie = ledger.append(offline("Offline Movie", 6.5, "2024-01-01", 100));

    assert!(movie.id.parse::<i64>().is_ok());
    assert!(movie.poster.as_deref().is_some_and(|p| p.contains("placeholder")));

    let (_, total) = ledger.page(0, 10);
    assert_eq!(total, 6);
    assert_eq!(ledger.get(&movie.id).unwrap().title, "Offline Movie");
}

#[test]
fn append_does_not_deduplicate() {
    let ledger = FallbackLedger::empty();
    ledger.append(offline("Same Title", 5.0, "2000-01-01", 90));
    ledger.append(offline("Same Title", 5.0, "2000-01-01", 90));
    let (_, total) = ledger.page(0, 10);
    assert_eq!(total, 2);
}

#[test]
fn merge_and_remove() {
    let ledger = FallbackLedger::seeded();
    let patch = MoviePatch {
        rating: Some(9.9),
        ..MoviePatch::default()
    };

    let merged = ledger.merge("1", &patch).unwrap();
    assert_eq!(merged.rating, 9.9);
    assert_eq!(merged.title, "The Shawshank Redemption");
    assert!(ledger.merge("missing", &patch).is_none());

    let removed = ledger.remove("1").unwrap();
    assert_eq!(removed.id, "1");
    assert!(ledger.get("1").is_none());
    assert!(ledger.remove("1").is_none());
}

#[test]
fn offline_users_resolve() {
    let ledger = FallbackLedger::seeded();

    let admin = ledger.find_user_by_id("admin_offline").unwrap();
    assert_eq!(admin.role, Role::Admin);

    // Email lookup is case-insensitive.
    assert!(ledger.find_user_by_email("ADMIN@example.com").is_some());
    assert!(ledger.find_user_by_email("nobody@example.com").is_none());
}

#[test]
fn register_user_offline() {
    let ledger = FallbackLedger::seeded();
    assert!(!ledger.has_user("carol", "carol@example.com"));

    let user = ledger.register_user(NewUser {
        username: "carol".to_string(),
        email: "carol@example.com".to_string(),
        password: "secret1".to_string(),
    });

    assert_eq!(user.role, Role::User);
    assert!(ledger.has_user("carol", "other@example.com"));
    assert!(ledger.has_user("other", "carol@example.com"));
    assert_eq!(ledger.find_user_by_id(&user.id).unwrap().password, "secret1");
}
