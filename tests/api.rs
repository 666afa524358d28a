//! End-to-end tests for the content API
//!
//! Requests go through `server::dispatch` against a `MemoryStore`, so the
//! routing, the handlers and the seed reconciler are all exercised without
//! a MongoDB instance or a socket.

use bson::doc;
use bytes::Bytes;
use clap::Parser;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Response, StatusCode};
use serde_json::Value;
use shloka::db::schemas::{Chapter, Emotion, Mood, EMOTION_COLLECTION, MOOD_COLLECTION};
use shloka::db::{DocumentStore, Filter, MemoryStore};
use shloka::seed::{self, Catalog};
use shloka::{server, AppState, Args, SeedPolicy};
use std::sync::Arc;

/// Helper to build state over a store that has been reconciled once
async fn seeded_state() -> AppState<MemoryStore> {
    let store = MemoryStore::new();
    seed::reconcile(&store, SeedPolicy::Selective).await.unwrap();
    state_over(store)
}

fn state_over(store: MemoryStore) -> AppState<MemoryStore> {
    let args = Args::parse_from(["shloka", "--memory-store"]);
    AppState::new(args, Arc::new(store))
}

async fn body_json(response: Response<Full<Bytes>>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(state: &AppState<MemoryStore>, path: &str) -> (StatusCode, Value) {
    let response = server::dispatch(state, &Method::GET, path).await;
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn test_list_emotions() {
    let state = seeded_state().await;
    let (status, body) = get(&state, "/api/emotions").await;

    assert_eq!(status, StatusCode::OK);
    let emotions = body.as_array().unwrap();
    assert_eq!(emotions.len(), 11);

    let fear = emotions.iter().find(|e| e["_id"] == "fear").unwrap();
    assert_eq!(fear["name_english"], "Fear");

    let mut ids: Vec<&str> = emotions.iter().map(|e| e["_id"].as_str().unwrap()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 11);
    for slug in [
        "fear", "anger", "grief", "confusion", "detachment", "joy", "doubt", "pride", "desire",
        "envy", "despair",
    ] {
        assert!(ids.contains(&slug), "missing emotion '{}'", slug);
    }
}

#[tokio::test]
async fn test_moods_for_emotion() {
    let state = seeded_state().await;
    let (status, body) = get(&state, "/api/moods/fear").await;

    assert_eq!(status, StatusCode::OK);
    let moods = body.as_array().unwrap();
    assert_eq!(moods.len(), 3);
    assert!(moods.iter().all(|m| m["emotion_id"] == "fear"));
}

#[tokio::test]
async fn test_moods_for_unknown_emotion_is_404() {
    let state = seeded_state().await;
    let (status, body) = get(&state, "/api/moods/nonexistent_emotion").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "No moods found for this emotion");
}

#[tokio::test]
async fn test_guidance_for_mood() {
    let state = seeded_state().await;
    let (status, body) = get(&state, "/api/guidance/fear_future").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mood_id"], "fear_future");
    assert!(body["verse_reference"].as_str().unwrap().contains("Bhagavad Gita"));
}

#[tokio::test]
async fn test_guidance_for_anger_world() {
    let state = seeded_state().await;
    let (status, body) = get(&state, "/api/guidance/anger_world").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mood_id"], "anger_world");
}

#[tokio::test]
async fn test_guidance_for_unknown_mood_is_404() {
    let state = seeded_state().await;
    let (status, body) = get(&state, "/api/guidance/fear_spiders").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Guidance not found for this mood");
}

#[tokio::test]
async fn test_every_listed_mood_has_guidance() {
    let state = seeded_state().await;
    let (_, emotions) = get(&state, "/api/emotions").await;

    for emotion in emotions.as_array().unwrap() {
        let id = emotion["_id"].as_str().unwrap();
        let (status, moods) = get(&state, &format!("/api/moods/{}", id)).await;
        assert_eq!(status, StatusCode::OK, "emotion '{}'", id);

        for mood in moods.as_array().unwrap() {
            let mood_id = mood["_id"].as_str().unwrap();
            let (status, guidance) = get(&state, &format!("/api/guidance/{}", mood_id)).await;
            assert_eq!(status, StatusCode::OK, "mood '{}'", mood_id);
            assert_eq!(guidance["mood_id"], mood_id);
        }
    }
}

#[tokio::test]
async fn test_chapter_by_number() {
    let state = seeded_state().await;
    let (status, body) = get(&state, "/api/chapters/1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chapter_number"], 1);
    assert_eq!(body["_id"], 1);
    assert!(!body["verses"].as_array().unwrap().is_empty());
    assert_eq!(body["verses"][0]["verse_number"], "1.30");
}

#[tokio::test]
async fn test_missing_or_malformed_chapter_is_404() {
    let state = seeded_state().await;

    let (status, body) = get(&state, "/api/chapters/19").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Chapter not found");

    let (status, _) = get(&state, "/api/chapters/one").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_chapters_sorted_by_number() {
    // Chapters stored out of order are left as found and still listed in order
    let store = MemoryStore::new();
    let mut chapters = Catalog::canonical().unwrap().chapters;
    chapters.reverse();
    store.insert_many(&chapters).await.unwrap();
    seed::reconcile(&store, SeedPolicy::Selective).await.unwrap();
    let state = state_over(store);

    let (status, body) = get(&state, "/api/chapters").await;
    assert_eq!(status, StatusCode::OK);
    let numbers: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["chapter_number"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, (1..=18).collect::<Vec<i64>>());
}

#[tokio::test]
async fn test_reconcile_is_a_fixed_point() {
    let store = MemoryStore::new();
    seed::reconcile(&store, SeedPolicy::Selective).await.unwrap();
    let once: Vec<_> = futures::future::join_all(
        ["emotions", "moods", "guidances", "chapters"].map(|c| store.snapshot(c)),
    )
    .await;

    seed::reconcile(&store, SeedPolicy::Selective).await.unwrap();
    let twice: Vec<_> = futures::future::join_all(
        ["emotions", "moods", "guidances", "chapters"].map(|c| store.snapshot(c)),
    )
    .await;

    assert_eq!(once, twice);
    assert_eq!(once.iter().map(Vec::len).collect::<Vec<_>>(), vec![11, 33, 33, 18]);
}

#[tokio::test]
async fn test_reconcile_repairs_partial_and_stale_store() {
    let store = MemoryStore::new();
    let catalog = Catalog::canonical().unwrap();

    // Chapters seeded, hierarchy from an older dataset with an orphan mood
    store.insert_many(&catalog.chapters).await.unwrap();
    store.insert_many(&catalog.emotions[..5]).await.unwrap();
    store
        .insert_many(&[Mood {
            id: "serenity_calm".into(),
            emotion_id: "serenity".into(),
            name: "Calm".into(),
            description: "Retired mood".into(),
        }])
        .await
        .unwrap();
    assert!(seed::verify(&store).await.is_err());

    let report = seed::reconcile(&store, SeedPolicy::Selective).await.unwrap();
    assert_eq!(report.emotions_cleared, 5);
    assert_eq!(report.moods_cleared, 1);
    assert_eq!(report.chapters_inserted, 0);
    seed::verify(&store).await.unwrap();

    let orphan: Option<Mood> = store.find_one(Filter::eq("_id", "serenity_calm")).await.unwrap();
    assert!(orphan.is_none());
}

#[tokio::test]
async fn test_reconcile_leaves_existing_chapters_untouched() {
    let store = MemoryStore::new();
    let mut chapters = Catalog::canonical().unwrap().chapters;
    chapters[0].name_english = "Locally Edited".into();
    chapters.truncate(5);
    store.insert_many(&chapters).await.unwrap();

    let report = seed::reconcile(&store, SeedPolicy::Selective).await.unwrap();
    assert_eq!(report.chapters_existing, 5);
    assert_eq!(report.chapters_inserted, 13);
    assert_eq!(store.count::<Chapter>().await.unwrap(), 18);

    let first: Option<Chapter> = store.find_one(Filter::eq("chapter_number", 1)).await.unwrap();
    assert_eq!(first.unwrap().name_english, "Locally Edited");
}

#[tokio::test]
async fn test_concurrent_reconciles_converge() {
    let store = MemoryStore::new();
    let (a, b) = tokio::join!(
        seed::reconcile(&store, SeedPolicy::Selective),
        seed::reconcile(&store, SeedPolicy::Selective)
    );
    a.unwrap();
    b.unwrap();

    seed::verify(&store).await.unwrap();
    assert_eq!(store.count::<Emotion>().await.unwrap(), 11);
    assert_eq!(store.count::<Chapter>().await.unwrap(), 18);
}

#[tokio::test]
async fn test_store_assigned_identifier_is_stringified() {
    let state = seeded_state().await;
    state
        .store
        .insert_raw(
            EMOTION_COLLECTION,
            vec![doc! {
                "name_english": "Wonder",
                "name_sanskrit": "विस्मय (Vismaya)",
                "description": "Ad hoc record",
                "icon": "✨",
            }],
        )
        .await;

    let (_, body) = get(&state, "/api/emotions").await;
    let wonder = body
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["name_english"] == "Wonder")
        .unwrap();
    let id = wonder["_id"].as_str().unwrap();
    assert_eq!(id.len(), 24);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_list_results_are_capped() {
    let store = MemoryStore::new();
    seed::reconcile(&store, SeedPolicy::Selective).await.unwrap();
    let extra: Vec<_> = (0..120)
        .map(|i| doc! { "_id": format!("extra_{}", i), "emotion_id": "fear", "name": "x", "description": "x" })
        .collect();
    store.insert_raw(MOOD_COLLECTION, extra).await;
    let state = state_over(store);

    let (status, body) = get(&state, "/api/moods/fear").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 100);
}

#[tokio::test]
async fn test_root_health_and_unknown_routes() {
    let state = seeded_state().await;

    let (status, body) = get(&state, "/api/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "SHLOKA API - Bhagavad Gita Guidance by Emotion");

    let (status, body) = get(&state, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["seed_policy"], "selective");

    let (status, _) = get(&state, "/api/bookmarks").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&state, "/apis/emotions").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&state, "/emotions").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_and_methods() {
    let state = seeded_state().await;

    let response = server::dispatch(&state, &Method::GET, "/api/emotions").await;
    assert_eq!(response.headers()["access-control-allow-origin"], "*");

    let response = server::dispatch(&state, &Method::OPTIONS, "/api/emotions").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-methods"], "*");

    let response = server::dispatch(&state, &Method::POST, "/api/emotions").await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_percent_encoded_segments_are_decoded() {
    let state = seeded_state().await;

    let (status, body) = get(&state, "/api/guidance/fear%5Ffuture").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mood_id"], "fear_future");

    let (status, body) = get(&state, "/api/moods/%66ear").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, _) = get(&state, "/api/moods/%FF").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bootstrap_refuses_cap_below_catalog() {
    let store = MemoryStore::new();
    let args = Args::parse_from(["shloka", "--memory-store", "--max-list", "5"]);
    assert!(args.validate().is_ok());

    let err = seed::bootstrap(&store, args.seed_policy, args.max_list)
        .await
        .unwrap_err();
    assert!(matches!(err, shloka::ShlokaError::Seed(_)));
    assert_eq!(store.count::<Emotion>().await.unwrap(), 0);
}

#[tokio::test]
async fn test_chapter_listing_is_complete_at_default_cap() {
    let store = MemoryStore::new();
    let args = Args::parse_from(["shloka", "--memory-store"]);
    seed::bootstrap(&store, args.seed_policy, args.max_list).await.unwrap();
    let state = AppState::new(args, Arc::new(store));

    let (status, body) = get(&state, "/api/chapters").await;
    assert_eq!(status, StatusCode::OK);
    let numbers: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["chapter_number"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, (1..=18).collect::<Vec<i64>>());
}
