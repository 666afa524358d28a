//! Content routes
//!
//! Each handler is one collection read:
//! - `GET /emotions` - all emotions, capped at `max_list`
//! - `GET /moods/{emotion_id}` - moods of one emotion, 404 when none
//! - `GET /guidance/{mood_id}` - the passage for one mood, 404 when absent
//! - `GET /chapters` - all chapters by `chapter_number` ascending
//! - `GET /chapters/{chapter_number}` - one chapter, 404 when absent
//!
//! An unknown emotion and an emotion with no moods are indistinguishable;
//! both answer 404.

use serde::Serialize;

use crate::db::schemas::{Chapter, Emotion, Guidance, Mood};
use crate::db::store::{DocumentStore, Filter, FindQuery, SortOrder};
use crate::server::AppState;
use crate::types::{Result, ShlokaError};

#[derive(Debug, Serialize)]
pub struct Greeting {
    pub message: &'static str,
}

pub fn greeting() -> Greeting {
    Greeting {
        message: "SHLOKA API - Bhagavad Gita Guidance by Emotion",
    }
}

pub async fn list_emotions<S: DocumentStore>(state: &AppState<S>) -> Result<Vec<Emotion>> {
    state
        .store
        .find(FindQuery::default().limit(state.args.max_list))
        .await
}

pub async fn list_moods<S: DocumentStore>(state: &AppState<S>, emotion_id: &str) -> Result<Vec<Mood>> {
    let moods: Vec<Mood> = state
        .store
        .find(FindQuery::new(Filter::eq("emotion_id", emotion_id)).limit(state.args.max_list))
        .await?;

    if moods.is_empty() {
        return Err(ShlokaError::NotFound("No moods found for this emotion".into()));
    }
    Ok(moods)
}

pub async fn get_guidance<S: DocumentStore>(state: &AppState<S>, mood_id: &str) -> Result<Guidance> {
    state
        .store
        .find_one(Filter::eq("mood_id", mood_id))
        .await?
        .ok_or_else(|| ShlokaError::NotFound("Guidance not found for this mood".into()))
}

pub async fn list_chapters<S: DocumentStore>(state: &AppState<S>) -> Result<Vec<Chapter>> {
    state
        .store
        .find(
            FindQuery::default()
                .sort("chapter_number", SortOrder::Ascending)
                .limit(state.args.max_list),
        )
        .await
}

/// `chapter_number` is the raw path segment; anything that is not an
/// integer is simply not found
pub async fn get_chapter<S: DocumentStore>(state: &AppState<S>, chapter_number: &str) -> Result<Chapter> {
    let not_found = || ShlokaError::NotFound("Chapter not found".into());

    let number: i32 = chapter_number.parse().map_err(|_| not_found())?;

    state
        .store
        .find_one(Filter::eq("chapter_number", number))
        .await?
        .ok_or_else(not_found)
}
