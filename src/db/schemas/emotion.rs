//! Emotion document schema
//!
//! Top-level feeling categories, keyed by a hand-picked slug.

use bson::Document;
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::ident::string_id;
use crate::db::mongo::IntoIndexes;
use crate::db::store::Record;

/// Collection name for emotions
pub const EMOTION_COLLECTION: &str = "emotions";

/// Emotion document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Emotion {
    /// Slug, e.g. "fear"
    #[serde(rename = "_id", deserialize_with = "string_id")]
    pub id: String,

    /// Display name
    pub name_english: String,

    /// Name in Devanagari with transliteration
    pub name_sanskrit: String,

    pub description: String,

    /// Short icon token (an emoji)
    pub icon: String,
}

impl IntoIndexes for Emotion {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        Vec::new()
    }
}

impl Record for Emotion {
    const COLLECTION: &'static str = EMOTION_COLLECTION;
}
