//! Mood document schema

use bson::{doc, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::ident::string_id;
use crate::db::mongo::IntoIndexes;
use crate::db::store::Record;

/// Collection name for moods
pub const MOOD_COLLECTION: &str = "moods";

/// A situational variant of an emotion
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Mood {
    /// Slug, e.g. "fear_future"
    #[serde(rename = "_id", deserialize_with = "string_id")]
    pub id: String,

    /// Parent emotion slug
    pub emotion_id: String,

    pub name: String,

    pub description: String,
}

impl IntoIndexes for Mood {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Moods are always listed by parent emotion
            (
                doc! { "emotion_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("emotion_id_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl Record for Mood {
    const COLLECTION: &'static str = MOOD_COLLECTION;
}
