//! Guidance document schema
//!
//! A scripture-derived teaching passage keyed to exactly one mood.

use bson::{doc, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::ident::string_id;
use crate::db::mongo::IntoIndexes;
use crate::db::store::Record;

/// Collection name for guidance passages
pub const GUIDANCE_COLLECTION: &str = "guidances";

/// Guidance document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Guidance {
    /// Slug, e.g. "guidance_fear_future"
    #[serde(rename = "_id", deserialize_with = "string_id")]
    pub id: String,

    /// Mood this passage answers
    pub mood_id: String,

    pub title: String,

    /// Citation, e.g. "Bhagavad Gita 2.47"
    pub verse_reference: String,

    /// Verse in Devanagari
    pub sanskrit_verse: String,

    pub english_translation: String,

    /// Explanatory passage
    pub guidance_text: String,
}

impl IntoIndexes for Guidance {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // At most one passage per mood
            (
                doc! { "mood_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("mood_id_unique".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl Record for Guidance {
    const COLLECTION: &'static str = GUIDANCE_COLLECTION;
}
