//! Chapter document schema
//!
//! Chapter summaries are independent of the emotion hierarchy; nothing
//! references them and they reference nothing.

use bson::{doc, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::db::store::Record;

/// Collection name for chapters
pub const CHAPTER_COLLECTION: &str = "chapters";

/// A single quoted verse within a chapter summary
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Verse {
    /// Locator, e.g. "2.47"
    pub verse_number: String,
    pub sanskrit: String,
    pub english: String,
}

/// Chapter document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Chapter {
    /// Same value as `chapter_number`
    #[serde(rename = "_id")]
    pub id: i32,

    pub chapter_number: i32,

    pub name_english: String,

    pub name_sanskrit: String,

    pub description: String,

    /// One-line summary of the chapter's teaching
    pub key_teaching: String,

    /// Ordered verse excerpts
    #[serde(default)]
    pub verses: Vec<Verse>,
}

impl IntoIndexes for Chapter {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "chapter_number": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("chapter_number_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl Record for Chapter {
    const COLLECTION: &'static str = CHAPTER_COLLECTION;
}
