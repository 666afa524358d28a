//! Canonical content catalog
//!
//! The dataset lives in `data/*.json` and is compiled in with `include_str!`.
//! `check_consistency` encodes the relational invariants that must hold both
//! for the compiled-in catalog and for the store after reconciliation.

use std::collections::{HashMap, HashSet};

use crate::db::schemas::{Chapter, Emotion, Guidance, Mood};
use crate::types::{Result, ShlokaError};

/// Chapters are numbered 1..=CHAPTER_COUNT
pub const CHAPTER_COUNT: i32 = 18;

const EMOTIONS_JSON: &str = include_str!("data/emotions.json");
const MOODS_JSON: &str = include_str!("data/moods.json");
const GUIDANCE_JSON: &str = include_str!("data/guidance.json");
const CHAPTERS_JSON: &str = include_str!("data/chapters.json");

/// Full content set for all four collections
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub emotions: Vec<Emotion>,
    pub moods: Vec<Mood>,
    pub guidance: Vec<Guidance>,
    pub chapters: Vec<Chapter>,
}

impl Catalog {
    /// Parse and validate the compiled-in dataset
    pub fn canonical() -> Result<Self> {
        Self::from_json(EMOTIONS_JSON, MOODS_JSON, GUIDANCE_JSON, CHAPTERS_JSON)
    }

    pub fn from_json(emotions: &str, moods: &str, guidance: &str, chapters: &str) -> Result<Self> {
        let catalog = Self {
            emotions: serde_json::from_str(emotions)?,
            moods: serde_json::from_str(moods)?,
            guidance: serde_json::from_str(guidance)?,
            chapters: serde_json::from_str(chapters)?,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Most records any list endpoint returns for this catalog
    pub fn largest_listing(&self) -> usize {
        let mut per_emotion: HashMap<&str, usize> = HashMap::new();
        for mood in &self.moods {
            *per_emotion.entry(mood.emotion_id.as_str()).or_default() += 1;
        }
        let widest_emotion = per_emotion.values().copied().max().unwrap_or(0);

        self.emotions.len().max(self.chapters.len()).max(widest_emotion)
    }

    /// Reject a list cap that would truncate a canonical listing
    pub fn check_list_cap(&self, max_list: i64) -> Result<()> {
        let needed = self.largest_listing();
        if needed as i64 > max_list {
            return Err(ShlokaError::Seed(format!(
                "MAX_LIST {} is below the {} records the largest listing returns",
                max_list, needed
            )));
        }
        Ok(())
    }

    /// Reject a catalog that would seed an inconsistent store
    pub fn validate(&self) -> Result<()> {
        let violations = check_consistency(&self.emotions, &self.moods, &self.guidance, &self.chapters);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ShlokaError::Seed(format!(
                "canonical catalog is inconsistent: {}",
                violations.join("; ")
            )))
        }
    }
}

fn duplicates<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    let mut dups: Vec<&str> = ids.filter(|id| !seen.insert(*id)).collect();
    dups.sort_unstable();
    dups.dedup();
    dups
}

/// List every violated invariant; empty when the content is consistent
///
/// - identifiers are unique within each collection
/// - every mood's emotion exists
/// - every mood has exactly one guidance, and every guidance has a mood
/// - chapters are exactly 1..=CHAPTER_COUNT, `_id == chapter_number`,
///   each with at least one verse
pub fn check_consistency(
    emotions: &[Emotion],
    moods: &[Mood],
    guidance: &[Guidance],
    chapters: &[Chapter],
) -> Vec<String> {
    let mut violations = Vec::new();

    for id in duplicates(emotions.iter().map(|e| e.id.as_str())) {
        violations.push(format!("duplicate emotion '{}'", id));
    }
    for id in duplicates(moods.iter().map(|m| m.id.as_str())) {
        violations.push(format!("duplicate mood '{}'", id));
    }
    for id in duplicates(guidance.iter().map(|g| g.id.as_str())) {
        violations.push(format!("duplicate guidance '{}'", id));
    }

    let emotion_ids: HashSet<&str> = emotions.iter().map(|e| e.id.as_str()).collect();
    for mood in moods {
        if !emotion_ids.contains(mood.emotion_id.as_str()) {
            violations.push(format!(
                "mood '{}' references missing emotion '{}'",
                mood.id, mood.emotion_id
            ));
        }
    }

    let mut per_mood: HashMap<&str, usize> = HashMap::new();
    for g in guidance {
        *per_mood.entry(g.mood_id.as_str()).or_default() += 1;
    }
    for mood in moods {
        match per_mood.get(mood.id.as_str()).copied().unwrap_or(0) {
            1 => {}
            0 => violations.push(format!("mood '{}' has no guidance", mood.id)),
            n => violations.push(format!("mood '{}' has {} guidance entries", mood.id, n)),
        }
    }
    let mood_ids: HashSet<&str> = moods.iter().map(|m| m.id.as_str()).collect();
    for g in guidance {
        if !mood_ids.contains(g.mood_id.as_str()) {
            violations.push(format!(
                "guidance '{}' references missing mood '{}'",
                g.id, g.mood_id
            ));
        }
    }

    let mut numbers: Vec<i32> = chapters.iter().map(|c| c.chapter_number).collect();
    numbers.sort_unstable();
    let expected: Vec<i32> = (1..=CHAPTER_COUNT).collect();
    if numbers != expected {
        violations.push(format!(
            "chapter numbers {:?} are not exactly 1..={}",
            numbers, CHAPTER_COUNT
        ));
    }
    for chapter in chapters {
        if chapter.id != chapter.chapter_number {
            violations.push(format!(
                "chapter _id {} differs from chapter_number {}",
                chapter.id, chapter.chapter_number
            ));
        }
        if chapter.verses.is_empty() {
            violations.push(format!("chapter {} has no verses", chapter.chapter_number));
        }
    }

    violations
}
