//! Database schemas for Shloka
//!
//! Defines the MongoDB document structures for the emotion hierarchy and
//! the independent chapter table.

mod chapter;
mod emotion;
mod guidance;
mod mood;

pub use chapter::{Chapter, Verse, CHAPTER_COLLECTION};
pub use emotion::{Emotion, EMOTION_COLLECTION};
pub use guidance::{Guidance, GUIDANCE_COLLECTION};
pub use mood::{Mood, MOOD_COLLECTION};
