//! HTTP routes for Shloka

pub mod content;
pub mod health;
pub mod response;

pub use content::{
    get_chapter, get_guidance, greeting, list_chapters, list_emotions, list_moods, Greeting,
};
pub use health::{health_check, HealthResponse};
pub use response::{error_response, json_response, method_not_allowed, preflight_response};
