//! Configuration for Shloka
//!
//! CLI arguments and environment variable handling using clap.

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;

/// Shloka - Bhagavad Gita guidance by emotion
#[derive(Parser, Debug, Clone)]
#[command(name = "shloka")]
#[command(about = "Read-only content API serving emotions, moods, guidance and chapters")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8001")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGO_URL", default_value = "mongodb://localhost:27017")]
    pub mongo_url: String,

    /// MongoDB database name
    #[arg(long, env = "DB_NAME", default_value = "shloka")]
    pub db_name: String,

    /// Common path prefix for every route
    #[arg(long, env = "API_PREFIX", default_value = "/api")]
    pub api_prefix: String,

    /// Startup seeding policy
    #[arg(long, env = "SEED_POLICY", value_enum, default_value_t = SeedPolicy::Selective)]
    pub seed_policy: SeedPolicy,

    /// Serve from an in-process store instead of MongoDB (development only)
    #[arg(long, env = "MEMORY_STORE", default_value = "false")]
    pub memory_store: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,

    /// Upper bound on records returned by list endpoints
    #[arg(long, env = "MAX_LIST", default_value = "100")]
    pub max_list: i64,
}

/// How the seed reconciler treats existing collections at startup
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedPolicy {
    /// Rewrite emotions, moods and guidance on every boot; insert chapters only when absent
    #[default]
    Selective,
    /// Seed everything only when the emotions collection is empty
    IfEmpty,
}

impl std::fmt::Display for SeedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedPolicy::Selective => write!(f, "selective"),
            SeedPolicy::IfEmpty => write!(f, "if-empty"),
        }
    }
}

impl Args {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.api_prefix.is_empty() {
            if !self.api_prefix.starts_with('/') {
                return Err("API_PREFIX must start with '/'".to_string());
            }
            if self.api_prefix.len() > 1 && self.api_prefix.ends_with('/') {
                return Err("API_PREFIX must not end with '/'".to_string());
            }
        }

        if self.max_list <= 0 {
            return Err("MAX_LIST must be greater than zero".to_string());
        }

        Ok(())
    }

    /// Prefix with a lone "/" collapsed to the empty string
    pub fn route_prefix(&self) -> &str {
        if self.api_prefix == "/" {
            ""
        } else {
            &self.api_prefix
        }
    }
}
