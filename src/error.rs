//! Error types for ironlog operations.
//! The binary wraps these in `anyhow`; the library keeps them typed.

use std::path::PathBuf;

// ═══════════════════════════════════════════════════════════════════════════════
// Storage
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("document encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

// ═══════════════════════════════════════════════════════════════════════════════
// Domain
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("invalid rep range: {min}-{max} (min must not exceed max)")]
    InvalidRepRange { min: u32, max: u32 },

    #[error("invalid set count: {sets} (must be 1-{max})")]
    InvalidSetCount { sets: u32, max: u32 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("there is already an active session (id: {id})")]
    AlreadyActive { id: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ═══════════════════════════════════════════════════════════════════════════════
// Import / export
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("invalid backup file format")]
    InvalidFormat,

    #[error("backup I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ═══════════════════════════════════════════════════════════════════════════════
// Coach endpoint
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum CoachError {
    #[error("chat request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("chat endpoint returned status {0}")]
    Status(u16),

    #[error("chat endpoint returned no message content")]
    MalformedResponse,

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ═══════════════════════════════════════════════════════════════════════════════
// Configuration
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("config file malformed: {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config write failed: {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config read failed: {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),
}
