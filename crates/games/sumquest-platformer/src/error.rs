use thiserror::Error;

use sumquest_core::geometry::Aabb;

/// Reasons a level or physics configuration is rejected at load time.
///
/// Nothing in here can happen mid-tick: once a `Level` exists it is valid.
#[derive(Error, Debug)]
pub enum LevelError {
    #[error("level {level:?}: collectible sequence is empty")]
    EmptySequence { level: String },

    #[error("level {level:?}: target {target} does not equal the sequence sum {sum}")]
    TargetMismatch { level: String, target: u64, sum: u64 },

    #[error("level {level:?}: sequence needs {needed} collectible(s) worth {value}, found {found}")]
    MissingCollectible {
        level: String,
        value: u32,
        needed: usize,
        found: usize,
    },

    #[error("level {level:?}: {entity} has an invalid rectangle {rect:?}")]
    InvalidRect {
        level: String,
        entity: &'static str,
        rect: Aabb,
    },

    #[error("level {level:?}: expected exactly one goal, found {found}")]
    GoalCount { level: String, found: usize },

    #[error("level {level:?}: lives budget must be at least 1")]
    NoLives { level: String },

    #[error("level {level:?}: invalid world bounds: {reason}")]
    InvalidWorld { level: String, reason: String },

    #[error("level {level:?}: invalid spawn point: {reason}")]
    InvalidSpawn { level: String, reason: String },

    #[error("invalid physics config: {0}")]
    InvalidPhysics(String),

    #[error("level catalog is empty")]
    EmptyCatalog,

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
