//! Error types for wowdb

use thiserror::Error;

/// Unified error type for armory fetches and database operations
#[derive(Debug, Error)]
pub enum WowDbError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// Failed to parse JSON response
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// HTTP error status code from the armory
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),
    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// The armory has no character with this name on this realm
    #[error("Character not found on the armory: {0}")]
    CharacterNotFound(String),
    /// The armory has no item with this id
    #[error("Item not found on the armory: {0}")]
    ItemNotFound(u64),
    /// A `Name-Realm` style path segment could not be split
    #[error("Expected Name-Realm, got: {0}")]
    InvalidSlug(String),
    /// The shared database connection was poisoned by a panicking handler
    #[error("Database connection lock poisoned")]
    LockPoisoned,
}

/// Result alias for wowdb operations
pub type Result<T> = std::result::Result<T, WowDbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = WowDbError::CharacterNotFound("Sedawk-Sargeras".to_string());
        assert_eq!(
            err.to_string(),
            "Character not found on the armory: Sedawk-Sargeras"
        );

        let err = WowDbError::HttpStatus(reqwest::StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "HTTP error: 502 Bad Gateway");
    }

    #[test]
    fn rusqlite_errors_convert() {
        let err: WowDbError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, WowDbError::Database(_)));
    }
}
