use thiserror::Error;

/// Errors from the local state database.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another rssdeck process holds the database file.
    #[error("Another instance of rssdeck appears to be running. Please close it and try again.")]
    InstanceLocked,

    #[error("Database migration failed: {0}")]
    Migration(String),

    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Map a sqlx error, singling out SQLite lock contention
    /// (SQLITE_BUSY, SQLITE_LOCKED, SQLITE_CANTOPEN).
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        const LOCK_MARKERS: [&str; 5] = [
            "database is locked",
            "database table is locked",
            "sqlite_busy",
            "sqlite_locked",
            "unable to open database file",
        ];

        let text = err.to_string().to_lowercase();
        if LOCK_MARKERS.iter().any(|marker| text.contains(marker)) {
            return DatabaseError::InstanceLocked;
        }
        DatabaseError::Other(err)
    }
}
