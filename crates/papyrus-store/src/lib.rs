//! Papyrus Storage Layer
//!
//! Implements the [`PaperStore`] trait on top of SQLite.
//!
//! Uniqueness of file paths and titles is enforced by unique indexes, so the
//! duplicate checks made by the importer are advisory: two concurrent imports
//! of the same paper cannot both be inserted.
//!
//! # Examples
//!
//! ```no_run
//! use papyrus_store::SqliteStore;
//!
//! let store = SqliteStore::open("papyrus.db").unwrap();
//! let papers = store.list().unwrap();
//! ```

#![warn(missing_docs)]

use papyrus_domain::traits::PaperStore;
use papyrus_domain::{DuplicateReason, Insertion, PaperMetadata, StoredPaper};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Paper not found
    #[error("Paper not found: {0}")]
    NotFound(i64),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

const SELECT_COLUMNS: &str =
    "SELECT id, file_path, title, authors, publication, year, summary, imported_at FROM papers";

/// SQLite-based paper library
///
/// # Thread Safety
///
/// The connection sits behind a mutex, so one store can be shared between
/// concurrent import tasks through an `Arc`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use papyrus_store::SqliteStore;
    ///
    /// let store = SqliteStore::open("papyrus.db").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Create an in-memory database (useful for testing)
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch a paper by id
    pub fn get(&self, id: i64) -> Result<Option<StoredPaper>, StoreError> {
        let conn = self.conn();
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        Ok(conn.query_row(&sql, params![id], row_to_paper).optional()?)
    }

    /// All papers, most recently imported first
    pub fn list(&self) -> Result<Vec<StoredPaper>, StoreError> {
        let conn = self.conn();
        let sql = format!("{} ORDER BY imported_at DESC, id DESC", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let papers = stmt.query_map([], row_to_paper)?.collect::<Result<Vec<_>, _>>()?;
        Ok(papers)
    }

    /// Papers whose title, authors, publication or summary contain `query`
    /// (case-insensitive for ASCII)
    pub fn search(&self, query: &str) -> Result<Vec<StoredPaper>, StoreError> {
        let query = query.trim();
        if query.is_empty() {
            return self.list();
        }

        let pattern = format!("%{}%", escape_like(query));
        let conn = self.conn();
        let sql = format!(
            "{} WHERE title LIKE ?1 ESCAPE '\\' \
                OR authors LIKE ?1 ESCAPE '\\' \
                OR publication LIKE ?1 ESCAPE '\\' \
                OR summary LIKE ?1 ESCAPE '\\' \
             ORDER BY imported_at DESC, id DESC",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let papers = stmt
            .query_map(params![pattern], row_to_paper)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(papers)
    }

    /// Delete a paper
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no paper has this id.
    pub fn remove(&self, id: i64) -> Result<(), StoreError> {
        let deleted = self.conn().execute("DELETE FROM papers WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(id));
        }
        debug!(id, "Paper removed");
        Ok(())
    }

    /// Number of stored papers
    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self.conn().query_row("SELECT COUNT(*) FROM papers", [], |row| row.get(0))?;
        usize::try_from(count).map_err(|_| StoreError::InvalidData(format!("Negative count: {}", count)))
    }
}

impl PaperStore for SqliteStore {
    type Error = StoreError;

    fn find_by_path(&self, file_path: &str) -> Result<Option<StoredPaper>, Self::Error> {
        let conn = self.conn();
        let sql = format!("{} WHERE file_path = ?1", SELECT_COLUMNS);
        Ok(conn.query_row(&sql, params![file_path], row_to_paper).optional()?)
    }

    fn find_by_title(&self, title: &str) -> Result<Option<StoredPaper>, Self::Error> {
        let Some(key) = title_key(title) else {
            return Ok(None);
        };
        let conn = self.conn();
        let sql = format!("{} WHERE title_key = ?1", SELECT_COLUMNS);
        Ok(conn.query_row(&sql, params![key], row_to_paper).optional()?)
    }

    fn insert(&self, file_path: &str, metadata: &PaperMetadata) -> Result<Insertion, Self::Error> {
        let imported_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let conn = self.conn();
        let result = conn.execute(
            "INSERT INTO papers (file_path, title, title_key, authors, publication, year, summary, imported_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                file_path,
                metadata.title,
                metadata_title_key(metadata),
                metadata.authors,
                metadata.publication,
                metadata.year,
                metadata.summary,
                imported_at as i64,
            ],
        );

        match result {
            Ok(_) => {
                let paper = StoredPaper {
                    id: conn.last_insert_rowid(),
                    file_path: file_path.to_string(),
                    metadata: metadata.clone(),
                    imported_at,
                };
                debug!(id = paper.id, "Paper inserted");
                Ok(Insertion::Inserted(paper))
            }
            Err(e) => match unique_violation(&e) {
                Some(reason) => {
                    debug!("Insert rejected: {}", e);
                    Ok(Insertion::Rejected(reason))
                }
                None => Err(e.into()),
            },
        }
    }
}

/// Normalized title used for duplicate detection
fn title_key(title: &str) -> Option<String> {
    let key = title.trim().to_lowercase();
    (!key.is_empty()).then_some(key)
}

/// Placeholder records carry no title key, so any number of them can coexist
fn metadata_title_key(metadata: &PaperMetadata) -> Option<String> {
    if metadata.is_placeholder() {
        return None;
    }
    metadata.title.as_deref().and_then(title_key)
}

/// Which unique index a failed insert ran into, if any
fn unique_violation(e: &rusqlite::Error) -> Option<DuplicateReason> {
    match e {
        rusqlite::Error::SqliteFailure(err, Some(msg)) if err.code == ErrorCode::ConstraintViolation => {
            if msg.contains("papers.file_path") {
                Some(DuplicateReason::FilePath)
            } else if msg.contains("papers.title_key") {
                Some(DuplicateReason::Title)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn row_to_paper(row: &Row<'_>) -> rusqlite::Result<StoredPaper> {
    let imported_at: i64 = row.get(7)?;
    Ok(StoredPaper {
        id: row.get(0)?,
        file_path: row.get(1)?,
        metadata: PaperMetadata {
            title: row.get(2)?,
            authors: row.get(3)?,
            publication: row.get(4)?,
            year: row.get(5)?,
            summary: row.get(6)?,
        },
        imported_at: imported_at.max(0) as u64,
    })
}
