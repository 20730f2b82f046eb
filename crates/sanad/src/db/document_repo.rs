//! Document repository: CRUD operations for the `documents` table.

use rusqlite::{params, Row};

use super::{Database, DatabaseError};

/// A raw document row from the database.
#[derive(Debug, Clone)]
pub struct DocumentRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub kind: String,
    pub file_path: String,
    pub original_filename: String,
    pub owner_id: Option<String>,
    pub is_public: bool,
    pub page_count: Option<i64>,
    pub file_size: Option<i64>,
    pub uploaded_at: String,
    pub updated_at: String,
}

impl DocumentRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            category: row.get("category")?,
            kind: row.get("kind")?,
            file_path: row.get("file_path")?,
            original_filename: row.get("original_filename")?,
            owner_id: row.get("owner_id")?,
            is_public: row.get("is_public")?,
            page_count: row.get("page_count")?,
            file_size: row.get("file_size")?,
            uploaded_at: row.get("uploaded_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Inserts a new document row and returns its generated id. `doc.id` is ignored.
pub fn insert(db: &Database, doc: &DocumentRow) -> Result<i64, DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO documents (title, description, category, kind, file_path,
             original_filename, owner_id, is_public, page_count, file_size,
             uploaded_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                doc.title,
                doc.description,
                doc.category,
                doc.kind,
                doc.file_path,
                doc.original_filename,
                doc.owner_id,
                doc.is_public,
                doc.page_count,
                doc.file_size,
                doc.uploaded_at,
                doc.updated_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    })
}

/// Finds a document by its ID.
pub fn find_by_id(db: &Database, id: i64) -> Result<Option<DocumentRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM documents WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], DocumentRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Stores refreshed file metadata. Returns `false` when no row matched.
pub fn update_metadata(
    db: &Database,
    id: i64,
    page_count: Option<i64>,
    file_size: Option<i64>,
    updated_at: &str,
) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE documents SET page_count = ?2, file_size = ?3, updated_at = ?4 WHERE id = ?1",
            params![id, page_count, file_size, updated_at],
        )?;
        Ok(changed > 0)
    })
}

/// Deletes a document row. Returns `false` when no row matched.
pub fn delete(db: &Database, id: i64) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute("DELETE FROM documents WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    })
}

/// Documents visible to `owner_id` (public ones plus their own), newest first.
/// With `include_private` every document is returned.
pub fn list_visible(
    db: &Database,
    owner_id: Option<&str>,
    include_private: bool,
    limit: u64,
) -> Result<Vec<DocumentRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM documents
             WHERE ?1 OR is_public = 1 OR (?2 IS NOT NULL AND owner_id = ?2)
             ORDER BY uploaded_at DESC, id DESC
             LIMIT ?3",
        )?;
        let rows = stmt
            .query_map(
                params![include_private, owner_id, limit as i64],
                DocumentRow::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}
