//! SQLite persistence for vector collections.
//!
//! One database file holds any number of named collections. Every entry keeps
//! its passage, metadata and embedding (little-endian `f32` blob) together
//! with a UUIDv7 identifier and a SHA-256 digest of the content.

use std::path::{Path, PathBuf};

use docqa_core::{Passage, PassageMetadata};
use jiff::Timestamp;
use rusqlite::types::Type;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use uuid::Uuid;

use crate::{Error, Result};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS collections (
        name TEXT PRIMARY KEY,
        embedding_model TEXT NOT NULL,
        dimensions INTEGER NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS entries (
        id TEXT PRIMARY KEY,
        collection TEXT NOT NULL,
        seq INTEGER NOT NULL,
        content TEXT NOT NULL,
        source_path TEXT NOT NULL,
        page_number INTEGER NOT NULL,
        chunk_sequence_id INTEGER NOT NULL,
        content_sha256 BLOB NOT NULL,
        embedding BLOB NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_entries_collection ON entries(collection, seq);
"#;

/// Metadata recorded for every collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionInfo {
    /// Collection name.
    pub name: String,
    /// Embedding model the vectors were produced with.
    pub embedding_model: String,
    /// Dimensionality of every stored vector.
    pub dimensions: usize,
    /// When the collection was built.
    pub created_at: Timestamp,
}

/// A passage together with its normalized embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    /// Entry identifier.
    pub id: Uuid,
    /// The indexed passage.
    pub passage: Passage,
    /// Unit-length embedding vector.
    pub embedding: Vec<f32>,
}

impl StoredEntry {
    /// Creates an entry with a fresh time-ordered identifier.
    pub fn new(passage: Passage, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::now_v7(),
            passage,
            embedding,
        }
    }
}

/// Handle to the index database file.
#[derive(Debug, Clone)]
pub struct SqliteIndex {
    path: PathBuf,
}

impl SqliteIndex {
    /// Creates a handle; the file is opened per operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_writable(&self) -> Result<Connection> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&self.path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }

    fn open_read_only(&self) -> Result<Option<Connection>> {
        if !self.path.is_file() {
            return Ok(None);
        }

        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Some(conn))
    }

    /// Replaces the collection with the given entries in one transaction.
    pub fn replace_collection(&self, info: &CollectionInfo, entries: &[StoredEntry]) -> Result<()> {
        let mut conn = self.open_writable()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM entries WHERE collection = ?1", params![info.name])?;
        tx.execute(
            "INSERT OR REPLACE INTO collections (name, embedding_model, dimensions, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                info.name,
                info.embedding_model,
                info.dimensions as i64,
                info.created_at.to_string(),
            ],
        )?;

        {
            let mut insert = tx.prepare(
                "INSERT INTO entries (id, collection, seq, content, source_path, page_number,
                                      chunk_sequence_id, content_sha256, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;

            for (seq, entry) in entries.iter().enumerate() {
                let metadata = &entry.passage.metadata;
                insert.execute(params![
                    entry.id.to_string(),
                    info.name,
                    seq as i64,
                    entry.passage.content,
                    metadata.source_path,
                    metadata.page_number,
                    metadata.chunk_sequence_id as i64,
                    entry.passage.content_sha256().to_vec(),
                    encode_embedding(&entry.embedding),
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Reads collection metadata, or `None` if the collection does not exist.
    pub fn collection_info(&self, name: &str) -> Result<Option<CollectionInfo>> {
        let Some(conn) = self.open_read_only()? else {
            return Ok(None);
        };
        if !has_collections_table(&conn)? {
            return Ok(None);
        }

        let info = conn
            .query_row(
                "SELECT name, embedding_model, dimensions, created_at
                 FROM collections WHERE name = ?1",
                params![name],
                |row| {
                    let created_at: String = row.get(3)?;
                    let created_at = created_at.parse::<Timestamp>().map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e))
                    })?;

                    Ok(CollectionInfo {
                        name: row.get(0)?,
                        embedding_model: row.get(1)?,
                        dimensions: row.get::<_, i64>(2)? as usize,
                        created_at,
                    })
                },
            )
            .optional()?;

        Ok(info)
    }

    /// Reads every entry of a collection in insertion order.
    pub fn load_entries(&self, name: &str, dimensions: usize) -> Result<Vec<StoredEntry>> {
        let Some(conn) = self.open_read_only()? else {
            return Err(Error::CollectionNotFound(name.to_string()));
        };

        let mut select = conn.prepare(
            "SELECT id, content, source_path, page_number, chunk_sequence_id, embedding
             FROM entries WHERE collection = ?1 ORDER BY seq",
        )?;

        let rows = select.query_map(params![name], |row| {
            let id: String = row.get(0)?;
            let id = Uuid::parse_str(&id).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
            })?;
            let passage = Passage::new(
                row.get::<_, String>(1)?,
                PassageMetadata {
                    source_path: row.get(2)?,
                    page_number: row.get(3)?,
                    chunk_sequence_id: row.get::<_, i64>(4)? as u64,
                },
            );
            let embedding: Vec<u8> = row.get(5)?;
            Ok((id, passage, embedding))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, passage, bytes) = row?;
            let embedding = decode_embedding(&bytes);
            if embedding.len() != dimensions {
                return Err(Error::embedding(format!(
                    "stored embedding {id} has {} dimensions, expected {dimensions}",
                    embedding.len()
                )));
            }
            entries.push(StoredEntry {
                id,
                passage,
                embedding,
            });
        }

        Ok(entries)
    }

    /// Deletes a collection and its entries. Returns whether it existed.
    pub fn delete_collection(&self, name: &str) -> Result<bool> {
        if !self.path.is_file() {
            return Ok(false);
        }

        let mut conn = self.open_writable()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM entries WHERE collection = ?1", params![name])?;
        let removed = tx.execute("DELETE FROM collections WHERE name = ?1", params![name])?;
        tx.commit()?;

        Ok(removed > 0)
    }
}

fn has_collections_table(conn: &Connection) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'collections'",
        [],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|x| x.to_le_bytes()).collect()
}

fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| {
            let mut buf = [0_u8; 4];
            buf.copy_from_slice(chunk);
            f32::from_le_bytes(buf)
        })
        .collect()
}
