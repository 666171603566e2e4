//! Storage Module
//!
//! Persistence contract and the SQLite reference backend:
//! - CRUD over memory records plus a full-text search primitive
//! - Append-only access log (the authoritative ACT-R practice history)
//! - Entity-graph and Hebbian-link tables
//!
//! The engine depends only on the [`Store`] trait; any backend honoring
//! the contract (embedded file, hosted relational) can stand in.

mod migrations;
mod sqlite;

pub use migrations::MIGRATIONS;
pub use sqlite::SqliteStore;

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::memory::MemoryEntry;

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Entry not found
    #[error("Entry not found: {0}")]
    NotFound(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Invalid persisted value
    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ============================================================================
// LINK RECORDS
// ============================================================================

/// A directed Hebbian co-activation edge between two memories.
///
/// Conceptually symmetric; both directions are written on strengthening.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HebbianLink {
    /// Source memory id
    pub source_id: String,
    /// Target memory id
    pub target_id: String,
    /// Link strength, positive and saturating at the configured ceiling
    pub strength: f64,
    /// Times the pair co-activated
    pub coactivation_count: i64,
    /// When the link was first written
    pub created_at: DateTime<Utc>,
}

/// An entity occurrence: this memory mentions this graph node
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLink {
    /// Memory id
    pub memory_id: String,
    /// Entity node id
    pub node_id: String,
    /// Host-supplied relation label
    pub relation: String,
}

// ============================================================================
// STORE CONTRACT
// ============================================================================

/// Persistence contract for memory backends.
///
/// All methods take `&self`; implementations provide their own interior
/// synchronization so a store can sit behind the façade's reader/writer
/// lock discipline without further wrapping.
pub trait Store: Send + Sync {
    /// Insert a new entry. The id must not already exist.
    fn add(&self, entry: &MemoryEntry) -> StoreResult<()>;

    /// Fetch an entry by id
    fn get(&self, id: &str) -> StoreResult<Option<MemoryEntry>>;

    /// Persist every field of an existing entry
    fn update(&self, entry: &MemoryEntry) -> StoreResult<()>;

    /// Remove an entry and cascade: its access-log rows, graph links,
    /// Hebbian links in both directions, and contradiction back-references
    /// on other entries. Returns whether a row was removed.
    fn delete(&self, id: &str) -> StoreResult<bool>;

    /// All entries, every layer included
    fn all(&self) -> StoreResult<Vec<MemoryEntry>>;

    /// Full-text search over a sanitized OR-of-keywords query.
    /// Matching granularity (substring, stemming) is the backend's call.
    fn search_fts(&self, query: &str, limit: usize) -> StoreResult<Vec<MemoryEntry>>;

    /// Append one access-log row for the entry
    fn record_access(&self, id: &str, at: DateTime<Utc>) -> StoreResult<()>;

    /// Full access-time history for the entry, oldest first
    fn access_times(&self, id: &str) -> StoreResult<Vec<DateTime<Utc>>>;

    /// Record that a memory mentions an entity
    fn add_graph_link(&self, memory_id: &str, node_id: &str, relation: &str) -> StoreResult<()>;

    /// Entity-occurrence rows for a memory, relation labels included
    fn graph_links_for(&self, memory_id: &str) -> StoreResult<Vec<GraphLink>>;

    /// Entries mentioning an entity (case-insensitive)
    fn search_by_entity(&self, entity: &str) -> StoreResult<Vec<MemoryEntry>>;

    /// Entities reachable from an entity through the bipartite
    /// entity-memory graph within `hops` hops, excluding the start
    fn related_entities(&self, entity: &str, hops: usize) -> StoreResult<Vec<String>>;

    /// Distinct entity node ids in the graph
    fn known_entities(&self) -> StoreResult<Vec<String>>;

    /// Strengthen the Hebbian link in both directions: +1 strength
    /// saturating at `ceiling`, +1 co-activation count; inserts at
    /// strength 1.0 when absent
    fn strengthen_link(&self, a: &str, b: &str, ceiling: f64) -> StoreResult<()>;

    /// Outgoing links by descending strength, limited to `k` when given
    fn hebbian_neighbors(&self, id: &str, k: Option<usize>) -> StoreResult<Vec<HebbianLink>>;

    /// Number of directed Hebbian link rows
    fn hebbian_link_count(&self) -> StoreResult<i64>;

    /// Flush pending state to durable storage
    fn close(&self) -> StoreResult<()>;

    /// Copy the logical database to a file
    fn export(&self, path: &Path) -> StoreResult<()>;
}
