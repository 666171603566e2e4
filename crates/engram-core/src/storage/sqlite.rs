//! SQLite Storage Implementation
//!
//! Reference backend for the [`Store`] contract, with FTS5 keyword search
//! and the access-log, entity-graph, and Hebbian tables.
//!
//! Uses separate reader/writer connections behind mutexes so every method
//! takes `&self` and the store is `Send + Sync`.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use crate::memory::{MemoryEntry, MemoryLayer, MemoryType};
use crate::storage::migrations::MIGRATIONS;
use crate::storage::{GraphLink, HebbianLink, Store, StoreError, StoreResult};

/// SQLite-backed memory store
pub struct SqliteStore {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
}

impl SqliteStore {
    /// Apply PRAGMAs to a connection
    fn configure_connection(conn: &Connection) -> StoreResult<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;
             PRAGMA temp_store = MEMORY;",
        )?;
        Ok(())
    }

    /// Apply pending migrations
    fn apply_migrations(conn: &Connection) -> StoreResult<()> {
        for migration in MIGRATIONS {
            let applied: Option<u32> = conn
                .query_row(
                    "SELECT version FROM schema_version WHERE version = ?1",
                    params![migration.version],
                    |row| row.get(0),
                )
                .optional()
                .unwrap_or(None);
            if applied.is_none() {
                tracing::debug!(
                    version = migration.version,
                    "applying migration: {}",
                    migration.description
                );
                conn.execute_batch(migration.up)?;
                conn.execute(
                    "INSERT OR IGNORE INTO schema_version (version, applied_at)
                     VALUES (?1, ?2)",
                    params![migration.version, Utc::now().to_rfc3339()],
                )?;
            }
        }
        Ok(())
    }

    fn from_connections(writer: Connection, reader: Connection) -> StoreResult<Self> {
        Self::configure_connection(&writer)?;
        Self::configure_connection(&reader)?;
        Self::apply_migrations(&writer)?;
        Ok(Self {
            writer: Mutex::new(writer),
            reader: Mutex::new(reader),
        })
    }

    /// Open (or create) a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let writer = Connection::open(path)?;
        let reader = Connection::open(path)?;
        Self::from_connections(writer, reader)
    }

    /// Open a store in the platform data directory (`engram.db`)
    pub fn open_default() -> StoreResult<Self> {
        let proj_dirs = ProjectDirs::from("dev", "engram", "engram")
            .ok_or_else(|| StoreError::Init("Could not determine project directories".into()))?;
        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        Self::open(data_dir.join("engram.db"))
    }

    /// Open a non-persistent in-memory store (shared between the reader
    /// and writer connections)
    pub fn open_in_memory() -> StoreResult<Self> {
        let uri = format!(
            "file:engram-mem-{}?mode=memory&cache=shared",
            uuid::Uuid::new_v4()
        );
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let writer = Connection::open_with_flags(&uri, flags)?;
        let reader = Connection::open_with_flags(&uri, flags)?;
        Self::from_connections(writer, reader)
    }

    fn lock_writer(&self) -> StoreResult<std::sync::MutexGuard<'_, Connection>> {
        self.writer
            .lock()
            .map_err(|_| StoreError::Init("Writer lock poisoned".into()))
    }

    fn lock_reader(&self) -> StoreResult<std::sync::MutexGuard<'_, Connection>> {
        self.reader
            .lock()
            .map_err(|_| StoreError::Init("Reader lock poisoned".into()))
    }

    /// Parse an RFC3339 timestamp column
    fn parse_timestamp(value: &str, field_name: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("Invalid {} timestamp '{}': {}", field_name, value, e),
                    )),
                )
            })
    }

    /// Convert a row to a MemoryEntry
    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<MemoryEntry> {
        let memory_type: String = row.get("memory_type")?;
        let layer: String = row.get("layer")?;
        let context_json: String = row.get("context")?;

        let created_at: String = row.get("created_at")?;
        let last_accessed: String = row.get("last_accessed")?;
        let last_consolidated: Option<String> = row.get("last_consolidated")?;

        let mut entry = MemoryEntry::new(
            row.get::<_, String>("content")?,
            memory_type.parse::<MemoryType>().unwrap_or_default(),
        );
        entry.id = row.get("id")?;
        entry.layer = layer.parse::<MemoryLayer>().unwrap_or_default();
        entry.importance = row.get("importance")?;
        entry.working_strength = row.get("working_strength")?;
        entry.core_strength = row.get("core_strength")?;
        entry.access_count = row.get("access_count")?;
        entry.consolidation_count = row.get("consolidation_count")?;
        entry.created_at = Self::parse_timestamp(&created_at, "created_at")?;
        entry.last_accessed = Self::parse_timestamp(&last_accessed, "last_accessed")?;
        entry.last_consolidated = match last_consolidated {
            Some(s) => Some(Self::parse_timestamp(&s, "last_consolidated")?),
            None => None,
        };
        entry.pinned = row.get::<_, i64>("pinned")? != 0;
        entry.contradicts = row.get("contradicts")?;
        entry.contradicted_by = row.get("contradicted_by")?;
        entry.context = serde_json::from_str(&context_json).unwrap_or_default();

        Ok(entry)
    }

    fn query_entries(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StoreResult<Vec<MemoryEntry>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, Self::row_to_entry)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }
}

impl Store for SqliteStore {
    fn add(&self, entry: &MemoryEntry) -> StoreResult<()> {
        let context_json =
            serde_json::to_string(&entry.context).unwrap_or_else(|_| "[]".to_string());
        let writer = self.lock_writer()?;
        writer.execute(
            "INSERT INTO memories (
                id, content, memory_type, layer, importance,
                working_strength, core_strength,
                access_count, consolidation_count,
                created_at, last_accessed, last_consolidated,
                pinned, contradicts, contradicted_by, context
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7,
                ?8, ?9,
                ?10, ?11, ?12,
                ?13, ?14, ?15, ?16
            )",
            params![
                entry.id,
                entry.content,
                entry.memory_type.as_str(),
                entry.layer.as_str(),
                entry.importance,
                entry.working_strength,
                entry.core_strength,
                entry.access_count,
                entry.consolidation_count,
                entry.created_at.to_rfc3339(),
                entry.last_accessed.to_rfc3339(),
                entry.last_consolidated.map(|t| t.to_rfc3339()),
                entry.pinned as i64,
                entry.contradicts,
                entry.contradicted_by,
                context_json,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> StoreResult<Option<MemoryEntry>> {
        let reader = self.lock_reader()?;
        let mut stmt = reader.prepare("SELECT * FROM memories WHERE id = ?1")?;
        let entry = stmt
            .query_row(params![id], Self::row_to_entry)
            .optional()?;
        Ok(entry)
    }

    fn update(&self, entry: &MemoryEntry) -> StoreResult<()> {
        let context_json =
            serde_json::to_string(&entry.context).unwrap_or_else(|_| "[]".to_string());
        let writer = self.lock_writer()?;
        let rows = writer.execute(
            "UPDATE memories SET
                content = ?2, memory_type = ?3, layer = ?4, importance = ?5,
                working_strength = ?6, core_strength = ?7,
                access_count = ?8, consolidation_count = ?9,
                created_at = ?10, last_accessed = ?11, last_consolidated = ?12,
                pinned = ?13, contradicts = ?14, contradicted_by = ?15,
                context = ?16
             WHERE id = ?1",
            params![
                entry.id,
                entry.content,
                entry.memory_type.as_str(),
                entry.layer.as_str(),
                entry.importance,
                entry.working_strength,
                entry.core_strength,
                entry.access_count,
                entry.consolidation_count,
                entry.created_at.to_rfc3339(),
                entry.last_accessed.to_rfc3339(),
                entry.last_consolidated.map(|t| t.to_rfc3339()),
                entry.pinned as i64,
                entry.contradicts,
                entry.contradicted_by,
                context_json,
            ],
        )?;
        if rows == 0 {
            return Err(StoreError::NotFound(entry.id.clone()));
        }
        Ok(())
    }

    fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut writer = self.lock_writer()?;
        let tx = writer.transaction()?;
        let rows = tx.execute("DELETE FROM memories WHERE id = ?1", params![id])?;
        tx.execute("DELETE FROM access_log WHERE memory_id = ?1", params![id])?;
        tx.execute("DELETE FROM graph_links WHERE memory_id = ?1", params![id])?;
        tx.execute(
            "DELETE FROM hebbian_links WHERE source_id = ?1 OR target_id = ?1",
            params![id],
        )?;
        tx.execute(
            "UPDATE memories SET contradicts = NULL WHERE contradicts = ?1",
            params![id],
        )?;
        tx.execute(
            "UPDATE memories SET contradicted_by = NULL WHERE contradicted_by = ?1",
            params![id],
        )?;
        tx.commit()?;
        Ok(rows > 0)
    }

    fn all(&self) -> StoreResult<Vec<MemoryEntry>> {
        let reader = self.lock_reader()?;
        Self::query_entries(&reader, "SELECT * FROM memories", [])
    }

    fn search_fts(&self, query: &str, limit: usize) -> StoreResult<Vec<MemoryEntry>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let reader = self.lock_reader()?;
        Self::query_entries(
            &reader,
            "SELECT m.* FROM memories m
             JOIN memories_fts fts ON m.id = fts.id
             WHERE memories_fts MATCH ?1
             ORDER BY rank
             LIMIT ?2",
            params![query, limit as i64],
        )
    }

    fn record_access(&self, id: &str, at: DateTime<Utc>) -> StoreResult<()> {
        let writer = self.lock_writer()?;
        writer.execute(
            "INSERT INTO access_log (memory_id, accessed_at) VALUES (?1, ?2)",
            params![id, at.to_rfc3339()],
        )?;
        Ok(())
    }

    fn access_times(&self, id: &str) -> StoreResult<Vec<DateTime<Utc>>> {
        let reader = self.lock_reader()?;
        let mut stmt = reader.prepare(
            "SELECT accessed_at FROM access_log
             WHERE memory_id = ?1
             ORDER BY accessed_at ASC",
        )?;
        let rows = stmt.query_map(params![id], |row| {
            let raw: String = row.get(0)?;
            Self::parse_timestamp(&raw, "accessed_at")
        })?;
        let mut times = Vec::new();
        for row in rows {
            times.push(row?);
        }
        Ok(times)
    }

    fn add_graph_link(&self, memory_id: &str, node_id: &str, relation: &str) -> StoreResult<()> {
        let writer = self.lock_writer()?;
        writer.execute(
            "INSERT INTO graph_links (memory_id, node_id, relation) VALUES (?1, ?2, ?3)",
            params![memory_id, node_id, relation],
        )?;
        Ok(())
    }

    fn graph_links_for(&self, memory_id: &str) -> StoreResult<Vec<GraphLink>> {
        let reader = self.lock_reader()?;
        let mut stmt = reader.prepare(
            "SELECT memory_id, node_id, relation FROM graph_links WHERE memory_id = ?1",
        )?;
        let rows = stmt.query_map(params![memory_id], |row| {
            Ok(GraphLink {
                memory_id: row.get(0)?,
                node_id: row.get(1)?,
                relation: row.get(2)?,
            })
        })?;
        let mut links = Vec::new();
        for row in rows {
            links.push(row?);
        }
        Ok(links)
    }

    fn search_by_entity(&self, entity: &str) -> StoreResult<Vec<MemoryEntry>> {
        let reader = self.lock_reader()?;
        Self::query_entries(
            &reader,
            "SELECT DISTINCT m.* FROM memories m
             JOIN graph_links g ON m.id = g.memory_id
             WHERE LOWER(g.node_id) = LOWER(?1)",
            params![entity],
        )
    }

    fn related_entities(&self, entity: &str, hops: usize) -> StoreResult<Vec<String>> {
        let reader = self.lock_reader()?;
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(entity.to_lowercase());
        let mut frontier = vec![entity.to_string()];
        let mut related = Vec::new();

        // BFS over the bipartite entity <-> memory graph
        for _ in 0..hops {
            let mut next = Vec::new();
            for ent in &frontier {
                let mut stmt = reader.prepare(
                    "SELECT DISTINCT g2.node_id
                     FROM graph_links g1
                     JOIN graph_links g2 ON g1.memory_id = g2.memory_id
                     WHERE LOWER(g1.node_id) = LOWER(?1)",
                )?;
                let rows = stmt.query_map(params![ent], |row| row.get::<_, String>(0))?;
                for row in rows {
                    let node = row?;
                    if seen.insert(node.to_lowercase()) {
                        related.push(node.clone());
                        next.push(node);
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        Ok(related)
    }

    fn known_entities(&self) -> StoreResult<Vec<String>> {
        let reader = self.lock_reader()?;
        let mut stmt = reader.prepare("SELECT DISTINCT node_id FROM graph_links")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut entities = Vec::new();
        for row in rows {
            entities.push(row?);
        }
        Ok(entities)
    }

    fn strengthen_link(&self, a: &str, b: &str, ceiling: f64) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();
        let mut writer = self.lock_writer()?;
        let tx = writer.transaction()?;
        for (source, target) in [(a, b), (b, a)] {
            tx.execute(
                "INSERT INTO hebbian_links
                    (source_id, target_id, strength, coactivation_count, created_at)
                 VALUES (?1, ?2, 1.0, 1, ?3)
                 ON CONFLICT (source_id, target_id) DO UPDATE SET
                    strength = MIN(strength + 1.0, ?4),
                    coactivation_count = coactivation_count + 1",
                params![source, target, now, ceiling],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn hebbian_neighbors(&self, id: &str, k: Option<usize>) -> StoreResult<Vec<HebbianLink>> {
        let reader = self.lock_reader()?;
        let limit = k.map(|k| k as i64).unwrap_or(-1);
        let mut stmt = reader.prepare(
            "SELECT source_id, target_id, strength, coactivation_count, created_at
             FROM hebbian_links
             WHERE source_id = ?1
             ORDER BY strength DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![id, limit], |row| {
            let created_at: String = row.get(4)?;
            Ok(HebbianLink {
                source_id: row.get(0)?,
                target_id: row.get(1)?,
                strength: row.get(2)?,
                coactivation_count: row.get(3)?,
                created_at: Self::parse_timestamp(&created_at, "created_at")?,
            })
        })?;
        let mut neighbors = Vec::new();
        for row in rows {
            neighbors.push(row?);
        }
        Ok(neighbors)
    }

    fn hebbian_link_count(&self) -> StoreResult<i64> {
        let reader = self.lock_reader()?;
        let count =
            reader.query_row("SELECT COUNT(*) FROM hebbian_links", [], |row| row.get(0))?;
        Ok(count)
    }

    fn close(&self) -> StoreResult<()> {
        let writer = self.lock_writer()?;
        // In-memory databases have no WAL to checkpoint
        let _ = writer.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);");
        Ok(())
    }

    fn export(&self, path: &Path) -> StoreResult<()> {
        let path_str = path
            .to_str()
            .ok_or_else(|| StoreError::Init("Invalid export path encoding".to_string()))?;
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        let reader = self.lock_reader()?;
        // VACUUM INTO doesn't support parameterized queries; escape single quotes
        reader.execute_batch(&format!("VACUUM INTO '{}'", path_str.replace('\'', "''")))?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn entry(content: &str) -> MemoryEntry {
        MemoryEntry::new(content, MemoryType::Factual)
    }

    #[test]
    fn test_add_get_roundtrip_identical_fields() {
        let store = store();
        let mut original = entry("the parser lives in crates/engram-core");
        original.importance = 0.55;
        original.context = vec!["project".to_string(), "layout".to_string()];
        original.contradicts = Some("other-id".to_string());
        store.add(&original).unwrap();

        let loaded = store.get(&original.id).unwrap().unwrap();
        assert_eq!(loaded.id, original.id);
        assert_eq!(loaded.content, original.content);
        assert_eq!(loaded.memory_type, original.memory_type);
        assert_eq!(loaded.layer, original.layer);
        assert_eq!(loaded.importance, original.importance);
        assert_eq!(loaded.working_strength, original.working_strength);
        assert_eq!(loaded.core_strength, original.core_strength);
        assert_eq!(loaded.created_at, original.created_at);
        assert_eq!(loaded.last_accessed, original.last_accessed);
        assert_eq!(loaded.context, original.context);
        assert_eq!(loaded.contradicts, original.contradicts);
        assert_eq!(loaded.pinned, original.pinned);
    }

    #[test]
    fn test_get_missing_is_none() {
        assert!(store().get("nope").unwrap().is_none());
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let store = store();
        let ghost = entry("never added");
        assert!(matches!(
            store.update(&ghost),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_persists_changes() {
        let store = store();
        let mut e = entry("mutable");
        store.add(&e).unwrap();

        e.working_strength = 0.42;
        e.layer = MemoryLayer::Core;
        e.pinned = true;
        store.update(&e).unwrap();

        let loaded = store.get(&e.id).unwrap().unwrap();
        assert_eq!(loaded.working_strength, 0.42);
        assert_eq!(loaded.layer, MemoryLayer::Core);
        assert!(loaded.pinned);
    }

    #[test]
    fn test_fts_search_matches_content() {
        let store = store();
        let coffee = entry("the espresso machine needs descaling");
        let tea = entry("green tea steeps at eighty degrees");
        store.add(&coffee).unwrap();
        store.add(&tea).unwrap();

        let hits = store.search_fts("espresso", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, coffee.id);

        let hits = store.search_fts("espresso OR tea", 10).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_fts_index_follows_updates() {
        let store = store();
        let mut e = entry("original wording");
        store.add(&e).unwrap();

        e.content = "revised phrasing".to_string();
        store.update(&e).unwrap();

        assert!(store.search_fts("original", 10).unwrap().is_empty());
        assert_eq!(store.search_fts("revised", 10).unwrap().len(), 1);
    }

    #[test]
    fn test_access_log_roundtrip_ordered() {
        let store = store();
        let e = entry("accessed");
        store.add(&e).unwrap();

        let base = Utc::now();
        store.record_access(&e.id, base + Duration::seconds(2)).unwrap();
        store.record_access(&e.id, base).unwrap();
        store.record_access(&e.id, base + Duration::seconds(1)).unwrap();

        let times = store.access_times(&e.id).unwrap();
        assert_eq!(times.len(), 3);
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_entity_graph_lookup_and_bfs() {
        let store = store();
        let a = entry("alice runs the beta program");
        let b = entry("the beta program ships friday");
        let c = entry("carol reviews infra");
        store.add(&a).unwrap();
        store.add(&b).unwrap();
        store.add(&c).unwrap();

        store.add_graph_link(&a.id, "alice", "mentions").unwrap();
        store.add_graph_link(&a.id, "beta", "mentions").unwrap();
        store.add_graph_link(&b.id, "beta", "mentions").unwrap();
        store.add_graph_link(&b.id, "friday", "mentions").unwrap();
        store.add_graph_link(&c.id, "carol", "mentions").unwrap();

        let hits = store.search_by_entity("BETA").unwrap();
        assert_eq!(hits.len(), 2);

        let links = store.graph_links_for(&a.id).unwrap();
        assert_eq!(links.len(), 2);
        assert!(links
            .iter()
            .all(|l| l.memory_id == a.id && l.relation == "mentions"));

        // one hop from alice: beta (shared memory a)
        let one_hop = store.related_entities("alice", 1).unwrap();
        assert_eq!(one_hop, vec!["beta".to_string()]);

        // two hops reach friday through memory b
        let two_hops = store.related_entities("alice", 2).unwrap();
        assert!(two_hops.contains(&"friday".to_string()));
        assert!(!two_hops.contains(&"carol".to_string()));

        assert_eq!(store.known_entities().unwrap().len(), 4);
    }

    #[test]
    fn test_hebbian_strengthen_both_directions_and_cap() {
        let store = store();
        store.strengthen_link("a", "b", 10.0).unwrap();

        let forward = store.hebbian_neighbors("a", None).unwrap();
        let backward = store.hebbian_neighbors("b", None).unwrap();
        assert_eq!(forward.len(), 1);
        assert_eq!(forward[0].source_id, "a");
        assert_eq!(forward[0].target_id, "b");
        assert_eq!(forward[0].strength, 1.0);
        assert_eq!(forward[0].coactivation_count, 1);
        assert_eq!(backward[0].target_id, "a");

        for _ in 0..20 {
            store.strengthen_link("a", "b", 10.0).unwrap();
        }
        let capped = store.hebbian_neighbors("a", None).unwrap();
        assert_eq!(capped[0].strength, 10.0);
        assert_eq!(capped[0].coactivation_count, 21);
        assert_eq!(store.hebbian_link_count().unwrap(), 2);
    }

    #[test]
    fn test_hebbian_neighbors_sorted_and_limited() {
        let store = store();
        store.strengthen_link("hub", "weak", 10.0).unwrap();
        for _ in 0..3 {
            store.strengthen_link("hub", "strong", 10.0).unwrap();
        }

        let all = store.hebbian_neighbors("hub", None).unwrap();
        assert_eq!(all[0].target_id, "strong");
        assert_eq!(all.len(), 2);

        let top = store.hebbian_neighbors("hub", Some(1)).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].target_id, "strong");
    }

    #[test]
    fn test_delete_cascades() {
        let store = store();
        let mut kept = entry("kept");
        let doomed = entry("doomed");
        store.add(&doomed).unwrap();
        kept.contradicts = Some(doomed.id.clone());
        store.add(&kept).unwrap();

        store.record_access(&doomed.id, Utc::now()).unwrap();
        store.add_graph_link(&doomed.id, "ghost", "").unwrap();
        store.strengthen_link(&doomed.id, &kept.id, 10.0).unwrap();

        assert!(store.delete(&doomed.id).unwrap());
        assert!(store.get(&doomed.id).unwrap().is_none());
        assert!(store.access_times(&doomed.id).unwrap().is_empty());
        assert!(store.graph_links_for(&doomed.id).unwrap().is_empty());
        assert!(store.hebbian_neighbors(&kept.id, None).unwrap().is_empty());

        // back-reference nulled on the surviving entry
        let kept_reloaded = store.get(&kept.id).unwrap().unwrap();
        assert!(kept_reloaded.contradicts.is_none());

        assert!(!store.delete(&doomed.id).unwrap());
    }

    #[test]
    fn test_export_and_reopen_equivalent() {
        let dir = tempfile::tempdir().unwrap();
        let source_path = dir.path().join("source.db");
        let export_path = dir.path().join("export.db");

        let store = SqliteStore::open(&source_path).unwrap();
        let e = entry("exported knowledge");
        store.add(&e).unwrap();
        store.record_access(&e.id, Utc::now()).unwrap();
        store.export(&export_path).unwrap();

        let reopened = SqliteStore::open(&export_path).unwrap();
        let loaded = reopened.get(&e.id).unwrap().unwrap();
        assert_eq!(loaded.content, e.content);
        assert_eq!(reopened.access_times(&e.id).unwrap().len(), 1);
        assert_eq!(
            reopened.search_fts("exported", 10).unwrap().len(),
            1
        );
    }
}
