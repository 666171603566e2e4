//! Database Migrations
//!
//! Versioned schema definitions for the SQLite backend.

/// Migration definitions, applied in order
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "Initial schema: memories, access log, entity graph, Hebbian links, FTS5",
    up: MIGRATION_V1_UP,
}];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

/// V1: Initial schema
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS memories (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    memory_type TEXT NOT NULL DEFAULT 'factual',
    layer TEXT NOT NULL DEFAULT 'working',
    importance REAL NOT NULL DEFAULT 0.3,

    -- Dual-trace state (Memory Chain Model)
    working_strength REAL NOT NULL DEFAULT 1.0,
    core_strength REAL NOT NULL DEFAULT 0.0,

    -- Counters (access_count caches the access_log rollup)
    access_count INTEGER NOT NULL DEFAULT 0,
    consolidation_count INTEGER NOT NULL DEFAULT 0,

    -- Temporal metadata (RFC3339)
    created_at TEXT NOT NULL,
    last_accessed TEXT NOT NULL,
    last_consolidated TEXT,

    pinned INTEGER NOT NULL DEFAULT 0,

    -- Directed contradiction edge
    contradicts TEXT,
    contradicted_by TEXT,

    -- Host-supplied tags, JSON array
    context TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS idx_memories_layer ON memories(layer);
CREATE INDEX IF NOT EXISTS idx_memories_type ON memories(memory_type);
CREATE INDEX IF NOT EXISTS idx_memories_last_accessed ON memories(last_accessed);

-- Append-only access log: the authoritative practice history
CREATE TABLE IF NOT EXISTS access_log (
    memory_id TEXT NOT NULL,
    accessed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_access_log_memory ON access_log(memory_id);

-- Entity occurrences written by the host at add time
CREATE TABLE IF NOT EXISTS graph_links (
    memory_id TEXT NOT NULL,
    node_id TEXT NOT NULL,
    relation TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_graph_links_memory ON graph_links(memory_id);
CREATE INDEX IF NOT EXISTS idx_graph_links_node ON graph_links(node_id);

-- Directed co-activation edges, written in both directions
CREATE TABLE IF NOT EXISTS hebbian_links (
    source_id TEXT NOT NULL,
    target_id TEXT NOT NULL,
    strength REAL NOT NULL DEFAULT 1.0,
    coactivation_count INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    PRIMARY KEY (source_id, target_id)
);

CREATE INDEX IF NOT EXISTS idx_hebbian_source ON hebbian_links(source_id);

-- FTS5 index over memory content
CREATE VIRTUAL TABLE IF NOT EXISTS memories_fts USING fts5(
    id,
    content,
    content='memories',
    content_rowid='rowid'
);

-- Triggers to keep FTS in sync
CREATE TRIGGER IF NOT EXISTS memories_ai AFTER INSERT ON memories BEGIN
    INSERT INTO memories_fts(rowid, id, content)
    VALUES (NEW.rowid, NEW.id, NEW.content);
END;

CREATE TRIGGER IF NOT EXISTS memories_ad AFTER DELETE ON memories BEGIN
    INSERT INTO memories_fts(memories_fts, rowid, id, content)
    VALUES ('delete', OLD.rowid, OLD.id, OLD.content);
END;

CREATE TRIGGER IF NOT EXISTS memories_au AFTER UPDATE ON memories BEGIN
    INSERT INTO memories_fts(memories_fts, rowid, id, content)
    VALUES ('delete', OLD.rowid, OLD.id, OLD.content);
    INSERT INTO memories_fts(rowid, id, content)
    VALUES (NEW.rowid, NEW.id, NEW.content);
END;

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;
