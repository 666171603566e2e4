//! Memory module - Core types and data structures
//!
//! Implements the cognitive data model:
//! - Memory entries with dual-trace strength state (Murre & Chessa 2011)
//! - Typed memories with per-type decay and reliability defaults
//! - Layered lifecycle (core / working / archive)

mod entry;

pub use entry::{AddInput, MemoryEntry, MemoryLayer, MemoryType, RecallOptions};

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::confidence::Confidence;

// ============================================================================
// RECALL RESULTS
// ============================================================================

/// One ranked recall result with its activation and confidence decoration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecallResult {
    /// The recalled memory
    pub entry: MemoryEntry,
    /// Retrieval activation score used for ranking
    pub activation: f64,
    /// Effective strength at recall time
    pub strength: f64,
    /// Two-dimensional confidence (reliability, salience) plus label
    pub confidence: Confidence,
}

// ============================================================================
// STATISTICS
// ============================================================================

/// Per-layer aggregate strengths
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerStats {
    /// Entries in the layer
    pub count: i64,
    /// Mean working strength
    pub avg_working: f64,
    /// Mean core strength
    pub avg_core: f64,
    /// Mean importance
    pub avg_importance: f64,
}

/// Per-type aggregate strengths
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStats {
    /// Entries of this type
    pub count: i64,
    /// Mean effective strength at the stats instant
    pub avg_strength: f64,
    /// Mean importance
    pub avg_importance: f64,
}

/// Snapshot of the whole memory system
#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    /// Total entries across all layers
    pub total_memories: i64,
    /// Aggregates keyed by layer name
    pub by_layer: HashMap<String, LayerStats>,
    /// Aggregates keyed by type name
    pub by_type: HashMap<String, TypeStats>,
    /// Pinned entries
    pub pinned: i64,
    /// Directed Hebbian link rows
    pub hebbian_links: i64,
    /// Metric names currently tracked by the anomaly baseline tracker
    pub anomaly_metrics: Vec<String>,
    /// Timestamp of the oldest memory
    pub oldest_memory: Option<DateTime<Utc>>,
    /// Timestamp of the newest memory
    pub newest_memory: Option<DateTime<Utc>>,
}

/// Result of one consolidation cycle
#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidationStats {
    /// Working-layer entries stepped through the Memory-Chain update
    pub stepped: i64,
    /// Archived entries reactivated by interleaved replay
    pub replayed: i64,
    /// Core-layer entries decayed
    pub core_decayed: i64,
    /// Entries promoted working -> core
    pub promoted: i64,
    /// Entries demoted to archive
    pub archived: i64,
    /// Processing duration in milliseconds
    pub duration_ms: i64,
}

/// Result of a synaptic downscaling pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownscaleStats {
    /// Entries scaled (pinned entries are skipped)
    pub n_scaled: i64,
    /// Mean total strength before scaling
    pub avg_before: f64,
    /// Mean total strength after scaling
    pub avg_after: f64,
}
