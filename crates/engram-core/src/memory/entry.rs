//! Memory Entry - The fundamental unit of memory
//!
//! Each entry represents one stored memory with:
//! - Content and host-supplied context tags
//! - Dual-trace strength state (Memory Chain Model)
//! - Access history metadata for ACT-R activation
//! - Layer placement and contradiction edges

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// MEMORY TYPES
// ============================================================================

/// Types of memories
///
/// The type controls the default decay rate (how fast the memory fades
/// without rehearsal) and the default content reliability.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemoryType {
    /// A discrete fact ("the service uses Postgres")
    #[default]
    Factual,
    /// An event or experience ("on Feb 2 we shipped ten features")
    Episodic,
    /// Knowledge about people and preferences
    Relational,
    /// Emotionally significant moments
    Emotional,
    /// How-to knowledge and procedures
    Procedural,
    /// Subjective judgments
    Opinion,
}

impl MemoryType {
    /// All memory types, for iteration in stats and tests
    pub const ALL: [MemoryType; 6] = [
        MemoryType::Factual,
        MemoryType::Episodic,
        MemoryType::Relational,
        MemoryType::Emotional,
        MemoryType::Procedural,
        MemoryType::Opinion,
    ];

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryType::Factual => "factual",
            MemoryType::Episodic => "episodic",
            MemoryType::Relational => "relational",
            MemoryType::Emotional => "emotional",
            MemoryType::Procedural => "procedural",
            MemoryType::Opinion => "opinion",
        }
    }

    /// Default decay rate per day (the μ parameter of the forgetting model).
    /// Lower = decays slower = lasts longer.
    pub fn base_decay_rate(&self) -> f64 {
        match self {
            MemoryType::Factual => 0.03,
            // Episodes fade fast
            MemoryType::Episodic => 0.10,
            // People knowledge is durable
            MemoryType::Relational => 0.02,
            MemoryType::Emotional => 0.01,
            MemoryType::Procedural => 0.01,
            // Opinions evolve
            MemoryType::Opinion => 0.05,
        }
    }

    /// Default importance when the host does not supply one
    pub fn default_importance(&self) -> f64 {
        match self {
            MemoryType::Factual => 0.3,
            MemoryType::Episodic => 0.4,
            MemoryType::Relational => 0.6,
            MemoryType::Emotional => 0.9,
            MemoryType::Procedural => 0.5,
            MemoryType::Opinion => 0.3,
        }
    }
}

impl std::fmt::Display for MemoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MemoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "factual" => Ok(MemoryType::Factual),
            "episodic" => Ok(MemoryType::Episodic),
            "relational" => Ok(MemoryType::Relational),
            "emotional" => Ok(MemoryType::Emotional),
            "procedural" => Ok(MemoryType::Procedural),
            "opinion" => Ok(MemoryType::Opinion),
            _ => Err(format!("Unknown memory type: {}", s)),
        }
    }
}

// ============================================================================
// MEMORY LAYERS
// ============================================================================

/// Coarse lifecycle state of a memory.
///
/// New entries begin in the working layer, are promoted to core once
/// consolidated, and sink to archive when both traces fade. Tier 1
/// (host-level identity) is reserved for the host process and has no
/// representation here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemoryLayer {
    /// L2 - consolidated, always-loaded knowledge
    Core,
    /// L3 - recent entries under active consolidation
    #[default]
    Working,
    /// L4 - dormant but retained; excluded from default recall
    Archive,
}

impl MemoryLayer {
    /// All layers, for iteration in stats
    pub const ALL: [MemoryLayer; 3] = [
        MemoryLayer::Core,
        MemoryLayer::Working,
        MemoryLayer::Archive,
    ];

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryLayer::Core => "core",
            MemoryLayer::Working => "working",
            MemoryLayer::Archive => "archive",
        }
    }
}

impl std::fmt::Display for MemoryLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MemoryLayer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "core" => Ok(MemoryLayer::Core),
            "working" => Ok(MemoryLayer::Working),
            "archive" => Ok(MemoryLayer::Archive),
            _ => Err(format!("Unknown memory layer: {}", s)),
        }
    }
}

// ============================================================================
// MEMORY ENTRY
// ============================================================================

/// A single memory with full metadata for the cognitive models
///
/// Carries the coupled dual-trace state of the Memory Chain Model
/// (Murre & Chessa 2011): `working_strength` is the fast-decaying
/// hippocampal trace, `core_strength` the slowly-built neocortical one.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryEntry {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// The memory content (natural language)
    pub content: String,
    /// Type of memory (factual, episodic, ...)
    pub memory_type: MemoryType,
    /// Current lifecycle layer
    pub layer: MemoryLayer,
    /// Importance in [0,1]; modulates consolidation rate and reward ceilings
    pub importance: f64,
    /// Fast-decaying trace, seeded at 1.0 on add
    pub working_strength: f64,
    /// Slow trace, grows from the working trace during consolidation
    pub core_strength: f64,
    /// Cached count of access-log rows for this entry
    pub access_count: i64,
    /// Times this memory has been stepped or replayed by consolidation
    pub consolidation_count: i64,
    /// When the entry was created
    pub created_at: DateTime<Utc>,
    /// When the entry was last accessed
    pub last_accessed: DateTime<Utc>,
    /// When the entry was last touched by a consolidation cycle
    pub last_consolidated: Option<DateTime<Utc>>,
    /// Pinned entries are exempt from decay, archival, suppression, downscaling
    pub pinned: bool,
    /// Id of a memory this entry contradicts
    pub contradicts: Option<String>,
    /// Id of a memory that contradicts this entry
    pub contradicted_by: Option<String>,
    /// Host-supplied tags, opaque to the engine
    pub context: Vec<String>,
}

impl MemoryEntry {
    /// Create a fresh working-layer entry with a strong hippocampal trace
    pub fn new(content: impl Into<String>, memory_type: MemoryType) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            memory_type,
            layer: MemoryLayer::Working,
            importance: memory_type.default_importance(),
            working_strength: 1.0,
            core_strength: 0.0,
            access_count: 0,
            consolidation_count: 0,
            created_at: now,
            last_accessed: now,
            last_consolidated: None,
            pinned: false,
            contradicts: None,
            contradicted_by: None,
            context: Vec::new(),
        }
    }

    /// Sum of both traces
    pub fn total_strength(&self) -> f64 {
        self.working_strength + self.core_strength
    }

    /// Days since creation, at the given instant
    pub fn age_days(&self, now: DateTime<Utc>) -> f64 {
        (now - self.created_at).num_milliseconds() as f64 / 86_400_000.0
    }

    /// The later of last access and creation, the reference point for
    /// retrievability decay
    pub fn last_access_or_created(&self) -> DateTime<Utc> {
        self.last_accessed.max(self.created_at)
    }
}

// ============================================================================
// INPUT TYPES
// ============================================================================

/// Input for storing a new memory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddInput {
    /// The content to memorize (must be non-empty)
    pub content: String,
    /// Type of memory
    #[serde(default)]
    pub memory_type: MemoryType,
    /// Importance in [0,1]; None picks the per-type default
    #[serde(default)]
    pub importance: Option<f64>,
    /// Host-supplied context tags
    #[serde(default)]
    pub context: Vec<String>,
    /// Pin the entry on creation
    #[serde(default)]
    pub pinned: bool,
    /// Id of an existing memory this one contradicts
    #[serde(default)]
    pub contradicts: Option<String>,
    /// Entity occurrences to record in the graph, as (node, relation) pairs
    #[serde(default)]
    pub entities: Vec<(String, String)>,
}

impl AddInput {
    /// Plain content with all other fields defaulted
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            memory_type: MemoryType::default(),
            importance: None,
            context: Vec::new(),
            pinned: false,
            contradicts: None,
            entities: Vec::new(),
        }
    }

    /// Set the memory type
    pub fn with_type(mut self, memory_type: MemoryType) -> Self {
        self.memory_type = memory_type;
        self
    }

    /// Set an explicit importance
    pub fn with_importance(mut self, importance: f64) -> Self {
        self.importance = Some(importance);
        self
    }
}

/// Options for recalling memories
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct RecallOptions {
    /// Maximum results to return
    pub limit: usize,
    /// Minimum combined confidence (0-1)
    pub min_confidence: f64,
    /// Expand the candidate set via Hebbian links and the entity graph
    pub graph_expand: bool,
    /// Include archived entries
    pub include_archive: bool,
    /// Include entries that have been contradicted
    pub include_contradicted: bool,
    /// Extra context keywords for spreading activation; defaults to the
    /// query's own tokens when absent
    pub context_keywords: Option<Vec<String>>,
    /// Restrict results to these memory types
    pub types: Option<Vec<MemoryType>>,
}

impl Default for RecallOptions {
    fn default() -> Self {
        Self {
            limit: 5,
            min_confidence: 0.0,
            graph_expand: true,
            include_archive: false,
            include_contradicted: false,
            context_keywords: None,
            types: None,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_memory_type_roundtrip() {
        for memory_type in MemoryType::ALL {
            assert_eq!(
                MemoryType::from_str(memory_type.as_str()).unwrap(),
                memory_type
            );
        }
        assert!(MemoryType::from_str("vibes").is_err());
    }

    #[test]
    fn test_layer_roundtrip() {
        for layer in MemoryLayer::ALL {
            assert_eq!(MemoryLayer::from_str(layer.as_str()).unwrap(), layer);
        }
    }

    #[test]
    fn test_new_entry_defaults() {
        let entry = MemoryEntry::new("the cache is write-through", MemoryType::Factual);
        assert_eq!(entry.layer, MemoryLayer::Working);
        assert_eq!(entry.working_strength, 1.0);
        assert_eq!(entry.core_strength, 0.0);
        assert_eq!(entry.importance, 0.3);
        assert!(!entry.pinned);
        assert!(entry.contradicted_by.is_none());
    }

    #[test]
    fn test_type_defaults_are_in_range() {
        for memory_type in MemoryType::ALL {
            let imp = memory_type.default_importance();
            assert!((0.0..=1.0).contains(&imp));
            assert!(memory_type.base_decay_rate() > 0.0);
        }
    }

    #[test]
    fn test_recall_options_deny_unknown_fields() {
        let json = r#"{"limit": 3, "graphExpand": false}"#;
        let opts: RecallOptions = serde_json::from_str(json).unwrap();
        assert_eq!(opts.limit, 3);
        assert!(!opts.graph_expand);

        let json_bad = r#"{"limit": 3, "graphExpand": false, "surprise": 1}"#;
        assert!(serde_json::from_str::<RecallOptions>(json_bad).is_err());
    }
}
