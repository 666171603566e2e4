//! # Engram Core
//!
//! Embeddable memory engine for autonomous agents. Stores text memories
//! with cognitive metadata and ranks retrievals by a biologically-inspired
//! activation score instead of embedding cosine similarity:
//!
//! - **ACT-R activation** (Anderson): recency x frequency power law, plus
//!   spreading activation from context and importance modulation
//! - **Memory Chain Model** (Murre & Chessa 2011): coupled working/core
//!   traces with consolidation transfer and interleaved replay
//! - **Ebbinghaus forgetting**: retrievability decay with practice-grown
//!   stability, pruning to an archive layer, retrieval-induced suppression
//! - **Hebbian association**: co-activation links strengthen on every
//!   recall and expand future candidate sets
//! - **Two-dimensional confidence**: content reliability (stable) and
//!   retrieval salience (decaying), never conflated
//! - **Reward modulation**: natural-language feedback strengthens or
//!   suppresses recently accessed memories with an eligibility-trace
//!   discount
//! - **Session working memory**: a bounded, decaying per-session set that
//!   gates full recalls on continuous-topic conversations
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use engram_core::{AddInput, Engram, MemoryType, RecallOptions};
//!
//! let engram = Engram::open("./agent.db")?;
//!
//! engram.add(
//!     AddInput::new("the user prefers espresso over filter coffee")
//!         .with_type(MemoryType::Relational)
//!         .with_importance(0.7),
//! )?;
//!
//! for result in engram.recall("what coffee does the user like?", &RecallOptions::default())? {
//!     println!("[{}] {}", result.confidence.label, result.entry.content);
//! }
//!
//! engram.consolidate(1.0)?;   // one "day" of sleep
//! engram.reward("great, thanks!")?;
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod activation;
pub mod anomaly;
pub mod config;
pub mod confidence;
pub mod consolidation;
mod engram;
pub mod error;
pub mod forgetting;
pub mod memory;
pub mod reward;
pub mod search;
pub mod session;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

pub use crate::engram::Engram;

pub use config::EngramConfig;
pub use error::{EngramError, Result};

pub use memory::{
    AddInput, ConsolidationStats, DownscaleStats, LayerStats, MemoryEntry, MemoryLayer,
    MemoryStats, MemoryType, RecallOptions, RecallResult, TypeStats,
};

pub use activation::{base_level_activation, retrieval_activation, spreading_activation};
pub use confidence::{
    base_reliability, confidence, content_reliability, retrieval_salience, Confidence,
    ConfidenceLabel,
};
pub use forgetting::{
    compute_stability, effective_strength, retrievability, should_forget,
};
pub use reward::{detect_feedback, Polarity};

pub use anomaly::{Baseline, BaselineTracker};
pub use session::{GateDecision, GateReason, SessionRecallResult, SessionWorkingMemory};

pub use search::{sanitize_fts_query, SearchEngine};
pub use storage::{
    GraphLink, HebbianLink, SqliteStore, Store, StoreError, StoreResult, MIGRATIONS,
};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        AddInput, Engram, EngramConfig, EngramError, MemoryEntry, MemoryLayer, MemoryStats,
        MemoryType, RecallOptions, RecallResult, Result, SqliteStore, Store,
    };

    pub use crate::{Confidence, ConfidenceLabel, GateReason, Polarity, SessionRecallResult};
}
