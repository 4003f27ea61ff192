//! Cross-dataset merge engine
//!
//! Combines the device's existing ledger with an imported envelope into
//! one consistent set of records without silent loss or duplication.

pub mod dedup;
pub mod envelope;
pub mod orchestrator;

pub use dedup::{find_duplicates, is_duplicate, similarity, DuplicateCandidate};
pub use envelope::{ExportData, ExportEnvelope, EXPORT_VERSION};
pub use orchestrator::{
    ConflictResolution, ConflictResolver, ImportOptions, MergeOrchestrator, MergeResult,
};
