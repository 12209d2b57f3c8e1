//! Scorebook-State: Persistence Layer for Scorebook
//!
//! This crate owns all storage I/O for the scorebook: match state as opaque
//! JSON blobs keyed by match id, and user-authored scorecards.
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: record shapes, backend-agnostic storage contracts, and their
//! implementations. Nothing here interprets a match payload.
//!
//! ## Key Components
//!
//! - `MatchStore` / `ScorecardStore`: async storage contracts
//! - `FsMatchStore`: one JSON file per match on local disk
//! - `SurrealHandle`: SurrealDB connection with match and scorecard tables
//! - `fakes`: in-memory implementations for tests

mod error;
pub mod fakes;
pub mod fs_store;
mod handle;
pub mod storage_traits;
pub mod surreal_stores;

pub use error::{StateError, StorageError};
pub use fs_store::FsMatchStore;
pub use handle::{DbConfig, SurrealHandle};
pub use storage_traits::{
    FieldType, FieldValue, MatchBlob, MatchStore, ScorecardField, ScorecardId, ScorecardKind,
    ScorecardRecord, ScorecardStore, ScorecardValue, StorageResult, UserId,
};
pub use surreal_stores::{SurrealMatchStore, SurrealScorecardStore};

/// Result type for scorebook-state handle operations
pub type Result<T> = std::result::Result<T, StateError>;
