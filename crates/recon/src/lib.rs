//! `tbcompare-recon`: trial balance normalization and reconciliation engine.
//!
//! Pure engine crate: receives materialized cell grids, returns canonical rows,
//! snapshots, classified match results and a summary. No file IO.

pub mod aggregate;
pub mod amount;
pub mod config;
pub mod describe;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod rank;
pub mod similarity;
pub mod summary;

pub use config::EngineConfig;
pub use engine::{clean, compare, compare_snapshots, CleanReport, Comparison, ComparisonMeta};
pub use error::ReconError;
pub use normalize::{ColumnLayout, DropStats};
pub use model::{
    CanonicalRow, Cell, ComparisonMode, MatchResult, MatchStatus, RawGrid, Side, Snapshot, Summary,
};
