//! `docrecon-engine`: document-name reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded records, returns the partition of
//! both sides' names into exact, fuzzy-matched, and unmatched sets.
//! The CSV loader takes file contents, never paths.

pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod load;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod score;
pub mod side;
pub mod summary;
pub mod tokenize;

pub use config::ReconConfig;
pub use engine::{run, run_with_cancel};
pub use error::ReconError;
pub use load::load_csv_records;
pub use model::{MatchMethod, MatchResult, Partition, ReconInput, ReconResult, Side};
