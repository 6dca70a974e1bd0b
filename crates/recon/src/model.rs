use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::side::KeyedSide;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Which of the two inventories a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// A single loaded row. Never mutated after load.
#[derive(Debug, Clone)]
pub struct Record {
    /// Zero-based row position within its side.
    pub position: usize,
    /// Trimmed value of the first non-empty name column.
    pub name: String,
    pub fields: HashMap<String, String>,
}

impl Record {
    pub fn field(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(|v| v.as_str())
    }
}

/// All records of one side, plus the header order for writing them back out.
#[derive(Debug, Clone, Default)]
pub struct SideInput {
    pub headers: Vec<String>,
    /// Header the display name is written back into.
    pub name_column: String,
    pub records: Vec<Record>,
    /// Rows skipped by the loader because their name was empty.
    pub dropped: usize,
}

/// Pre-loaded records for both sides.
#[derive(Debug, Clone, Default)]
pub struct ReconInput {
    pub left: SideInput,
    pub right: SideInput,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Exact,
    Codename,
    TokenFuzzy,
    AuxiliaryXref,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Codename => "codename",
            Self::TokenFuzzy => "token_fuzzy",
            Self::AuxiliaryXref => "auxiliary_xref",
        }
    }
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One committed fuzzy pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub left_key: String,
    pub right_key: String,
    pub left_name: String,
    pub right_name: String,
    pub left_fuzzy: String,
    pub right_fuzzy: String,
    pub score: u8,
    pub method: MatchMethod,
    /// Carried columns from both sides' first record, left side first.
    pub aux_fields: BTreeMap<String, String>,
}

/// Engine output: every exact key of a side lands in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Partition {
    pub both_exact: Vec<String>,
    pub fuzzy_matched: Vec<MatchResult>,
    pub only_left: Vec<String>,
    pub only_right: Vec<String>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub total_left: usize,
    pub total_right: usize,
    pub both_exact: usize,
    pub fuzzy_matched: usize,
    pub only_left: usize,
    pub only_right: usize,
    pub dropped_left: usize,
    pub dropped_right: usize,
    /// Records sharing an exact key with an earlier record.
    pub duplicates_left: usize,
    pub duplicates_right: usize,
    pub method_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub left_label: String,
    pub right_label: String,
    pub threshold: i64,
    pub auxiliary_threshold: i64,
    pub fuzzy: bool,
    pub case_sensitive: bool,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub partition: Partition,
    /// Keyed records, for writers that need the first record behind a key.
    #[serde(skip)]
    pub left: KeyedSide,
    #[serde(skip)]
    pub right: KeyedSide,
}
