use std::collections::BTreeMap;

use crate::model::{Record, SideInput};
use crate::normalize::{extract_codename_with_source, to_exact_key, to_fuzzy_key, CodenameSource};
use crate::tokenize::tokenize;

/// Everything the passes need to know about one exact key.
#[derive(Debug, Clone)]
pub struct KeyedName {
    pub exact_key: String,
    /// Trimmed name of the first record with this key.
    pub display: String,
    pub fuzzy_key: String,
    pub codename: Option<String>,
    pub codename_source: Option<CodenameSource>,
    /// First record (by position) with this key.
    pub record: Record,
    /// How many input records collapsed into this key.
    pub record_count: usize,
}

impl KeyedName {
    pub fn tokens(&self) -> std::collections::BTreeSet<String> {
        tokenize(&self.fuzzy_key)
    }

    /// Codename came from "project ..." or a sibling marker, not a document type.
    pub fn has_marked_codename(&self) -> bool {
        self.codename_source == Some(CodenameSource::Marker)
    }
}

/// One side's records keyed by exact key, in ascending key order.
#[derive(Debug, Clone, Default)]
pub struct KeyedSide {
    pub names: BTreeMap<String, KeyedName>,
}

impl KeyedSide {
    /// Derive exact/fuzzy keys and codenames once per record.
    /// The first record with a given exact key wins.
    pub fn build(input: &SideInput, case_sensitive: bool) -> Self {
        let mut names: BTreeMap<String, KeyedName> = BTreeMap::new();

        for record in &input.records {
            let exact_key = to_exact_key(&record.name, case_sensitive);
            if exact_key.is_empty() {
                continue;
            }
            if let Some(existing) = names.get_mut(&exact_key) {
                existing.record_count += 1;
                continue;
            }
            let fuzzy_key = to_fuzzy_key(&exact_key);
            let (codename, codename_source) = extract_codename_with_source(&exact_key).unzip();
            names.insert(
                exact_key.clone(),
                KeyedName {
                    exact_key,
                    display: record.name.trim().to_string(),
                    fuzzy_key,
                    codename,
                    codename_source,
                    record: record.clone(),
                    record_count: 1,
                },
            );
        }

        Self { names }
    }

    pub fn get(&self, key: &str) -> Option<&KeyedName> {
        self.names.get(key)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.names.keys()
    }

    /// Records that collapsed into an existing key.
    pub fn duplicate_records(&self) -> usize {
        self.names.values().map(|n| n.record_count - 1).sum()
    }
}
