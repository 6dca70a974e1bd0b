use std::collections::{BTreeSet, HashMap};

/// Inverted index from significant token to the keys of one side containing it.
///
/// Recall-first prefilter: any key sharing at least one token is a candidate.
/// Keys can be retired without rebuilding.
#[derive(Debug, Clone, Default)]
pub struct CandidateIndex {
    postings: HashMap<String, BTreeSet<String>>,
    key_tokens: HashMap<String, BTreeSet<String>>,
}

impl CandidateIndex {
    /// Build from `(key, tokens)` pairs.
    pub fn build<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, BTreeSet<String>)>,
    {
        let mut index = Self::default();
        for (key, tokens) in entries {
            index.insert(key, tokens);
        }
        index
    }

    pub fn insert(&mut self, key: &str, tokens: BTreeSet<String>) {
        for token in &tokens {
            self.postings
                .entry(token.clone())
                .or_default()
                .insert(key.to_string());
        }
        self.key_tokens.insert(key.to_string(), tokens);
    }

    /// Union of the postings of every query token, in ascending key order.
    pub fn lookup(&self, tokens: &BTreeSet<String>) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for token in tokens {
            if let Some(keys) = self.postings.get(token) {
                out.extend(keys.iter().cloned());
            }
        }
        out
    }

    /// Retire `key` from every posting list it appears in.
    pub fn remove(&mut self, key: &str) {
        let Some(tokens) = self.key_tokens.remove(key) else {
            return;
        };
        for token in tokens {
            if let Some(keys) = self.postings.get_mut(&token) {
                keys.remove(key);
                if keys.is_empty() {
                    self.postings.remove(&token);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.key_tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key_tokens.is_empty()
    }
}
