//! Metadata search
//!
//! Field-scoped substring queries over the metadata store, plus set
//! intersection and union for combining results.
//!
//! Matching is case-sensitive and byte-exact. An identifier matches only
//! when its field is present; an empty substring therefore matches every
//! identifier whose field is present. Each query scans every record.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::models::{ImageId, MetadataField};
use crate::services::metadata_store::MetadataStore;

/// Searchable fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchField {
    Prompt,
    Model,
    Seed,
    CfgScale,
    Steps,
    Sampler,
    Date,
}

impl SearchField {
    pub const ALL: [SearchField; 7] = [
        SearchField::Prompt,
        SearchField::Model,
        SearchField::Seed,
        SearchField::CfgScale,
        SearchField::Steps,
        SearchField::Sampler,
        SearchField::Date,
    ];

    /// Metadata field this search reads
    pub fn metadata_field(&self) -> MetadataField {
        match self {
            SearchField::Prompt => MetadataField::Prompt,
            SearchField::Model => MetadataField::Model,
            SearchField::Seed => MetadataField::Seed,
            SearchField::CfgScale => MetadataField::CfgScale,
            SearchField::Steps => MetadataField::Steps,
            SearchField::Sampler => MetadataField::Sampler,
            SearchField::Date => MetadataField::CreatedDate,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SearchField::Prompt => "prompt",
            SearchField::Model => "model",
            SearchField::Seed => "seed",
            SearchField::CfgScale => "cfg_scale",
            SearchField::Steps => "steps",
            SearchField::Sampler => "sampler",
            SearchField::Date => "date",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| format!("Unknown search field: {}", s))
    }
}

/// How several criteria are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combine {
    /// Intersection of all criteria
    #[default]
    All,
    /// Union of all criteria
    Any,
}

/// Substring search over a metadata store
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine<'a> {
    store: &'a MetadataStore,
}

impl<'a> SearchEngine<'a> {
    pub fn new(store: &'a MetadataStore) -> Self {
        Self { store }
    }

    /// Identifiers whose `field` is present and contains `substring`
    pub fn query(&self, field: SearchField, substring: &str) -> HashSet<ImageId> {
        let field = field.metadata_field();
        self.store
            .identifiers()
            .filter(|&id| {
                self.store
                    .field(id, field)
                    .is_some_and(|value| value.contains(substring))
            })
            .collect()
    }

    pub fn prompt(&self, substring: &str) -> HashSet<ImageId> {
        self.query(SearchField::Prompt, substring)
    }

    pub fn model(&self, substring: &str) -> HashSet<ImageId> {
        self.query(SearchField::Model, substring)
    }

    pub fn seed(&self, substring: &str) -> HashSet<ImageId> {
        self.query(SearchField::Seed, substring)
    }

    pub fn cfg_scale(&self, substring: &str) -> HashSet<ImageId> {
        self.query(SearchField::CfgScale, substring)
    }

    pub fn steps(&self, substring: &str) -> HashSet<ImageId> {
        self.query(SearchField::Steps, substring)
    }

    pub fn sampler(&self, substring: &str) -> HashSet<ImageId> {
        self.query(SearchField::Sampler, substring)
    }

    pub fn date(&self, substring: &str) -> HashSet<ImageId> {
        self.query(SearchField::Date, substring)
    }

    /// Intersection; iterates the smaller set
    pub fn and(a: &HashSet<ImageId>, b: &HashSet<ImageId>) -> HashSet<ImageId> {
        let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
        small.iter().filter(|id| large.contains(id)).copied().collect()
    }

    /// Union without duplicates
    pub fn or(a: &HashSet<ImageId>, b: &HashSet<ImageId>) -> HashSet<ImageId> {
        a.union(b).copied().collect()
    }

    /// Run several criteria and combine them
    ///
    /// With no criteria every identifier in the store is returned.
    pub fn query_all(
        &self,
        criteria: &[(SearchField, String)],
        combine: Combine,
    ) -> HashSet<ImageId> {
        let mut results = criteria
            .iter()
            .map(|(field, substring)| self.query(*field, substring));

        let Some(first) = results.next() else {
            return self.store.all_identifiers();
        };

        results.fold(first, |acc, next| match combine {
            Combine::All => Self::and(&acc, &next),
            Combine::Any => Self::or(&acc, &next),
        })
    }

    /// Number of searchable identifiers
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
