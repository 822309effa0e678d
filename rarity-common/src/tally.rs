//! Trait frequency tally
//!
//! Counts how often every `(trait_type, value)` pair appears across a
//! collection, how many entries carry each trait type, and how many items
//! carry a given number of traits (`TraitCount`).
//!
//! A tally is built once from a snapshot of the collection and only read
//! afterwards. Shard tallies combine with [`Tally::merge`], which sums counts
//! key by key, so merge order never changes the result.

use crate::metadata::MetadataRecord;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Counts for a single trait type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitTally {
    /// Number of entries carrying this trait type, over all values
    pub occurrences: u64,
    /// Occurrences per value
    pub values: BTreeMap<String, u64>,
}

/// Frequency table for a whole collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    /// Number of traits on an item -> number of items with that many traits
    #[serde(rename = "TraitCount")]
    trait_count: BTreeMap<usize, u64>,
    traits: BTreeMap<String, TraitTally>,
}

impl Tally {
    /// Occurrences of `value` under `trait_type`, if it was ever seen
    pub fn count(&self, trait_type: &str, value: &str) -> Option<u64> {
        self.traits
            .get(trait_type)
            .and_then(|t| t.values.get(value))
            .copied()
    }

    /// Entries carrying `trait_type`, summed over all its values
    pub fn trait_occurrences(&self, trait_type: &str) -> Option<u64> {
        self.traits.get(trait_type).map(|t| t.occurrences)
    }

    /// Per-value counts for one trait type
    pub fn values(&self, trait_type: &str) -> Option<&BTreeMap<String, u64>> {
        self.traits.get(trait_type).map(|t| &t.values)
    }

    pub fn trait_types(&self) -> impl Iterator<Item = &str> {
        self.traits.keys().map(String::as_str)
    }

    /// Distribution of trait counts per item
    pub fn trait_count(&self) -> &BTreeMap<usize, u64> {
        &self.trait_count
    }

    /// Number of records the tally was built from
    pub fn total_records(&self) -> u64 {
        self.trait_count.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.trait_count.is_empty()
    }

    /// Combine two tallies by summing every count
    pub fn merge(mut self, other: Tally) -> Tally {
        for (n, items) in other.trait_count {
            *self.trait_count.entry(n).or_insert(0) += items;
        }
        for (trait_type, theirs) in other.traits {
            let ours = self.traits.entry(trait_type).or_default();
            ours.occurrences += theirs.occurrences;
            for (value, count) in theirs.values {
                *ours.values.entry(value).or_insert(0) += count;
            }
        }
        self
    }

    fn add_record(&mut self, record: &MetadataRecord) {
        let (traits, values) = record.traits_and_values();

        *self.trait_count.entry(traits.len()).or_insert(0) += 1;

        for (trait_type, value) in traits.into_iter().zip(values) {
            let entry = self.traits.entry(trait_type.to_string()).or_default();
            entry.occurrences += 1;
            *entry.values.entry(value.to_string()).or_insert(0) += 1;
        }
    }
}

/// Build the tally for a collection
pub fn build_tally<'a, I>(records: I) -> Tally
where
    I: IntoIterator<Item = &'a MetadataRecord>,
{
    let mut tally = Tally::default();
    for record in records {
        tally.add_record(record);
    }

    debug!(
        records = tally.total_records(),
        trait_types = tally.traits.len(),
        "Tally built"
    );

    tally
}

/// Build the tally from shards of `shard_size` records on the rayon pool.
///
/// Produces the same tally as [`build_tally`].
pub fn build_tally_parallel(records: &[MetadataRecord], shard_size: usize) -> Tally {
    records
        .par_chunks(shard_size.max(1))
        .map(|shard| build_tally(shard))
        .reduce(Tally::default, Tally::merge)
}
