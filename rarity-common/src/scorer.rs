//! Rarity scoring
//!
//! Each trait entry scores `1 / (count / total_records)`: the inverse of its
//! value's relative frequency in the collection. The entry keeps that score
//! rounded to hundredths for display, while the record total sums the
//! unrounded scores so ranking is not skewed by rounding.
//!
//! # Example
//! ```
//! use rarity_common::{build_tally, score_all, MetadataRecord};
//!
//! let records = vec![
//!     MetadataRecord::from_pairs([("Background", "Red")]),
//!     MetadataRecord::from_pairs([("Background", "Red")]),
//!     MetadataRecord::from_pairs([("Background", "Blue")]),
//! ];
//! let tally = build_tally(&records);
//! let scored = score_all(&records, &tally).unwrap();
//!
//! assert_eq!(scored[2].record.attributes[0].rarity_score, Some(3.0));
//! assert_eq!(scored[0].record.attributes[0].rarity_score, Some(1.5));
//! ```

use crate::metadata::MetadataRecord;
use crate::tally::Tally;
use crate::{Error, Result};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, info};

/// A record annotated with per-entry rarity and its total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    pub record: MetadataRecord,
    /// Sum of the unrounded entry scores
    pub total_rarity: f64,
}

/// Position of a record in the rarity ranking
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedItem {
    /// 1 = rarest
    pub rank: usize,
    /// Index of the record in the scored input
    pub index: usize,
    pub total_rarity: f64,
}

/// Round to two decimal places, halves away from zero
pub fn round_to_hundredth(num: f64) -> f64 {
    (100.0 * num).round() / 100.0
}

/// Annotate `record` in place and return its total rarity.
///
/// Fails with [`Error::MissingTally`] when any entry is absent from `tally`.
/// Entries scored before the failing one keep their new scores.
pub fn score_record_in_place(
    record: &mut MetadataRecord,
    tally: &Tally,
    total_records: usize,
) -> Result<f64> {
    let total = total_records as f64;
    let mut total_rarity = 0.0;

    for entry in record.attributes.iter_mut() {
        let count = tally
            .count(&entry.trait_type, &entry.value)
            .ok_or_else(|| Error::MissingTally {
                trait_type: entry.trait_type.clone(),
                value: entry.value.clone(),
            })?;

        let rarity = 1.0 / (count as f64 / total);
        entry.rarity_score = Some(round_to_hundredth(rarity));
        total_rarity += rarity;
    }

    Ok(total_rarity)
}

/// Score one record against the tally, returning an annotated copy
pub fn score_record(
    record: &MetadataRecord,
    tally: &Tally,
    total_records: usize,
) -> Result<ScoredRecord> {
    let mut record = record.clone();
    let total_rarity = score_record_in_place(&mut record, tally, total_records)?;
    Ok(ScoredRecord {
        record,
        total_rarity,
    })
}

/// Score every record of a collection.
///
/// The collection size used in the formula is `records.len()`.
pub fn score_all(records: &[MetadataRecord], tally: &Tally) -> Result<Vec<ScoredRecord>> {
    let total_records = records.len();

    let scored = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let scored = score_record(record, tally, total_records)?;
            debug!(
                index,
                traits = record.len(),
                total_rarity = scored.total_rarity,
                "Record scored"
            );
            Ok(scored)
        })
        .collect::<Result<Vec<_>>>()?;

    info!(records = total_records, "Rarity scoring complete");
    Ok(scored)
}

/// Order scored records from rarest to most common.
///
/// Equal totals keep their input order.
pub fn rank(scored: &[ScoredRecord]) -> Vec<RankedItem> {
    let mut order: Vec<usize> = (0..scored.len()).collect();
    order.sort_by(|&a, &b| {
        scored[b]
            .total_rarity
            .partial_cmp(&scored[a].total_rarity)
            .unwrap_or(Ordering::Equal)
    });

    order
        .into_iter()
        .enumerate()
        .map(|(position, index)| RankedItem {
            rank: position + 1,
            index,
            total_rarity: scored[index].total_rarity,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tally::build_tally;

    fn record(pairs: &[(&str, &str)]) -> MetadataRecord {
        MetadataRecord::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_round_to_hundredth() {
        assert_eq!(round_to_hundredth(1.0), 1.0);
        assert_eq!(round_to_hundredth(3.333_333), 3.33);
        assert_eq!(round_to_hundredth(1.666_666), 1.67);
        assert_eq!(round_to_hundredth(0.125), 0.13);
        assert_eq!(round_to_hundredth(2.5), 2.5);
    }

    #[test]
    fn test_score_formula() {
        // N=10: value seen 5 times scores 2.0, seen once scores 10.0
        let mut records: Vec<MetadataRecord> =
            (0..5).map(|_| record(&[("Background", "Red")])).collect();
        records.push(record(&[("Background", "Gold")]));
        records.extend((0..4).map(|_| record(&[("Background", "Blue")])));

        let tally = build_tally(&records);
        let scored = score_all(&records, &tally).unwrap();

        assert_eq!(scored[0].record.attributes[0].rarity_score, Some(2.0));
        assert_eq!(scored[5].record.attributes[0].rarity_score, Some(10.0));
        assert_eq!(scored[6].record.attributes[0].rarity_score, Some(2.5));
    }

    #[test]
    fn test_total_uses_unrounded_scores() {
        // N=7, counts of 3: each entry is 7/3 = 2.333.., displayed as 2.33
        let mut records = Vec::new();
        for _ in 0..3 {
            records.push(record(&[("A", "x"), ("B", "x"), ("C", "x")]));
        }
        for _ in 0..4 {
            records.push(record(&[("A", "y"), ("B", "y"), ("C", "y")]));
        }

        let tally = build_tally(&records);
        let scored = score_all(&records, &tally).unwrap();
        let first = &scored[0];

        let unrounded = 3.0 * (1.0 / (3.0 / 7.0));
        let rounded_sum: f64 = first
            .record
            .attributes
            .iter()
            .map(|e| e.rarity_score.unwrap())
            .sum();

        assert_eq!(first.total_rarity, unrounded);
        assert_eq!(first.record.attributes[0].rarity_score, Some(2.33));
        assert!((rounded_sum - 6.99).abs() < 1e-9);
        assert!((first.total_rarity - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_record_leaves_input_untouched() {
        let records = vec![record(&[("Background", "Red")])];
        let tally = build_tally(&records);

        let scored = score_record(&records[0], &tally, 1).unwrap();

        assert_eq!(records[0].attributes[0].rarity_score, None);
        assert_eq!(scored.record.attributes[0].rarity_score, Some(1.0));
        assert_eq!(scored.total_rarity, 1.0);
    }

    #[test]
    fn test_in_place_rescoring_is_idempotent() {
        let mut records = vec![
            record(&[("Background", "Red"), ("Eyes", "Laser")]),
            record(&[("Background", "Blue"), ("Eyes", "Laser")]),
            record(&[("Background", "Red"), ("Eyes", "Wide")]),
        ];
        let tally = build_tally(&records);

        let first: Vec<f64> = records
            .iter_mut()
            .map(|r| score_record_in_place(r, &tally, 3).unwrap())
            .collect();
        let snapshot = records.clone();
        let second: Vec<f64> = records
            .iter_mut()
            .map(|r| score_record_in_place(r, &tally, 3).unwrap())
            .collect();

        assert_eq!(first, second);
        assert_eq!(records, snapshot);
    }

    #[test]
    fn test_missing_tally_fails_fast() {
        let tally = build_tally(&[record(&[("Background", "Red")])]);
        let stranger = record(&[("Background", "Purple")]);

        let err = score_record(&stranger, &tally, 1).unwrap_err();
        match err {
            Error::MissingTally { trait_type, value } => {
                assert_eq!(trait_type, "Background");
                assert_eq!(value, "Purple");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_score_all_propagates_missing_tally() {
        let tally = build_tally(&[record(&[("Background", "Red")])]);
        let records = vec![record(&[("Background", "Red")]), record(&[("Hat", "Cap")])];

        assert!(matches!(
            score_all(&records, &tally),
            Err(Error::MissingTally { .. })
        ));
    }

    #[test]
    fn test_empty_record_scores_zero() {
        let records = vec![record(&[]), record(&[("Background", "Red")])];
        let tally = build_tally(&records);
        let scored = score_all(&records, &tally).unwrap();

        assert_eq!(scored[0].total_rarity, 0.0);
        assert!(scored[0].record.is_empty());
        assert_eq!(scored[1].total_rarity, 2.0);
    }

    #[test]
    fn test_rank_orders_rarest_first() {
        let records = vec![
            record(&[("Background", "Red")]),
            record(&[("Background", "Gold")]),
            record(&[("Background", "Red")]),
            record(&[("Background", "Blue")]),
        ];
        let tally = build_tally(&records);
        let scored = score_all(&records, &tally).unwrap();

        let ranking = rank(&scored);
        let order: Vec<usize> = ranking.iter().map(|r| r.index).collect();
        let ranks: Vec<usize> = ranking.iter().map(|r| r.rank).collect();

        // Gold and Blue tie at 4.0 and keep input order; Red pair ties at 2.0
        assert_eq!(order, vec![1, 3, 0, 2]);
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        assert_eq!(ranking[0].total_rarity, 4.0);
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank(&[]).is_empty());
    }
}
