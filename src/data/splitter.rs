// ============================================================
// Layer 4 — Stratified Train/Test/Dev Splitter
// ============================================================
// Splits the labelled dataset into three disjoint partitions
// while keeping every label's share roughly the same in each:
//
//   all records ──(60/40)──► train
//                      └───► rest ──(50/50)──► test (eval)
//                                       └────► dev
//
// Why stratify?
//   News categories are rarely balanced. A plain random split
//   can leave a small category almost absent from the eval
//   set, and accuracy on that set then says nothing about it.
//   Splitting each label's members separately keeps the label
//   mix of every partition close to the full dataset's.
//
// Per label with n members, the held-out side gets
//   clamp(round(n * test_size), 1, n - 1)
// members, so every label lands on both sides. That needs at
// least 2 members per label at each stage; fewer is a
// StratificationError naming the label.
//
// Members are shuffled per label before allocation, and each
// resulting partition is shuffled again so labels interleave
// instead of arriving in blocks. One seeded StdRng drives all
// of it, so the same seed gives the same split.
//
// Reference: rand crate documentation (SliceRandom, StdRng)
//            Rust Book §8 (Vectors)

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::domain::errors::FinetuneError;
use crate::domain::record::{Partition, PartitionKind, Record};

/// Fraction of all records held out from training.
pub const HOLDOUT_FRACTION: f64 = 0.4;

/// Fraction of the held-out records that become the dev set.
pub const DEV_FRACTION: f64 = 0.5;

/// The three partitions of one dataset.
#[derive(Debug, Clone)]
pub struct SplitDataset {
    pub train: Partition,
    pub test:  Partition,
    pub dev:   Partition,
}

impl SplitDataset {
    pub fn partitions(&self) -> [&Partition; 3] {
        [&self.train, &self.test, &self.dev]
    }
}

/// Performs the two-stage stratified split.
pub struct DatasetSplitter {
    seed: u64,
}

impl DatasetSplitter {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Split `records` 60/20/20 into train/test/dev, stratified by label.
    pub fn split(&self, records: Vec<Record>) -> Result<SplitDataset, FinetuneError> {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let (train, rest) = stratified_split(records, HOLDOUT_FRACTION, "full", &mut rng)?;
        let (test, dev)   = stratified_split(rest, DEV_FRACTION, "held-out", &mut rng)?;

        tracing::info!(
            "Split: {} train, {} test, {} dev",
            train.len(),
            test.len(),
            dev.len()
        );

        Ok(SplitDataset {
            train: Partition::new(PartitionKind::Train, train),
            test:  Partition::new(PartitionKind::Test, test),
            dev:   Partition::new(PartitionKind::Dev, dev),
        })
    }
}

/// Split `records` into (kept, held_out) with `test_size` of every label
/// going to the held-out side.
pub fn stratified_split(
    records:   Vec<Record>,
    test_size: f64,
    stage:     &'static str,
    rng:       &mut StdRng,
) -> Result<(Vec<Record>, Vec<Record>), FinetuneError> {
    // Group by label, keeping first-encounter order of labels so the
    // allocation (and therefore the seeded shuffle) is reproducible
    let mut groups: Vec<(String, Vec<Record>)> = Vec::new();
    for record in records {
        match groups.iter_mut().find(|(label, _)| *label == record.label) {
            Some((_, members)) => members.push(record),
            None => groups.push((record.label.clone(), vec![record])),
        }
    }

    if let Some((label, members)) = groups.iter().find(|(_, m)| m.len() < 2) {
        return Err(FinetuneError::Stratification {
            label: label.clone(),
            count: members.len(),
            stage,
        });
    }

    let mut kept     = Vec::new();
    let mut held_out = Vec::new();

    for (label, mut members) in groups {
        members.shuffle(rng);

        let n       = members.len();
        let n_test  = ((n as f64) * test_size).round() as usize;
        let n_test  = n_test.clamp(1, n - 1);
        let n_keep  = n - n_test;

        tracing::debug!("Label '{}': {} kept, {} held out", label, n_keep, n_test);

        // split_off(k) leaves [0..k) in `members` and returns [k..n)
        let tail = members.split_off(n_keep);
        kept.extend(members);
        held_out.extend(tail);
    }

    kept.shuffle(rng);
    held_out.shuffle(rng);
    Ok((kept, held_out))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    /// 100 "Sport", 50 "Kultur", 30 "Web" articles with unique texts
    fn dataset() -> Vec<Record> {
        let mut records = Vec::new();
        for (label, count) in [("Sport", 100), ("Kultur", 50), ("Web", 30)] {
            for i in 0..count {
                records.push(Record::new(label, format!("{label} article {i}")));
            }
        }
        records
    }

    fn share(records: &[Record], label: &str) -> f64 {
        let n = records.iter().filter(|r| r.label == label).count();
        n as f64 / records.len() as f64
    }

    #[test]
    fn test_partitions_are_disjoint_and_complete() {
        let all   = dataset();
        let split = DatasetSplitter::new(0).split(all.clone()).unwrap();

        let mut seen = HashSet::new();
        for p in split.partitions() {
            for r in &p.records {
                // Texts are unique, so a repeat means a row was duplicated
                assert!(seen.insert(r.text.clone()), "duplicate row {}", r.text);
            }
        }
        let expected: HashSet<String> = all.into_iter().map(|r| r.text).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_split_sizes_follow_ratios() {
        let split = DatasetSplitter::new(0).split(dataset()).unwrap();
        // 100*0.6 + 50*0.6 + 30*0.6 = 108
        assert_eq!(split.train.len(), 108);
        assert_eq!(split.test.len(), 36);
        assert_eq!(split.dev.len(), 36);
    }

    #[test]
    fn test_label_shares_are_preserved() {
        let all   = dataset();
        let split = DatasetSplitter::new(7).split(all.clone()).unwrap();

        for label in ["Sport", "Kultur", "Web"] {
            let expected = share(&all, label);
            for p in split.partitions() {
                let got = share(&p.records, label);
                assert!(
                    (got - expected).abs() < 0.05,
                    "{label} in {:?}: {got:.3} vs {expected:.3}",
                    p.kind
                );
            }
        }
    }

    #[test]
    fn test_every_label_reaches_every_partition() {
        let mut records = dataset();
        // 4 is the smallest count that survives both stages
        for i in 0..4 {
            records.push(Record::new("Etat", format!("Etat {i}")));
        }
        let split = DatasetSplitter::new(3).split(records).unwrap();
        for p in split.partitions() {
            assert!(p.labels().any(|l| l == "Etat"), "Etat missing from {:?}", p.kind);
        }
    }

    #[test]
    fn test_singleton_label_fails() {
        let mut records = dataset();
        records.push(Record::new("Inland", "einsam"));
        let err = DatasetSplitter::new(0).split(records).unwrap_err();
        match err {
            FinetuneError::Stratification { label, count, stage } => {
                assert_eq!(label, "Inland");
                assert_eq!(count, 1);
                assert_eq!(stage, "full");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_label_too_small_for_second_stage_fails() {
        let mut records = dataset();
        // round(3 * 0.4) = 1 held out, which cannot be split again
        for i in 0..3 {
            records.push(Record::new("Inland", format!("Inland {i}")));
        }
        let err = DatasetSplitter::new(0).split(records).unwrap_err();
        assert!(matches!(
            err,
            FinetuneError::Stratification { stage: "held-out", .. }
        ));
    }

    #[test]
    fn test_same_seed_same_split() {
        let a = DatasetSplitter::new(42).split(dataset()).unwrap();
        let b = DatasetSplitter::new(42).split(dataset()).unwrap();
        assert_eq!(a.train.records, b.train.records);
        assert_eq!(a.dev.records, b.dev.records);
    }

    #[test]
    fn test_label_counts_per_partition() {
        let split = DatasetSplitter::new(1).split(dataset()).unwrap();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for l in split.test.labels() {
            *counts.entry(l).or_insert(0) += 1;
        }
        // Sport: 40 held out → 20/20, Kultur: 20 → 10/10, Web: 12 → 6/6
        assert_eq!(counts["Sport"], 20);
        assert_eq!(counts["Kultur"], 10);
        assert_eq!(counts["Web"], 6);
    }
}
