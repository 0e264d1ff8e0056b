//! Rule batching.
//!
//! Partitions the active rules for a source type into fixed-size batches so
//! the dispatcher can pace them against the API rate limit. Batch keys are
//! dense indices starting at 0; concatenating the batches in index order
//! reproduces the original rule order.

use crate::error::Result;
use leakscout_core::SourceType;
use leakscout_db::{rules, Rule};
use sqlx::{Pool, Sqlite};
use std::collections::BTreeMap;

/// Load the enabled rules for `source_type` and partition them into batches
/// of `batch_size`.
///
/// Produces `n / batch_size` full batches plus one remainder batch when the
/// rule count is not a multiple of the batch size. Zero rules yield an empty
/// map.
///
/// # Errors
/// Propagates the rule store error; the caller decides whether to skip the
/// cycle.
pub async fn generate_batches(
    pool: &Pool<Sqlite>,
    source_type: SourceType,
    batch_size: usize,
) -> Result<BTreeMap<usize, Vec<Rule>>> {
    let rules = rules::get_valid_rules_by_type(pool, source_type).await?;
    Ok(partition_rules(rules, batch_size))
}

/// Slice `rules` in order into batches of `batch_size`, keyed by batch index.
///
/// A `batch_size` of 0 yields no batches.
#[must_use]
pub fn partition_rules(rules: Vec<Rule>, batch_size: usize) -> BTreeMap<usize, Vec<Rule>> {
    let mut batches = BTreeMap::new();
    if batch_size == 0 {
        return batches;
    }

    for (index, chunk) in rules.chunks(batch_size).enumerate() {
        batches.insert(index, chunk.to_vec());
    }

    batches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_rules(patterns: &[&str]) -> Vec<Rule> {
        patterns
            .iter()
            .enumerate()
            .map(|(i, p)| Rule {
                id: i64::try_from(i).expect("small index") + 1,
                pattern: (*p).to_string(),
                source_type: "GITLAB".to_string(),
                enabled: true,
            })
            .collect()
    }

    #[test]
    fn test_partition_with_remainder() {
        let rules = make_rules(&["aws_secret", "api_key", "token"]);
        let batches = partition_rules(rules, 2);

        assert_eq!(batches.len(), 2);
        assert_eq!(
            batches[&0].iter().map(|r| &r.pattern).collect::<Vec<_>>(),
            ["aws_secret", "api_key"]
        );
        assert_eq!(
            batches[&1].iter().map(|r| &r.pattern).collect::<Vec<_>>(),
            ["token"]
        );
    }

    #[test]
    fn test_partition_exact_multiple() {
        let rules = make_rules(&["a", "b", "c", "d"]);
        let batches = partition_rules(rules, 2);

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[&0].len(), 2);
        assert_eq!(batches[&1].len(), 2);
    }

    #[test]
    fn test_partition_empty_rules() {
        let batches = partition_rules(Vec::new(), 5);
        assert!(batches.is_empty());
    }

    #[test]
    fn test_partition_zero_batch_size() {
        let rules = make_rules(&["a"]);
        let batches = partition_rules(rules, 0);
        assert!(batches.is_empty());
    }

    #[test]
    fn test_concatenation_reproduces_input_order() {
        for (n, b) in [(1_usize, 1_usize), (5, 2), (6, 3), (7, 3), (10, 4)] {
            let patterns: Vec<String> = (0..n).map(|i| format!("rule-{i}")).collect();
            let refs: Vec<&str> = patterns.iter().map(String::as_str).collect();
            let rules = make_rules(&refs);

            let batches = partition_rules(rules.clone(), b);

            let expected_batches = n.div_ceil(b);
            assert_eq!(batches.len(), expected_batches, "n={n} b={b}");
            assert_eq!(
                batches.keys().copied().collect::<Vec<_>>(),
                (0..expected_batches).collect::<Vec<_>>(),
                "batch keys must be dense"
            );

            let rejoined: Vec<Rule> = batches.into_values().flatten().collect();
            assert_eq!(rejoined, rules, "n={n} b={b}");
        }
    }
}
