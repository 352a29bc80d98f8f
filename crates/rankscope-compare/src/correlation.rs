//! Rank correlation between two result lists.

use std::collections::{HashMap, HashSet};

use rankscope_core::ScoreSet;

/// Rank of each identifier; the first occurrence wins on duplicates.
pub(crate) fn build_rank_map(set: &ScoreSet) -> HashMap<&str, usize> {
    let mut ranks = HashMap::with_capacity(set.len());
    for (rank, doc) in set.iter().enumerate() {
        ranks.entry(doc.doc_id.as_str()).or_insert(rank);
    }
    ranks
}

/// Kendall's tau between two rankings, over the documents both contain.
///
/// Uses merge-sort inversion counting, O(n log n). Returns `None` when fewer
/// than two documents are shared.
#[must_use]
pub fn kendall_tau(baseline: &ScoreSet, variant: &ScoreSet) -> Option<f64> {
    let variant_rank = build_rank_map(variant);

    let mut seen = HashSet::new();
    let mut ranks = Vec::new();
    for doc in baseline {
        if let Some(&rank) = variant_rank.get(doc.doc_id.as_str()) {
            if seen.insert(doc.doc_id.as_str()) {
                ranks.push(rank);
            }
        }
    }

    kendall_tau_from_ranks(&mut ranks)
}

/// Tau for variant ranks listed in baseline order. Sorts `ranks` in place.
pub(crate) fn kendall_tau_from_ranks(ranks: &mut [usize]) -> Option<f64> {
    let n = u64::try_from(ranks.len()).ok()?;
    if n < 2 {
        return None;
    }
    let total_pairs = n.checked_mul(n - 1)? / 2;

    // An inversion in baseline order is a discordant pair.
    let discordant = merge_sort_inversions(ranks);
    let concordant = total_pairs.saturating_sub(discordant);

    #[allow(clippy::cast_precision_loss)]
    let numerator = concordant as f64 - discordant as f64;
    #[allow(clippy::cast_precision_loss)]
    let denominator = total_pairs as f64;
    Some(numerator / denominator)
}

/// Count pairs `i < j` with `arr[i] > arr[j]`, sorting `arr` as it goes.
fn merge_sort_inversions(arr: &mut [usize]) -> u64 {
    let n = arr.len();
    if n <= 1 {
        return 0;
    }
    let mid = n / 2;
    let mut left = arr[..mid].to_vec();
    let mut right = arr[mid..].to_vec();

    let mut count = merge_sort_inversions(&mut left) + merge_sort_inversions(&mut right);

    let (mut i, mut j, mut k) = (0, 0, 0);
    while i < left.len() && j < right.len() {
        if left[i] <= right[j] {
            arr[k] = left[i];
            i += 1;
        } else {
            arr[k] = right[j];
            count += u64::try_from(left.len() - i).unwrap_or(u64::MAX);
            j += 1;
        }
        k += 1;
    }

    arr[k..k + left.len() - i].copy_from_slice(&left[i..]);
    k += left.len() - i;
    arr[k..].copy_from_slice(&right[j..]);

    count
}
