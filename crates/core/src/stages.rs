//! Stage decomposition.
//!
//! Multi-stage entries (base, switch-to stages, maintenance) are collapsed into the sub-portion
//! whose stages satisfy a predicate. The derived entry has a single stage and keeps every other
//! attribute of the source entry.

use std::collections::BTreeSet;

use crate::history::TreatmentHistoryEntry;
use crate::treatment::Treatment;

/// Portion of `entry` whose stages contain a treatment matching `predicate`.
///
/// - Returns `None` when no stage matches.
/// - The start is the start of the first matching stage.
/// - The stop is the start of the stage following the last matching stage, or the entry's own
///   stop when the last stage matches.
/// - Cycles are summed over matching stages; stages without a count contribute nothing, and the
///   result has no count if none of them carries one.
pub fn portion_matching<P>(entry: &TreatmentHistoryEntry, predicate: P) -> Option<TreatmentHistoryEntry>
where
    P: Fn(&Treatment) -> bool,
{
    let stages = entry.stages();
    let matching: Vec<usize> = stages
        .iter()
        .enumerate()
        .filter(|(_, stage)| stage.treatments.iter().any(|t| predicate(t)))
        .map(|(index, _)| index)
        .collect();

    let (&first, &last) = (matching.first()?, matching.last()?);

    if stages.len() == 1 {
        return Some(entry.clone());
    }

    let treatments: BTreeSet<Treatment> = matching
        .iter()
        .flat_map(|&index| stages[index].treatments.iter().map(|&t| t.clone()))
        .collect();

    let start = stages[first].start;
    let stop = stages
        .get(last + 1)
        .map(|next| next.start)
        .unwrap_or_else(|| entry.stop());

    let counts: Vec<u32> = matching.iter().filter_map(|&i| stages[i].cycles).collect();
    let cycles = if counts.is_empty() {
        None
    } else {
        sum_cycles(&counts)
    };

    Some(entry.with_collapsed_stages(treatments, start, stop, cycles))
}

fn sum_cycles(counts: &[u32]) -> Option<u32> {
    let total = counts
        .iter()
        .try_fold(0u32, |total, &count| total.checked_add(count));
    if total.is_none() {
        tracing::warn!(?counts, "cycle counts overflow, dropping the aggregated count");
    }
    total
}
