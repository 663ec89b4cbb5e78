//! Ordering of entries by partially known start dates.
//!
//! `PartialDate` already orders unknown components before known ones, so a known year sorts after
//! an unknown year and, within the same year, a known month sorts after an unknown month.

use std::cmp::Ordering;

use crate::history::TreatmentHistoryEntry;

pub fn compare_by_start(a: &TreatmentHistoryEntry, b: &TreatmentHistoryEntry) -> Ordering {
    a.start().cmp(&b.start())
}

/// Latest entry by start date. Of several equal maxima the first one wins.
pub fn most_recent<'a, I>(entries: I) -> Option<&'a TreatmentHistoryEntry>
where
    I: IntoIterator<Item = &'a TreatmentHistoryEntry>,
{
    entries.into_iter().reduce(|best, candidate| {
        if compare_by_start(candidate, best) == Ordering::Greater {
            candidate
        } else {
            best
        }
    })
}

/// Earliest entry by start date. Of several equal minima the first one wins.
pub fn earliest<'a, I>(entries: I) -> Option<&'a TreatmentHistoryEntry>
where
    I: IntoIterator<Item = &'a TreatmentHistoryEntry>,
{
    entries.into_iter().min_by(|a, b| compare_by_start(a, b))
}

/// Stable sort by start date.
pub fn sort_by_start(entries: &mut [&TreatmentHistoryEntry]) {
    entries.sort_by(|a, b| compare_by_start(a, b));
}
