//! Systemic treatment line counting.
//!
//! The upper bound counts every systemic entry as its own line. The lower bound merges entries
//! that share a treatment name into one line unless a differently named entry was given in
//! between them, which signals that the patient switched therapy and later restarted.

use std::collections::BTreeMap;

use serde::Serialize;
use treatline_types::PartialDate;

use crate::date_ordering::{earliest, most_recent};
use crate::history::TreatmentHistoryEntry;

/// Lower and upper bound on the number of distinct systemic lines. Always `min <= max`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SystemicLineBounds {
    pub min: usize,
    pub max: usize,
}

pub fn max_systemic_treatments(history: &[TreatmentHistoryEntry]) -> usize {
    history.iter().filter(|entry| entry.is_systemic()).count()
}

pub fn min_systemic_treatments(history: &[TreatmentHistoryEntry]) -> usize {
    let mut by_name: BTreeMap<String, Vec<&TreatmentHistoryEntry>> = BTreeMap::new();
    for entry in history.iter().filter(|entry| entry.is_systemic()) {
        by_name.entry(entry.treatment_name()).or_default().push(entry);
    }

    by_name
        .into_iter()
        .map(|(name, mut group)| {
            if group.len() == 1 {
                return 1;
            }
            let others: Vec<&TreatmentHistoryEntry> = history
                .iter()
                .filter(|entry| entry.treatment_name() != name)
                .collect();
            group.sort_by(|a, b| a.start().cmp(&b.start()).then_with(|| a.stop().cmp(&b.stop())));

            1 + group
                .windows(2)
                .filter(|pair| is_interrupted(pair[0], pair[1], &others))
                .count()
        })
        .sum()
}

pub fn systemic_line_bounds(history: &[TreatmentHistoryEntry]) -> SystemicLineBounds {
    SystemicLineBounds {
        min: min_systemic_treatments(history),
        max: max_systemic_treatments(history),
    }
}

pub fn first_systemic_treatment(history: &[TreatmentHistoryEntry]) -> Option<&TreatmentHistoryEntry> {
    earliest(history.iter().filter(|entry| entry.is_systemic()))
}

pub fn last_systemic_treatment(history: &[TreatmentHistoryEntry]) -> Option<&TreatmentHistoryEntry> {
    most_recent(history.iter().filter(|entry| entry.is_systemic()))
}

/// Entries with an ambiguous timeline are never considered interrupted.
fn is_interrupted(
    previous: &TreatmentHistoryEntry,
    current: &TreatmentHistoryEntry,
    others: &[&TreatmentHistoryEntry],
) -> bool {
    strictly_after(current.start(), previous.start())
        && others.iter().any(|other| {
            strictly_after(other.start(), previous.start())
                && strictly_after(current.start(), other.start())
        })
}

/// `first` is known to be later than `second`, comparing months only within a known year.
fn strictly_after(first: PartialDate, second: PartialDate) -> bool {
    match (first.year(), second.year()) {
        (Some(y1), Some(y2)) if y1 != y2 => y1 > y2,
        (Some(_), Some(_)) => matches!(
            (first.month(), second.month()),
            (Some(m1), Some(m2)) if m1 > m2
        ),
        _ => false,
    }
}
