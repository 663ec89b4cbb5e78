//! Drug response scanning.
//!
//! Finds entries containing specific drugs and folds their stop outcomes into a single
//! [`DrugResponseEvaluation`]. Only drug treatments can contain drugs; radiotherapies and other
//! treatments never match.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::history::{StopReason, TreatmentHistoryEntry};
use crate::progression::resulted_in_progression;
use crate::treatment::{Drug, TreatmentCategory};
use crate::trial::may_match_as_trial;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DrugResponseEvaluation {
    pub matching_drugs_with_progression: BTreeSet<Drug>,
    pub matching_drugs: BTreeSet<Drug>,
    /// A matching entry has no recorded outcome to decide progression from.
    pub matches_with_unclear_progression: bool,
    pub possible_trial_match: bool,
    pub matches_with_toxicity: bool,
}

impl DrugResponseEvaluation {
    fn merge(mut self, other: Self) -> Self {
        self.matching_drugs_with_progression
            .extend(other.matching_drugs_with_progression);
        self.matching_drugs.extend(other.matching_drugs);
        self.matches_with_unclear_progression |= other.matches_with_unclear_progression;
        self.possible_trial_match |= other.possible_trial_match;
        self.matches_with_toxicity |= other.matches_with_toxicity;
        self
    }
}

pub fn evaluate_drug_progression<'a, I>(
    config: &EngineConfig,
    history: I,
    drugs: &BTreeSet<Drug>,
) -> DrugResponseEvaluation
where
    I: IntoIterator<Item = &'a TreatmentHistoryEntry>,
{
    if drugs.is_empty() {
        return DrugResponseEvaluation::default();
    }

    let categories: BTreeSet<TreatmentCategory> = drugs.iter().map(|drug| drug.category).collect();

    history
        .into_iter()
        .map(|entry| evaluate_entry(config, entry, drugs, &categories))
        .fold(DrugResponseEvaluation::default(), DrugResponseEvaluation::merge)
}

fn evaluate_entry(
    config: &EngineConfig,
    entry: &TreatmentHistoryEntry,
    drugs: &BTreeSet<Drug>,
    categories: &BTreeSet<TreatmentCategory>,
) -> DrugResponseEvaluation {
    let possible_trial_match = may_match_as_trial(config, entry, categories);

    let matching_drugs: BTreeSet<Drug> = entry
        .all_treatments()
        .into_iter()
        .flat_map(|treatment| treatment.drugs())
        .filter(|drug| drugs.contains(*drug))
        .cloned()
        .collect();

    if matching_drugs.is_empty() {
        return DrugResponseEvaluation {
            possible_trial_match,
            ..DrugResponseEvaluation::default()
        };
    }

    let progression = resulted_in_progression(entry);
    DrugResponseEvaluation {
        matching_drugs_with_progression: if progression == Some(true) {
            matching_drugs.clone()
        } else {
            BTreeSet::new()
        },
        matching_drugs,
        matches_with_unclear_progression: progression.is_none(),
        possible_trial_match,
        matches_with_toxicity: entry.stop_reason() == Some(StopReason::Toxicity),
    }
}
