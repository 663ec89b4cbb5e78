//! Category match aggregation.
//!
//! A history is summarised against a [`CategoryCriterion`] into three confidence tiers:
//!
//! - **specific** matches: entries with a treatment in the category that the classifier accepts;
//! - **approximate** matches: entries in the category where the classifier could not decide;
//! - **possible trial** matches: trial entries that could plausibly have delivered the category.
//!
//! Summaries are additive, so histories can be summarised piecewise and combined with `+`.

use std::collections::BTreeSet;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use serde::Serialize;

use crate::classification::Classification;
use crate::config::EngineConfig;
use crate::history::TreatmentHistoryEntry;
use crate::treatment::{Treatment, TreatmentCategory};
use crate::trial::{has_no_declared_type, may_match_as_trial_with};

type TreatmentClassifier = Box<dyn Fn(&Treatment) -> Classification + Send + Sync>;
type TreatmentFilter = Box<dyn Fn(&Treatment) -> bool + Send + Sync>;
type EntryFilter = Box<dyn Fn(&TreatmentHistoryEntry) -> bool + Send + Sync>;

/// Tiered summary of how a history matches a category criterion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TreatmentSummaryForCategory {
    pub specific_matches: Vec<TreatmentHistoryEntry>,
    pub approximate_matches: usize,
    pub possible_trial_matches: usize,
}

impl TreatmentSummaryForCategory {
    fn specific(entry: &TreatmentHistoryEntry) -> Self {
        Self {
            specific_matches: vec![entry.clone()],
            ..Self::default()
        }
    }

    pub fn num_specific_matches(&self) -> usize {
        self.specific_matches.len()
    }

    pub fn has_specific_match(&self) -> bool {
        !self.specific_matches.is_empty()
    }

    pub fn has_approximate_match(&self) -> bool {
        self.approximate_matches > 0
    }

    pub fn has_possible_trial_match(&self) -> bool {
        self.possible_trial_matches > 0
    }
}

impl Add for TreatmentSummaryForCategory {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self.specific_matches.extend(other.specific_matches);
        self.approximate_matches += other.approximate_matches;
        self.possible_trial_matches += other.possible_trial_matches;
        self
    }
}

impl Sum for TreatmentSummaryForCategory {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// A category criterion with caller supplied refinements.
///
/// Defaults: every treatment in the category is a match, trial candidates are treatments without
/// a declared type, and every trial entry may count as a possible match.
pub struct CategoryCriterion {
    category: TreatmentCategory,
    classifier: TreatmentClassifier,
    trial_candidate: TreatmentFilter,
    trial_entry_filter: EntryFilter,
}

impl CategoryCriterion {
    pub fn new(category: TreatmentCategory) -> Self {
        Self {
            category,
            classifier: Box::new(|_: &Treatment| Classification::Match),
            trial_candidate: Box::new(has_no_declared_type),
            trial_entry_filter: Box::new(|_: &TreatmentHistoryEntry| true),
        }
    }

    /// Classifier applied to each treatment of a non-trial entry that is in the category.
    pub fn with_classifier<F>(self, classifier: F) -> Self
    where
        F: Fn(&Treatment) -> Classification + Send + Sync + 'static,
    {
        Self {
            classifier: Box::new(classifier),
            ..self
        }
    }

    /// Which individual treatments of a trial entry may stand in for the category.
    pub fn with_trial_candidate<F>(self, trial_candidate: F) -> Self
    where
        F: Fn(&Treatment) -> bool + Send + Sync + 'static,
    {
        Self {
            trial_candidate: Box::new(trial_candidate),
            ..self
        }
    }

    /// Which whole trial entries may count as possible matches.
    pub fn with_trial_entry_filter<F>(self, trial_entry_filter: F) -> Self
    where
        F: Fn(&TreatmentHistoryEntry) -> bool + Send + Sync + 'static,
    {
        Self {
            trial_entry_filter: Box::new(trial_entry_filter),
            ..self
        }
    }

    pub fn category(&self) -> TreatmentCategory {
        self.category
    }

    /// Summarises a single entry.
    pub fn summarize_entry(
        &self,
        config: &EngineConfig,
        entry: &TreatmentHistoryEntry,
    ) -> TreatmentSummaryForCategory {
        if entry.is_trial() {
            let plausible = may_match_as_trial_with(
                config,
                entry,
                &BTreeSet::from([self.category]),
                &self.trial_candidate,
            ) && (self.trial_entry_filter)(entry);

            return TreatmentSummaryForCategory {
                possible_trial_matches: usize::from(plausible),
                ..TreatmentSummaryForCategory::default()
            };
        }

        let classifications: Vec<Classification> = entry
            .all_treatments()
            .into_iter()
            .filter(|treatment| treatment.has_category(self.category))
            .map(|treatment| (self.classifier)(treatment))
            .collect();

        if classifications.iter().any(|c| c.is_match()) {
            TreatmentSummaryForCategory::specific(entry)
        } else if classifications.iter().any(|c| c.is_ambiguous()) {
            TreatmentSummaryForCategory {
                approximate_matches: 1,
                ..TreatmentSummaryForCategory::default()
            }
        } else {
            TreatmentSummaryForCategory::default()
        }
    }

    /// Summarises a whole history.
    pub fn summarize<'a, I>(&self, config: &EngineConfig, history: I) -> TreatmentSummaryForCategory
    where
        I: IntoIterator<Item = &'a TreatmentHistoryEntry>,
    {
        history
            .into_iter()
            .map(|entry| self.summarize_entry(config, entry))
            .sum()
    }
}

impl fmt::Debug for CategoryCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryCriterion")
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}
