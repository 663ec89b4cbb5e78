//! # Treatline Core
//!
//! Treatment history reconciliation for oncology eligibility rules.
//!
//! This crate contains the treatment model and the pure evaluation logic rules build on:
//! - Stage decomposition of multi-stage treatment lines
//! - Three-valued category/type classification with trial plausibility
//! - Progression resolution and drug response scanning
//! - Bounds on the number of distinct systemic treatment lines
//!
//! **No I/O**: record loading lives in `treatline-records`, logging setup and environment handling
//! in the `treatline` binary. Configuration is injected through [`EngineConfig`].

/// Implements `FromStr` for enums using their snake_case serde names.
macro_rules! impl_from_wire_name {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ::std::str::FromStr for $ty {
                type Err = $crate::EngineError;

                fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                    $crate::parse_wire_name(s)
                }
            }
        )+
    };
}

pub mod category_summary;
pub mod classification;
pub mod config;
pub mod constants;
pub mod criterion;
pub mod date_comparison;
pub mod date_ordering;
pub mod display;
pub mod drug_response;
mod error;
pub mod history;
pub mod line_counter;
pub mod progression;
pub mod since_date;
pub mod stages;
pub mod treatment;
pub mod trial;

#[cfg(test)]
mod properties;
#[cfg(test)]
mod test_support;

pub use category_summary::{CategoryCriterion, TreatmentSummaryForCategory};
pub use classification::Classification;
pub use config::{likely_trial_categories_from_env_value, EngineConfig};
pub use criterion::TreatmentMatcher;
pub use drug_response::DrugResponseEvaluation;
pub use error::{EngineError, EngineResult};
pub use history::{
    Intent, StopReason, TreatmentHistoryDetails, TreatmentHistoryEntry, TreatmentResponse,
    TreatmentStage,
};
pub use line_counter::SystemicLineBounds;
pub use since_date::SinceDateOutcome;
pub use treatline_types::{DateError, PartialDate};
pub use treatment::{
    Drug, DrugTreatment, DrugType, OtherTreatment, OtherTreatmentType, Radiotherapy,
    RadiotherapyType, Treatment, TreatmentCategory, TreatmentType,
};

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::de::value::StrDeserializer;
use serde::de::{DeserializeOwned, IntoDeserializer};

pub(crate) fn parse_wire_name<T: DeserializeOwned>(name: &str) -> EngineResult<T> {
    let name = name.trim();
    let deserializer: StrDeserializer<'_, serde::de::value::Error> = name.into_deserializer();
    T::deserialize(deserializer).map_err(|_| EngineError::UnknownName(name.to_owned()))
}

/// The snake_case serde name of a unit variant, derived from its `Debug` name.
pub(crate) fn wire_name(variant: &impl std::fmt::Debug) -> String {
    let mut name = String::new();
    for (index, ch) in format!("{variant:?}").char_indices() {
        if index > 0 && ch.is_uppercase() {
            name.push('_');
        }
        name.push(ch.to_ascii_lowercase());
    }
    name
}

/// Entry point for rules evaluating a patient's treatment history.
///
/// Holds the injected configuration; every operation is a pure function of its arguments and
/// the configuration, so one engine can be shared across threads.
#[derive(Clone, Debug, Default)]
pub struct TreatmentHistoryEngine {
    cfg: Arc<EngineConfig>,
}

impl TreatmentHistoryEngine {
    /// Creates a new `TreatmentHistoryEngine`.
    ///
    /// # Arguments
    ///
    /// * `cfg` - Engine configuration, resolved once at startup
    pub fn new(cfg: Arc<EngineConfig>) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Portion of `entry` matching `matcher`, see [`stages::portion_matching`].
    pub fn portion_matching(
        &self,
        entry: &TreatmentHistoryEntry,
        matcher: &TreatmentMatcher,
    ) -> Option<TreatmentHistoryEntry> {
        let portion = stages::portion_matching(entry, |t| matcher.matches(t));
        tracing::debug!(
            entry = %entry.treatment_name(),
            matched = portion.is_some(),
            "decomposed entry"
        );
        portion
    }

    /// Decomposed portions of every entry in `history` matching `matcher`.
    pub fn matching_portions(
        &self,
        history: &[TreatmentHistoryEntry],
        matcher: &TreatmentMatcher,
    ) -> Vec<TreatmentHistoryEntry> {
        history
            .iter()
            .filter_map(|entry| self.portion_matching(entry, matcher))
            .collect()
    }

    pub fn may_match_as_trial(
        &self,
        entry: &TreatmentHistoryEntry,
        categories: &BTreeSet<TreatmentCategory>,
    ) -> bool {
        trial::may_match_as_trial(&self.cfg, entry, categories)
    }

    /// Trial entries of `history` that could plausibly have delivered one of `categories`.
    pub fn possible_trial_entries<'a>(
        &self,
        history: &'a [TreatmentHistoryEntry],
        categories: &BTreeSet<TreatmentCategory>,
    ) -> Vec<&'a TreatmentHistoryEntry> {
        let entries: Vec<_> = history
            .iter()
            .filter(|entry| self.may_match_as_trial(entry, categories))
            .collect();
        tracing::debug!(?categories, count = entries.len(), "possible trial entries");
        entries
    }

    pub fn summarize_category(
        &self,
        history: &[TreatmentHistoryEntry],
        criterion: &CategoryCriterion,
    ) -> TreatmentSummaryForCategory {
        let summary = criterion.summarize(&self.cfg, history);
        tracing::debug!(
            category = ?criterion.category(),
            specific = summary.num_specific_matches(),
            approximate = summary.approximate_matches,
            possible_trial = summary.possible_trial_matches,
            "summarized history for category"
        );
        summary
    }

    pub fn evaluate_drug_progression(
        &self,
        history: &[TreatmentHistoryEntry],
        drugs: &BTreeSet<Drug>,
    ) -> DrugResponseEvaluation {
        let evaluation = drug_response::evaluate_drug_progression(&self.cfg, history, drugs);
        tracing::debug!(
            drugs = drugs.len(),
            matched = evaluation.matching_drugs.len(),
            with_progression = evaluation.matching_drugs_with_progression.len(),
            "evaluated drug progression"
        );
        evaluation
    }

    pub fn resulted_in_progression(&self, entry: &TreatmentHistoryEntry) -> Option<bool> {
        progression::resulted_in_progression(entry)
    }

    pub fn systemic_line_bounds(&self, history: &[TreatmentHistoryEntry]) -> SystemicLineBounds {
        let bounds = line_counter::systemic_line_bounds(history);
        tracing::debug!(min = bounds.min, max = bounds.max, "systemic line bounds");
        bounds
    }

    pub fn first_systemic_treatment<'a>(
        &self,
        history: &'a [TreatmentHistoryEntry],
    ) -> Option<&'a TreatmentHistoryEntry> {
        line_counter::first_systemic_treatment(history)
    }

    pub fn last_systemic_treatment<'a>(
        &self,
        history: &'a [TreatmentHistoryEntry],
    ) -> Option<&'a TreatmentHistoryEntry> {
        line_counter::last_systemic_treatment(history)
    }

    pub fn matching_portions_since(
        &self,
        history: &[TreatmentHistoryEntry],
        matcher: &TreatmentMatcher,
        min_date: NaiveDate,
    ) -> SinceDateOutcome {
        let outcome = since_date::matching_portions_since(history, |t| matcher.matches(t), min_date);
        tracing::debug!(%matcher, %min_date, ?outcome, "checked treatments since date");
        outcome
    }
}
