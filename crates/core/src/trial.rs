//! Trial plausibility.
//!
//! Trial entries are often recorded without the exact treatment, e.g. "immunotherapy in trial X".
//! These helpers decide whether such an entry *could* satisfy a category criterion, so callers
//! can report an undetermined outcome instead of a silent miss.

use std::collections::BTreeSet;

use crate::config::EngineConfig;
use crate::history::TreatmentHistoryEntry;
use crate::treatment::{Treatment, TreatmentCategory};

/// Default trial candidate test: the treatment has no declared type.
pub fn has_no_declared_type(treatment: &Treatment) -> bool {
    !treatment.has_declared_type()
}

/// Whether trial entries may count towards every one of `categories` at all.
pub fn categories_allow_trial_matches(
    config: &EngineConfig,
    categories: &BTreeSet<TreatmentCategory>,
) -> bool {
    !categories.is_empty()
        && categories
            .iter()
            .all(|&category| config.category_allows_trial_matches(category))
}

/// [`may_match_as_trial_with`] using [`has_no_declared_type`] as the candidate test.
pub fn may_match_as_trial(
    config: &EngineConfig,
    entry: &TreatmentHistoryEntry,
    categories: &BTreeSet<TreatmentCategory>,
) -> bool {
    may_match_as_trial_with(config, entry, categories, has_no_declared_type)
}

/// Whether a trial entry plausibly delivered one of `categories`.
///
/// True when the entry is a trial, every target category is a likely trial category, and some
/// treatment of the entry is either uncategorised or in a target category while also passing
/// `is_candidate`.
pub fn may_match_as_trial_with<F>(
    config: &EngineConfig,
    entry: &TreatmentHistoryEntry,
    categories: &BTreeSet<TreatmentCategory>,
    is_candidate: F,
) -> bool
where
    F: Fn(&Treatment) -> bool,
{
    if !entry.is_trial() || !categories_allow_trial_matches(config, categories) {
        return false;
    }

    entry.all_treatments().into_iter().any(|treatment| {
        let treatment_categories = treatment.categories();
        let category_fits = treatment_categories.is_empty()
            || !treatment_categories.is_disjoint(categories);
        category_fits && is_candidate(treatment)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{drug_treatment, entry, other_treatment};
    use crate::treatment::{DrugType, OtherTreatmentType};

    fn trial_entry(treatment: Treatment) -> TreatmentHistoryEntry {
        entry([treatment]).as_trial(Some("ACRONYM".into()))
    }

    fn categories(items: &[TreatmentCategory]) -> BTreeSet<TreatmentCategory> {
        items.iter().copied().collect()
    }

    #[test]
    fn non_trial_entry_never_matches() {
        let config = EngineConfig::default();
        let plain = entry([drug_treatment("X", TreatmentCategory::Chemotherapy, [])]);
        assert!(!may_match_as_trial(
            &config,
            &plain,
            &categories(&[TreatmentCategory::Chemotherapy])
        ));
    }

    #[test]
    fn untyped_trial_treatment_in_target_category_matches() {
        let config = EngineConfig::default();
        let trial = trial_entry(drug_treatment("X", TreatmentCategory::Chemotherapy, []));
        assert!(may_match_as_trial(
            &config,
            &trial,
            &categories(&[TreatmentCategory::Chemotherapy])
        ));
    }

    #[test]
    fn uncategorised_trial_treatment_matches_any_likely_category() {
        let config = EngineConfig::default();
        let trial = trial_entry(other_treatment("", true, [], Vec::<OtherTreatmentType>::new()));
        assert!(may_match_as_trial(
            &config,
            &trial,
            &categories(&[TreatmentCategory::Immunotherapy])
        ));
    }

    #[test]
    fn typed_trial_treatment_is_not_a_candidate() {
        let config = EngineConfig::default();
        let trial = trial_entry(drug_treatment(
            "X",
            TreatmentCategory::Chemotherapy,
            [DrugType::Taxane],
        ));
        let targets = categories(&[TreatmentCategory::Chemotherapy]);
        assert!(!may_match_as_trial(&config, &trial, &targets));
        assert!(may_match_as_trial_with(&config, &trial, &targets, |_| true));
    }

    #[test]
    fn unlikely_trial_category_never_matches() {
        let config = EngineConfig::default();
        let trial = trial_entry(drug_treatment("X", TreatmentCategory::Chemotherapy, []));
        assert!(!may_match_as_trial(
            &config,
            &trial,
            &categories(&[TreatmentCategory::Transplantation])
        ));
        assert!(!may_match_as_trial(
            &config,
            &trial,
            &categories(&[TreatmentCategory::Chemotherapy, TreatmentCategory::Surgery])
        ));
        assert!(!may_match_as_trial(&config, &trial, &BTreeSet::new()));
    }

    #[test]
    fn allow_list_comes_from_config() {
        let config = EngineConfig::new([TreatmentCategory::Transplantation]).expect("config");
        let trial = trial_entry(other_treatment("", true, [], Vec::<OtherTreatmentType>::new()));
        assert!(may_match_as_trial(
            &config,
            &trial,
            &categories(&[TreatmentCategory::Transplantation])
        ));
        assert!(!may_match_as_trial(
            &config,
            &trial,
            &categories(&[TreatmentCategory::Chemotherapy])
        ));
    }
}
