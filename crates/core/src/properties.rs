use proptest::prelude::*;

use crate::category_summary::CategoryCriterion;
use crate::config::EngineConfig;
use crate::history::{StopReason, TreatmentHistoryDetails, TreatmentHistoryEntry, TreatmentStage};
use crate::line_counter::systemic_line_bounds;
use crate::stages::portion_matching;
use crate::test_support::{drug_treatment, other_treatment};
use crate::treatment::{DrugType, OtherTreatmentType, Treatment, TreatmentCategory};
use treatline_types::PartialDate;

fn is_chemo(treatment: &Treatment) -> bool {
    treatment.has_category(TreatmentCategory::Chemotherapy)
}

fn arb_date() -> impl Strategy<Value = PartialDate> {
    (
        proptest::option::of(2015i32..2025),
        proptest::option::of(1u32..=12),
    )
        .prop_map(|(year, month)| PartialDate::new(year, month).expect("month in range"))
}

fn arb_treatment() -> impl Strategy<Value = Treatment> {
    let names = prop::sample::select(vec!["A", "B", "C", ""]);
    let categories = prop::sample::select(vec![
        TreatmentCategory::Chemotherapy,
        TreatmentCategory::Immunotherapy,
        TreatmentCategory::TargetedTherapy,
    ]);
    let types = proptest::option::of(prop::sample::select(vec![
        DrugType::Taxane,
        DrugType::PlatinumCompound,
        DrugType::AntiPd1,
    ]));

    prop_oneof![
        4 => (names.clone(), categories, types)
            .prop_map(|(name, category, drug_type)| drug_treatment(name, category, drug_type)),
        1 => (names, any::<bool>()).prop_map(|(name, typed)| {
            let types = if typed {
                vec![OtherTreatmentType::OtherSurgery]
            } else {
                Vec::new()
            };
            other_treatment(name, false, [TreatmentCategory::Surgery], types)
        }),
    ]
}

fn arb_stage() -> impl Strategy<Value = TreatmentStage> {
    (arb_treatment(), arb_date(), proptest::option::of(0u32..10)).prop_map(
        |(treatment, start, cycles)| TreatmentStage {
            treatment,
            start,
            cycles,
        },
    )
}

fn arb_entry() -> impl Strategy<Value = TreatmentHistoryEntry> {
    let details = (
        arb_date(),
        proptest::option::of(0u32..10),
        proptest::option::of(prop::sample::select(vec![
            StopReason::ProgressiveDisease,
            StopReason::Toxicity,
            StopReason::Completed,
        ])),
        prop::collection::vec(arb_stage(), 0..3),
        proptest::option::of(arb_stage()),
    )
        .prop_map(|(stop, cycles, stop_reason, switch_to_treatments, maintenance_treatment)| {
            TreatmentHistoryDetails {
                stop,
                cycles,
                stop_reason,
                switch_to_treatments,
                maintenance_treatment,
                ..Default::default()
            }
        });

    (
        prop::collection::vec(arb_treatment(), 1..3),
        arb_date(),
        any::<bool>(),
        proptest::option::of(details),
    )
        .prop_map(|(treatments, start, is_trial, details)| {
            let entry = TreatmentHistoryEntry::new(treatments)
                .expect("non-empty")
                .with_start(start);
            let entry = if is_trial { entry.as_trial(None) } else { entry };
            match details {
                Some(details) => entry.with_details(details),
                None => entry,
            }
        })
}

fn arb_history() -> impl Strategy<Value = Vec<TreatmentHistoryEntry>> {
    prop::collection::vec(arb_entry(), 0..6)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_decomposition_is_idempotent(entry in arb_entry()) {
        let once = portion_matching(&entry, is_chemo);
        let twice = once.as_ref().and_then(|portion| portion_matching(portion, is_chemo));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_decomposition_yields_single_matching_stage(entry in arb_entry()) {
        let has_match = entry
            .stages()
            .iter()
            .any(|stage| stage.treatments.iter().any(|t| is_chemo(t)));

        match portion_matching(&entry, is_chemo) {
            Some(portion) => {
                prop_assert!(has_match);
                if entry.stages().len() > 1 {
                    prop_assert_eq!(portion.stages().len(), 1);
                }
                prop_assert!(portion.treatments().iter().any(is_chemo));
            }
            None => prop_assert!(!has_match),
        }
    }

    #[test]
    fn prop_category_summary_is_additive(first in arb_history(), second in arb_history()) {
        let config = EngineConfig::default();
        let criterion = CategoryCriterion::new(TreatmentCategory::Chemotherapy);
        let combined: Vec<TreatmentHistoryEntry> =
            first.iter().chain(second.iter()).cloned().collect();

        prop_assert_eq!(
            criterion.summarize(&config, &first) + criterion.summarize(&config, &second),
            criterion.summarize(&config, &combined)
        );
    }

    #[test]
    fn prop_line_bounds_are_ordered(history in arb_history()) {
        let bounds = systemic_line_bounds(&history);
        prop_assert!(bounds.min <= bounds.max);
        prop_assert_eq!(bounds.max, history.iter().filter(|e| e.is_systemic()).count());
    }
}
