//! Whether treatments were administered since a given date.

use chrono::NaiveDate;
use serde::Serialize;

use crate::date_comparison::{is_after_date, is_before_date};
use crate::history::TreatmentHistoryEntry;
use crate::stages::portion_matching;
use crate::treatment::Treatment;

/// Outcome of checking a history for matching treatments since a date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SinceDateOutcome {
    /// A matching portion was administered after the date.
    Administered,
    /// A matching portion exists but its dates cannot be compared.
    UnknownDate,
    /// Every matching portion was administered before the date.
    OnlyBefore,
    NoMatch,
}

/// Stop date is checked first, then start. Both unknown yields `include_unknown`.
pub fn treatment_since_date(
    entry: &TreatmentHistoryEntry,
    min_date: NaiveDate,
    include_unknown: bool,
) -> bool {
    is_after_date(min_date, entry.stop())
        .or_else(|| is_after_date(min_date, entry.start()))
        .unwrap_or(include_unknown)
}

/// Uses only the recorded stop date.
pub fn treatment_before_date(
    entry: &TreatmentHistoryEntry,
    max_date: NaiveDate,
    include_unknown: bool,
) -> bool {
    is_before_date(max_date, entry.stop()).unwrap_or(include_unknown)
}

pub fn matching_portions_since<'a, I, P>(history: I, predicate: P, min_date: NaiveDate) -> SinceDateOutcome
where
    I: IntoIterator<Item = &'a TreatmentHistoryEntry>,
    P: Fn(&Treatment) -> bool,
{
    let portions: Vec<TreatmentHistoryEntry> = history
        .into_iter()
        .filter_map(|entry| portion_matching(entry, &predicate))
        .collect();

    if portions.iter().any(|p| treatment_since_date(p, min_date, false)) {
        SinceDateOutcome::Administered
    } else if portions.iter().any(|p| treatment_since_date(p, min_date, true)) {
        SinceDateOutcome::UnknownDate
    } else if !portions.is_empty() {
        SinceDateOutcome::OnlyBefore
    } else {
        SinceDateOutcome::NoMatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{TreatmentHistoryDetails, TreatmentStage};
    use crate::test_support::{date, drug_treatment, entry, stage};
    use crate::treatment::TreatmentCategory;
    use treatline_types::PartialDate;

    fn min_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 6, 1).expect("valid date")
    }

    fn chemo(start: PartialDate, stop: PartialDate) -> TreatmentHistoryEntry {
        entry([drug_treatment("CISPLATIN", TreatmentCategory::Chemotherapy, [])])
            .with_start(start)
            .with_details(TreatmentHistoryDetails {
                stop,
                ..Default::default()
            })
    }

    fn is_chemo(treatment: &Treatment) -> bool {
        treatment.has_category(TreatmentCategory::Chemotherapy)
    }

    #[test]
    fn stop_date_takes_precedence_over_start() {
        let entry = chemo(date(2020, 1), date(2023, 1));
        assert!(treatment_since_date(&entry, min_date(), false));

        let stopped_before = chemo(date(2023, 1), date(2021, 1));
        assert!(!treatment_since_date(&stopped_before, min_date(), true));
    }

    #[test]
    fn falls_back_to_start_then_include_unknown() {
        let started_after = chemo(date(2023, 1), PartialDate::UNKNOWN);
        assert!(treatment_since_date(&started_after, min_date(), false));

        let unknown = chemo(PartialDate::UNKNOWN, PartialDate::UNKNOWN);
        assert!(!treatment_since_date(&unknown, min_date(), false));
        assert!(treatment_since_date(&unknown, min_date(), true));
    }

    #[test]
    fn before_date_uses_stop_only() {
        let entry = chemo(date(2020, 1), date(2021, 1));
        assert!(treatment_before_date(&entry, min_date(), false));

        let no_stop = chemo(date(2020, 1), PartialDate::UNKNOWN);
        assert!(!treatment_before_date(&no_stop, min_date(), false));
        assert!(treatment_before_date(&no_stop, min_date(), true));
    }

    #[test]
    fn outcomes_over_matching_portions() {
        let recent = chemo(date(2023, 1), date(2023, 6));
        let old = chemo(date(2019, 1), date(2019, 6));
        let undated = chemo(PartialDate::UNKNOWN, PartialDate::UNKNOWN);

        assert_eq!(
            matching_portions_since([&old, &recent], is_chemo, min_date()),
            SinceDateOutcome::Administered
        );
        assert_eq!(
            matching_portions_since([&old, &undated], is_chemo, min_date()),
            SinceDateOutcome::UnknownDate
        );
        assert_eq!(
            matching_portions_since([&old], is_chemo, min_date()),
            SinceDateOutcome::OnlyBefore
        );
        assert_eq!(
            matching_portions_since(
                [&recent],
                |t: &Treatment| t.has_category(TreatmentCategory::Surgery),
                min_date()
            ),
            SinceDateOutcome::NoMatch
        );
    }

    #[test]
    fn decomposed_portion_ends_where_the_next_stage_starts() {
        let entry = entry([drug_treatment("CISPLATIN", TreatmentCategory::Chemotherapy, [])])
            .with_start(date(2021, 1))
            .with_details(TreatmentHistoryDetails {
                stop: date(2023, 1),
                maintenance_treatment: Some(stage(
                    drug_treatment("DURVALUMAB", TreatmentCategory::Immunotherapy, []),
                    date(2021, 6),
                    None,
                )),
                switch_to_treatments: Vec::<TreatmentStage>::new(),
                ..Default::default()
            });

        assert_eq!(
            matching_portions_since([&entry], is_chemo, min_date()),
            SinceDateOutcome::OnlyBefore
        );
    }
}
