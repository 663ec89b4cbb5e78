use crate::constants::MIN_WEEKS_TO_ASSUME_STOP_DUE_TO_PROGRESSION;
use crate::date_comparison::min_weeks_between;
use crate::history::{StopReason, TreatmentHistoryEntry, TreatmentResponse};

/// Whether an entry ended in progressive disease.
///
/// - `Some(true)` when the best response or stop reason is progressive disease, or when no stop
///   reason is recorded and the entry lasted longer than half a year.
/// - `Some(false)` when any other stop reason is recorded.
/// - `None` otherwise.
pub fn resulted_in_progression(entry: &TreatmentHistoryEntry) -> Option<bool> {
    let stop_reason = entry.stop_reason();
    if entry.best_response() == Some(TreatmentResponse::ProgressiveDisease)
        || stop_reason == Some(StopReason::ProgressiveDisease)
    {
        return Some(true);
    }

    match stop_reason {
        Some(_) => Some(false),
        None => min_weeks_between(entry.start(), entry.stop())
            .filter(|&weeks| weeks > MIN_WEEKS_TO_ASSUME_STOP_DUE_TO_PROGRESSION)
            .map(|_| true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::TreatmentHistoryDetails;
    use crate::test_support::{date, drug_treatment, entry};
    use crate::treatment::TreatmentCategory;
    use treatline_types::PartialDate;

    fn with_details(start: PartialDate, details: TreatmentHistoryDetails) -> TreatmentHistoryEntry {
        entry([drug_treatment("X", TreatmentCategory::Chemotherapy, [])])
            .with_start(start)
            .with_details(details)
    }

    #[test]
    fn progressive_response_or_stop_reason_is_progression() {
        let by_response = with_details(
            PartialDate::UNKNOWN,
            TreatmentHistoryDetails {
                best_response: Some(TreatmentResponse::ProgressiveDisease),
                stop_reason: Some(StopReason::Toxicity),
                ..Default::default()
            },
        );
        assert_eq!(resulted_in_progression(&by_response), Some(true));

        let by_stop_reason = with_details(
            PartialDate::UNKNOWN,
            TreatmentHistoryDetails {
                stop_reason: Some(StopReason::ProgressiveDisease),
                ..Default::default()
            },
        );
        assert_eq!(resulted_in_progression(&by_stop_reason), Some(true));
    }

    #[test]
    fn other_stop_reason_is_not_progression() {
        let toxicity = with_details(
            date(2020, 1),
            TreatmentHistoryDetails {
                stop: date(2022, 1),
                stop_reason: Some(StopReason::Toxicity),
                ..Default::default()
            },
        );
        assert_eq!(resulted_in_progression(&toxicity), Some(false));
    }

    #[test]
    fn long_treatment_without_stop_reason_is_assumed_progression() {
        let long = with_details(
            date(2020, 1),
            TreatmentHistoryDetails {
                stop: date(2020, 12),
                ..Default::default()
            },
        );
        assert_eq!(resulted_in_progression(&long), Some(true));

        let short = with_details(
            date(2020, 1),
            TreatmentHistoryDetails {
                stop: date(2020, 4),
                ..Default::default()
            },
        );
        assert_eq!(resulted_in_progression(&short), None);
    }

    #[test]
    fn unknown_everything_is_undetermined() {
        let bare = entry([drug_treatment("X", TreatmentCategory::Chemotherapy, [])]);
        assert_eq!(resulted_in_progression(&bare), None);
    }
}
