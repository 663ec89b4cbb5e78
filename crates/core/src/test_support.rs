//! Factories shared by the unit tests of this crate.

use treatline_types::PartialDate;

use crate::history::{TreatmentHistoryEntry, TreatmentStage};
use crate::treatment::{
    Drug, DrugTreatment, DrugType, OtherTreatment, OtherTreatmentType, Treatment, TreatmentCategory,
};

pub fn date(year: i32, month: u32) -> PartialDate {
    PartialDate::year_month(year, month).expect("valid test date")
}

/// A drug treatment holding a single drug of the same name.
pub fn drug_treatment(
    name: &str,
    category: TreatmentCategory,
    types: impl IntoIterator<Item = DrugType>,
) -> Treatment {
    Treatment::Drug(DrugTreatment::new(
        name,
        [Drug::new(name, category, types)],
    ))
}

pub fn other_treatment(
    name: &str,
    is_systemic: bool,
    categories: impl IntoIterator<Item = TreatmentCategory>,
    types: impl IntoIterator<Item = OtherTreatmentType>,
) -> Treatment {
    Treatment::Other(OtherTreatment {
        name: name.to_owned(),
        is_systemic,
        categories: categories.into_iter().collect(),
        types: types.into_iter().collect(),
    })
}

pub fn entry(treatments: impl IntoIterator<Item = Treatment>) -> TreatmentHistoryEntry {
    TreatmentHistoryEntry::new(treatments).expect("non-empty test entry")
}

pub fn stage(treatment: Treatment, start: PartialDate, cycles: Option<u32>) -> TreatmentStage {
    TreatmentStage {
        treatment,
        start,
        cycles,
    }
}
