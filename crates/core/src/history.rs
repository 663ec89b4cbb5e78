//! Treatment history model.
//!
//! A [`TreatmentHistoryEntry`] is one recorded line of therapy. Its full stage sequence is
//! `[base] ++ switch_to_treatments ++ [maintenance_treatment?]`, where only the base stage uses the
//! entry's own start date.
//!
//! Entries are immutable once built. Fields are private and the builder methods consume `self`,
//! so the engine can only ever derive *new* entries from existing ones.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use treatline_types::PartialDate;

use crate::classification::Classification;
use crate::constants::TREATMENT_NAME_DELIMITER;
use crate::treatment::{Treatment, TreatmentCategory, TreatmentType};
use crate::{EngineError, EngineResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Adjuvant,
    Neoadjuvant,
    Induction,
    Consolidation,
    Maintenance,
    Curative,
    Palliative,
    Chemoradiotherapy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    ProgressiveDisease,
    Toxicity,
    PatientPreference,
    ConditionDeterioration,
    Death,
    Completed,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentResponse {
    ProgressiveDisease,
    StableDisease,
    Mixed,
    PartialResponse,
    NearCompleteResponse,
    CompleteResponse,
    Remission,
}

impl_from_wire_name!(Intent, StopReason, TreatmentResponse);

/// One step after the base stage of a multi-stage line (switch-to or maintenance).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreatmentStage {
    pub treatment: Treatment,
    /// The stage's own start. Unknown dates are not inherited from earlier stages.
    pub start: PartialDate,
    pub cycles: Option<u32>,
}

impl TreatmentStage {
    pub fn new(treatment: Treatment) -> Self {
        Self {
            treatment,
            start: PartialDate::UNKNOWN,
            cycles: None,
        }
    }

    pub fn with_start(self, start: PartialDate) -> Self {
        Self { start, ..self }
    }

    pub fn with_cycles(self, cycles: u32) -> Self {
        Self {
            cycles: Some(cycles),
            ..self
        }
    }
}

/// Outcome and structure details of an entry.
///
/// `body_locations` keeps three states: `None` (unknown), `Some(empty)` (confirmed none) and
/// `Some(non-empty)`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreatmentHistoryDetails {
    pub stop: PartialDate,
    /// Cycles of the base stage.
    pub cycles: Option<u32>,
    pub best_response: Option<TreatmentResponse>,
    pub stop_reason: Option<StopReason>,
    pub stop_reason_detail: Option<String>,
    pub body_locations: Option<BTreeSet<String>>,
    pub switch_to_treatments: Vec<TreatmentStage>,
    pub maintenance_treatment: Option<TreatmentStage>,
}

/// Borrowed view of one stage of an entry's full stage sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageView<'a> {
    pub treatments: Vec<&'a Treatment>,
    pub start: PartialDate,
    pub cycles: Option<u32>,
}

/// One recorded line of therapy.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct TreatmentHistoryEntry {
    treatments: BTreeSet<Treatment>,
    start: PartialDate,
    intents: Option<BTreeSet<Intent>>,
    is_trial: bool,
    trial_acronym: Option<String>,
    details: Option<TreatmentHistoryDetails>,
}

impl TreatmentHistoryEntry {
    /// Creates an entry from its base treatments.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::EmptyEntry` if no treatments are given.
    pub fn new(treatments: impl IntoIterator<Item = Treatment>) -> EngineResult<Self> {
        let treatments: BTreeSet<Treatment> = treatments.into_iter().collect();
        if treatments.is_empty() {
            return Err(EngineError::EmptyEntry);
        }
        Ok(Self {
            treatments,
            start: PartialDate::UNKNOWN,
            intents: None,
            is_trial: false,
            trial_acronym: None,
            details: None,
        })
    }

    pub fn with_start(self, start: PartialDate) -> Self {
        Self { start, ..self }
    }

    /// `Some(empty)` records that the entry explicitly had no intent.
    pub fn with_intents(self, intents: Option<BTreeSet<Intent>>) -> Self {
        Self { intents, ..self }
    }

    pub fn as_trial(self, acronym: Option<String>) -> Self {
        Self {
            is_trial: true,
            trial_acronym: acronym,
            ..self
        }
    }

    pub fn with_details(self, details: TreatmentHistoryDetails) -> Self {
        Self {
            details: Some(details),
            ..self
        }
    }

    /// Base treatments only.
    pub fn treatments(&self) -> &BTreeSet<Treatment> {
        &self.treatments
    }

    pub fn start(&self) -> PartialDate {
        self.start
    }

    pub fn intents(&self) -> Option<&BTreeSet<Intent>> {
        self.intents.as_ref()
    }

    pub fn is_trial(&self) -> bool {
        self.is_trial
    }

    pub fn trial_acronym(&self) -> Option<&str> {
        self.trial_acronym.as_deref()
    }

    pub fn details(&self) -> Option<&TreatmentHistoryDetails> {
        self.details.as_ref()
    }

    pub fn stop(&self) -> PartialDate {
        self.details
            .as_ref()
            .map(|d| d.stop)
            .unwrap_or(PartialDate::UNKNOWN)
    }

    pub fn cycles(&self) -> Option<u32> {
        self.details.as_ref().and_then(|d| d.cycles)
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.details.as_ref().and_then(|d| d.stop_reason)
    }

    pub fn best_response(&self) -> Option<TreatmentResponse> {
        self.details.as_ref().and_then(|d| d.best_response)
    }

    pub fn body_locations(&self) -> Option<&BTreeSet<String>> {
        self.details.as_ref().and_then(|d| d.body_locations.as_ref())
    }

    pub fn switch_to_treatments(&self) -> &[TreatmentStage] {
        self.details
            .as_ref()
            .map(|d| d.switch_to_treatments.as_slice())
            .unwrap_or(&[])
    }

    pub fn maintenance_treatment(&self) -> Option<&TreatmentStage> {
        self.details
            .as_ref()
            .and_then(|d| d.maintenance_treatment.as_ref())
    }

    /// The full stage sequence `[base, switch..., maintenance?]`.
    pub fn stages(&self) -> Vec<StageView<'_>> {
        let base = StageView {
            treatments: self.treatments.iter().collect(),
            start: self.start,
            cycles: self.cycles(),
        };
        let later = self
            .switch_to_treatments()
            .iter()
            .chain(self.maintenance_treatment())
            .map(|stage| StageView {
                treatments: vec![&stage.treatment],
                start: stage.start,
                cycles: stage.cycles,
            });
        std::iter::once(base).chain(later).collect()
    }

    /// Base, switch-to and maintenance treatments.
    pub fn all_treatments(&self) -> BTreeSet<&Treatment> {
        self.treatments
            .iter()
            .chain(self.switch_to_treatments().iter().map(|s| &s.treatment))
            .chain(self.maintenance_treatment().map(|s| &s.treatment))
            .collect()
    }

    pub fn categories(&self) -> BTreeSet<TreatmentCategory> {
        self.all_treatments()
            .into_iter()
            .flat_map(Treatment::categories)
            .collect()
    }

    pub fn is_systemic(&self) -> bool {
        self.all_treatments().iter().any(|t| t.is_systemic())
    }

    /// Sorted distinct treatment names joined by `;`.
    ///
    /// Falls back to the category names when every treatment name is blank, which is common for
    /// trial entries where the exact treatment is withheld.
    pub fn treatment_name(&self) -> String {
        name_or_categories(self.all_treatments(), |t| t.name().to_owned())
    }

    /// Display name of the base treatments.
    pub fn treatment_display(&self) -> String {
        const CHEMO: &str = "chemotherapy";
        const RADIO: &str = "radiotherapy";

        let displays: BTreeSet<String> = self
            .treatments
            .iter()
            .map(|t| t.display().to_lowercase())
            .collect();

        if displays.contains(CHEMO) && displays.contains(RADIO) {
            let remaining: Vec<&Treatment> = self
                .treatments
                .iter()
                .filter(|t| {
                    let display = t.display().to_lowercase();
                    display != CHEMO && display != RADIO
                })
                .collect();
            match remaining.as_slice() {
                [] => return "Chemoradiation".to_owned(),
                [other] if other.has_category(TreatmentCategory::Chemotherapy) => {
                    return format!("Chemoradiation (with {})", other.display())
                }
                [other] => return format!("Chemoradiation and {}", other.display()),
                _ => {}
            }
        }

        name_or_categories(self.treatments.iter().collect(), Treatment::display)
    }

    /// Three-valued type check across all treatments: a match if any treatment has one of
    /// `types`, no match if every treatment has declared types, ambiguous otherwise.
    pub fn matches_type_from_set(&self, types: &BTreeSet<TreatmentType>) -> Classification {
        let all = self.all_treatments();
        if all
            .iter()
            .any(|t| t.types().iter().any(|tt| types.contains(tt)))
        {
            Classification::Match
        } else if all.iter().all(|t| t.has_declared_type()) {
            Classification::NoMatch
        } else {
            Classification::Ambiguous
        }
    }

    /// Same entry restricted to a single collapsed stage.
    pub(crate) fn with_collapsed_stages(
        &self,
        treatments: BTreeSet<Treatment>,
        start: PartialDate,
        stop: PartialDate,
        cycles: Option<u32>,
    ) -> Self {
        let details = match &self.details {
            Some(details) => TreatmentHistoryDetails {
                stop,
                cycles,
                switch_to_treatments: Vec::new(),
                maintenance_treatment: None,
                ..details.clone()
            },
            None => TreatmentHistoryDetails {
                stop,
                cycles,
                ..TreatmentHistoryDetails::default()
            },
        };
        Self {
            treatments,
            start,
            details: Some(details),
            ..self.clone()
        }
    }
}

fn name_or_categories<F>(treatments: BTreeSet<&Treatment>, field: F) -> String
where
    F: Fn(&Treatment) -> String,
{
    let names: BTreeSet<String> = treatments
        .iter()
        .map(|&t| field(t))
        .filter(|name| !name.trim().is_empty())
        .collect();

    if !names.is_empty() {
        return names.into_iter().collect::<Vec<_>>().join(TREATMENT_NAME_DELIMITER);
    }

    let mut categories: Vec<&str> = Vec::new();
    for category in treatments.iter().flat_map(|t| t.categories()) {
        let display = category.display();
        if !categories.contains(&display) {
            categories.push(display);
        }
    }
    categories.join(TREATMENT_NAME_DELIMITER)
}
