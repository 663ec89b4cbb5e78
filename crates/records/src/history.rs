//! Treatment history YAML wire model and translation helpers.
//!
//! Responsibilities:
//! - Define a strict wire model for a patient's treatment history document
//! - Translate between the wire model and validated `treatline-core` entries
//! - Report schema mismatches with the path of the failing field
//!
//! Notes:
//! - Dates are written as `YYYY-MM`, `YYYY`, `?-MM` or `unknown`; a bare integer year is accepted
//! - `intents` and `body_locations` keep the difference between "not recorded" (key absent) and
//!   "recorded as none" (empty list)

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use treatline_core::{
    Drug, DrugTreatment, DrugType, Intent, OtherTreatment, OtherTreatmentType, Radiotherapy,
    RadiotherapyType, StopReason, Treatment, TreatmentCategory, TreatmentHistoryDetails,
    TreatmentHistoryEntry, TreatmentResponse, TreatmentStage,
};
use treatline_types::PartialDate;

use crate::{RecordsError, RecordsResult};

// ============================================================================
// Public facade
// ============================================================================

/// Treatment history document operations.
///
/// All methods are associated functions.
pub struct TreatmentHistoryYaml;

impl TreatmentHistoryYaml {
    /// Parse a treatment history document from YAML text.
    ///
    /// This uses `serde_path_to_error` to surface a best-effort "path"
    /// (e.g. `treatment_history[1].treatments[0].drugs[0].category`) to the failing field.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError`] if:
    /// - the text is not YAML at all ([`RecordsError::InvalidYaml`]),
    /// - the YAML does not match the wire schema, has unknown keys or wrongly typed fields,
    /// - a date cannot be read as a partial date,
    /// - an entry or stage holds no treatment,
    /// - a trial acronym is given for an entry not marked as a trial.
    pub fn parse(yaml_text: &str) -> RecordsResult<Vec<TreatmentHistoryEntry>> {
        // Syntax errors are reported as such, before any schema check.
        serde_yaml::from_str::<serde_yaml::Value>(yaml_text)?;

        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let wire = match serde_path_to_error::deserialize::<_, TreatmentHistoryWire>(deserializer)
        {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(RecordsError::Translation(format!(
                    "Treatment history schema mismatch at {path}: {source}"
                )));
            }
        };

        let entries = wire_to_domain(wire)?;
        tracing::debug!(entries = entries.len(), "parsed treatment history");
        Ok(entries)
    }

    /// Render treatment history entries as YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError`] if serialisation fails.
    pub fn render(entries: &[TreatmentHistoryEntry]) -> RecordsResult<String> {
        let wire = domain_to_wire(entries);
        serde_yaml::to_string(&wire).map_err(|e| {
            RecordsError::Translation(format!("Failed to serialise treatment history: {e}"))
        })
    }

    /// Read and parse a treatment history document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`RecordsError::Io`] if the file cannot be read, otherwise as [`Self::parse`].
    pub fn load_file(path: impl AsRef<Path>) -> RecordsResult<Vec<TreatmentHistoryEntry>> {
        let path = path.as_ref();
        let yaml_text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading treatment history");
        Self::parse(&yaml_text)
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TreatmentHistoryWire {
    #[serde(default)]
    treatment_history: Vec<EntryWire>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntryWire {
    treatments: Vec<TreatmentWire>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    start: Option<DateWire>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    intents: Option<Vec<Intent>>,

    #[serde(default, skip_serializing_if = "is_false")]
    trial: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    trial_acronym: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    stop: Option<DateWire>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    cycles: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    best_response: Option<TreatmentResponse>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    stop_reason: Option<StopReason>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    stop_reason_detail: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    body_locations: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    switch_to: Vec<StageWire>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    maintenance: Option<StageWire>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StageWire {
    treatment: TreatmentWire,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    start: Option<DateWire>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    cycles: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TreatmentWire {
    Drug(DrugTreatmentWire),
    Radiotherapy(RadiotherapyWire),
    Other(OtherTreatmentWire),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct DrugTreatmentWire {
    name: String,

    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    systemic: bool,

    drugs: Vec<DrugWire>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct DrugWire {
    name: String,
    category: TreatmentCategory,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    types: Vec<DrugType>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RadiotherapyWire {
    name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    radiotherapy_type: Option<RadiotherapyType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    internal: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct OtherTreatmentWire {
    name: String,

    #[serde(default, skip_serializing_if = "is_false")]
    systemic: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    categories: Vec<TreatmentCategory>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    types: Vec<OtherTreatmentType>,
}

/// A date as written in YAML: a plain year, or a `YYYY-MM`-style string.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum DateWire {
    Year(i32),
    Text(String),
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn date_from_wire(wire: Option<DateWire>, path: &str) -> RecordsResult<PartialDate> {
    match wire {
        None => Ok(PartialDate::UNKNOWN),
        Some(DateWire::Year(year)) => Ok(PartialDate::of_year(year)),
        Some(DateWire::Text(text)) => text
            .parse()
            .map_err(|e| RecordsError::Translation(format!("Invalid date at {path}: {e}"))),
    }
}

fn date_to_wire(date: PartialDate) -> Option<DateWire> {
    match (date.year(), date.month()) {
        (None, None) => None,
        (Some(year), None) => Some(DateWire::Year(year)),
        _ => Some(DateWire::Text(date.to_string())),
    }
}

fn treatment_from_wire(wire: TreatmentWire) -> Treatment {
    match wire {
        TreatmentWire::Drug(drug) => Treatment::Drug(DrugTreatment {
            name: drug.name,
            is_systemic: drug.systemic,
            drugs: drug
                .drugs
                .into_iter()
                .map(|d| Drug::new(d.name, d.category, d.types))
                .collect(),
        }),
        TreatmentWire::Radiotherapy(radiotherapy) => Treatment::Radiotherapy(Radiotherapy {
            name: radiotherapy.name,
            radiotherapy_type: radiotherapy.radiotherapy_type,
            is_internal: radiotherapy.internal,
        }),
        TreatmentWire::Other(other) => Treatment::Other(OtherTreatment {
            name: other.name,
            is_systemic: other.systemic,
            categories: other.categories.into_iter().collect(),
            types: other.types.into_iter().collect(),
        }),
    }
}

fn treatment_to_wire(treatment: &Treatment) -> TreatmentWire {
    match treatment {
        Treatment::Drug(drug) => TreatmentWire::Drug(DrugTreatmentWire {
            name: drug.name.clone(),
            systemic: drug.is_systemic,
            drugs: drug
                .drugs
                .iter()
                .map(|d| DrugWire {
                    name: d.name.clone(),
                    category: d.category,
                    types: d.drug_types.iter().copied().collect(),
                })
                .collect(),
        }),
        Treatment::Radiotherapy(radiotherapy) => TreatmentWire::Radiotherapy(RadiotherapyWire {
            name: radiotherapy.name.clone(),
            radiotherapy_type: radiotherapy.radiotherapy_type,
            internal: radiotherapy.is_internal,
        }),
        Treatment::Other(other) => TreatmentWire::Other(OtherTreatmentWire {
            name: other.name.clone(),
            systemic: other.is_systemic,
            categories: other.categories.iter().copied().collect(),
            types: other.types.iter().copied().collect(),
        }),
    }
}

fn stage_from_wire(wire: StageWire, path: &str) -> RecordsResult<TreatmentStage> {
    Ok(TreatmentStage {
        treatment: treatment_from_wire(wire.treatment),
        start: date_from_wire(wire.start, &format!("{path}.start"))?,
        cycles: wire.cycles,
    })
}

fn stage_to_wire(stage: &TreatmentStage) -> StageWire {
    StageWire {
        treatment: treatment_to_wire(&stage.treatment),
        start: date_to_wire(stage.start),
        cycles: stage.cycles,
    }
}

fn entry_from_wire(wire: EntryWire, index: usize) -> RecordsResult<TreatmentHistoryEntry> {
    let path = format!("treatment_history[{index}]");

    if wire.trial_acronym.is_some() && !wire.trial {
        return Err(RecordsError::InvalidInput(format!(
            "{path}: trial_acronym given for an entry not marked as a trial"
        )));
    }

    let has_details = wire.stop.is_some()
        || wire.cycles.is_some()
        || wire.best_response.is_some()
        || wire.stop_reason.is_some()
        || wire.stop_reason_detail.is_some()
        || wire.body_locations.is_some()
        || !wire.switch_to.is_empty()
        || wire.maintenance.is_some();

    let mut entry = TreatmentHistoryEntry::new(wire.treatments.into_iter().map(treatment_from_wire))?
        .with_start(date_from_wire(wire.start, &format!("{path}.start"))?)
        .with_intents(wire.intents.map(|intents| intents.into_iter().collect()));

    if wire.trial {
        entry = entry.as_trial(wire.trial_acronym);
    }

    if has_details {
        let switch_to_treatments = wire
            .switch_to
            .into_iter()
            .enumerate()
            .map(|(i, stage)| stage_from_wire(stage, &format!("{path}.switch_to[{i}]")))
            .collect::<RecordsResult<Vec<_>>>()?;
        let maintenance_treatment = wire
            .maintenance
            .map(|stage| stage_from_wire(stage, &format!("{path}.maintenance")))
            .transpose()?;

        entry = entry.with_details(TreatmentHistoryDetails {
            stop: date_from_wire(wire.stop, &format!("{path}.stop"))?,
            cycles: wire.cycles,
            best_response: wire.best_response,
            stop_reason: wire.stop_reason,
            stop_reason_detail: wire.stop_reason_detail,
            body_locations: wire
                .body_locations
                .map(|locations| locations.into_iter().collect::<BTreeSet<_>>()),
            switch_to_treatments,
            maintenance_treatment,
        });
    }

    Ok(entry)
}

fn entry_to_wire(entry: &TreatmentHistoryEntry) -> EntryWire {
    let details = entry.details();
    EntryWire {
        treatments: entry.treatments().iter().map(treatment_to_wire).collect(),
        start: date_to_wire(entry.start()),
        intents: entry
            .intents()
            .map(|intents| intents.iter().copied().collect()),
        trial: entry.is_trial(),
        trial_acronym: entry.trial_acronym().map(str::to_owned),
        // Recorded details always carry a stop, so `Some(details)` survives a round trip.
        stop: details.map(|d| {
            date_to_wire(d.stop).unwrap_or_else(|| DateWire::Text(PartialDate::UNKNOWN.to_string()))
        }),
        cycles: details.and_then(|d| d.cycles),
        best_response: details.and_then(|d| d.best_response),
        stop_reason: details.and_then(|d| d.stop_reason),
        stop_reason_detail: details.and_then(|d| d.stop_reason_detail.clone()),
        body_locations: details.and_then(|d| {
            d.body_locations
                .as_ref()
                .map(|locations| locations.iter().cloned().collect())
        }),
        switch_to: details
            .map(|d| d.switch_to_treatments.iter().map(stage_to_wire).collect())
            .unwrap_or_default(),
        maintenance: details
            .and_then(|d| d.maintenance_treatment.as_ref())
            .map(stage_to_wire),
    }
}

fn wire_to_domain(wire: TreatmentHistoryWire) -> RecordsResult<Vec<TreatmentHistoryEntry>> {
    wire.treatment_history
        .into_iter()
        .enumerate()
        .map(|(index, entry)| entry_from_wire(entry, index))
        .collect()
}

fn domain_to_wire(entries: &[TreatmentHistoryEntry]) -> TreatmentHistoryWire {
    TreatmentHistoryWire {
        treatment_history: entries.iter().map(entry_to_wire).collect(),
    }
}
