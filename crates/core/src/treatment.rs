//! Treatment model.
//!
//! A [`Treatment`] is a closed set of variants (drug-based, radiotherapy, other). Capability
//! queries such as [`Treatment::categories`] and [`Treatment::types`] are answered by exhaustive
//! matching, so adding a variant forces every query to be revisited.
//!
//! Notes:
//! - An empty type set means the type is *unknown*, never "has no type".
//! - All sets are `BTreeSet` so that iteration order, display and equality are deterministic.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::{parse_wire_name, wire_name, EngineError};

/// Broad treatment category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentCategory {
    Chemotherapy,
    TargetedTherapy,
    Immunotherapy,
    HormoneTherapy,
    Radiotherapy,
    Surgery,
    Transplantation,
    Ablation,
    SupportiveTreatment,
    CarT,
    GeneTherapy,
}

impl TreatmentCategory {
    pub const ALL: [TreatmentCategory; 11] = [
        TreatmentCategory::Chemotherapy,
        TreatmentCategory::TargetedTherapy,
        TreatmentCategory::Immunotherapy,
        TreatmentCategory::HormoneTherapy,
        TreatmentCategory::Radiotherapy,
        TreatmentCategory::Surgery,
        TreatmentCategory::Transplantation,
        TreatmentCategory::Ablation,
        TreatmentCategory::SupportiveTreatment,
        TreatmentCategory::CarT,
        TreatmentCategory::GeneTherapy,
    ];

    /// Human readable name.
    pub fn display(self) -> &'static str {
        match self {
            TreatmentCategory::Chemotherapy => "Chemotherapy",
            TreatmentCategory::TargetedTherapy => "Targeted therapy",
            TreatmentCategory::Immunotherapy => "Immunotherapy",
            TreatmentCategory::HormoneTherapy => "Hormone therapy",
            TreatmentCategory::Radiotherapy => "Radiotherapy",
            TreatmentCategory::Surgery => "Surgery",
            TreatmentCategory::Transplantation => "Transplantation",
            TreatmentCategory::Ablation => "Ablation",
            TreatmentCategory::SupportiveTreatment => "Supportive treatment",
            TreatmentCategory::CarT => "CAR-T",
            TreatmentCategory::GeneTherapy => "Gene therapy",
        }
    }
}

/// Mechanism-level type of a drug.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrugType {
    AlkylatingAgent,
    Anthracycline,
    Antimetabolite,
    PlatinumCompound,
    Taxane,
    TopoisomeraseInhibitor,
    VincaAlkaloid,
    AntiPd1,
    AntiPdL1,
    AntiCtla4,
    EgfrInhibitor,
    EgfrAntibody,
    AlkInhibitor,
    Ros1Inhibitor,
    BrafInhibitor,
    MekInhibitor,
    KrasInhibitor,
    Her2Antibody,
    ParpInhibitor,
    VegfAntibody,
    AntibodyDrugConjugate,
    AntiAndrogen,
    AromataseInhibitor,
    Corticosteroid,
}

/// Type of a radiotherapy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiotherapyType {
    Stereotactic,
    Brachytherapy,
    RadioligandTherapy,
    ProtonTherapy,
    Conventional,
}

/// Type of a treatment that is neither a drug nor a radiotherapy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtherTreatmentType {
    Allogenic,
    Autologous,
    CytoreductiveSurgery,
    DebulkingSurgery,
    OtherSurgery,
    Radiofrequency,
    Microwave,
    Cryoablation,
}

/// A treatment type, tagged by the treatment variant it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreatmentType {
    Drug(DrugType),
    Radiotherapy(RadiotherapyType),
    Other(OtherTreatmentType),
}

impl FromStr for TreatmentType {
    type Err = EngineError;

    /// Parses `drug:<type>`, `radiotherapy:<type>` or `other:<type>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, name) = s
            .split_once(':')
            .ok_or_else(|| EngineError::UnknownName(s.to_owned()))?;
        match kind.trim() {
            "drug" => Ok(TreatmentType::Drug(name.parse()?)),
            "radiotherapy" => Ok(TreatmentType::Radiotherapy(name.parse()?)),
            "other" => Ok(TreatmentType::Other(name.parse()?)),
            _ => Err(EngineError::UnknownName(s.to_owned())),
        }
    }
}

impl fmt::Display for TreatmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreatmentType::Drug(t) => write!(f, "drug:{}", wire_name(t)),
            TreatmentType::Radiotherapy(t) => write!(f, "radiotherapy:{}", wire_name(t)),
            TreatmentType::Other(t) => write!(f, "other:{}", wire_name(t)),
        }
    }
}

impl_from_wire_name!(TreatmentCategory, DrugType, RadiotherapyType, OtherTreatmentType);

/// A single drug with its category and mechanism types.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Drug {
    pub name: String,
    pub category: TreatmentCategory,
    #[serde(default)]
    pub drug_types: BTreeSet<DrugType>,
}

impl Drug {
    pub fn new(
        name: impl Into<String>,
        category: TreatmentCategory,
        drug_types: impl IntoIterator<Item = DrugType>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            drug_types: drug_types.into_iter().collect(),
        }
    }
}

/// A treatment made of one or more drugs, e.g. a chemotherapy regimen.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DrugTreatment {
    pub name: String,
    pub drugs: BTreeSet<Drug>,
    pub is_systemic: bool,
}

impl DrugTreatment {
    /// Drug treatments are systemic unless stated otherwise.
    pub fn new(name: impl Into<String>, drugs: impl IntoIterator<Item = Drug>) -> Self {
        Self {
            name: name.into(),
            drugs: drugs.into_iter().collect(),
            is_systemic: true,
        }
    }
}

/// A radiotherapy. Always categorised as radiotherapy and never systemic.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Radiotherapy {
    pub name: String,
    pub radiotherapy_type: Option<RadiotherapyType>,
    /// `None` when it is not recorded whether the radiotherapy was internal.
    pub is_internal: Option<bool>,
}

/// Any other treatment, e.g. surgery, transplantation or an unspecified trial treatment.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OtherTreatment {
    pub name: String,
    pub is_systemic: bool,
    pub categories: BTreeSet<TreatmentCategory>,
    pub types: BTreeSet<OtherTreatmentType>,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Treatment {
    Drug(DrugTreatment),
    Radiotherapy(Radiotherapy),
    Other(OtherTreatment),
}

impl Treatment {
    pub fn name(&self) -> &str {
        match self {
            Treatment::Drug(t) => &t.name,
            Treatment::Radiotherapy(t) => &t.name,
            Treatment::Other(t) => &t.name,
        }
    }

    pub fn is_systemic(&self) -> bool {
        match self {
            Treatment::Drug(t) => t.is_systemic,
            Treatment::Radiotherapy(_) => false,
            Treatment::Other(t) => t.is_systemic,
        }
    }

    pub fn categories(&self) -> BTreeSet<TreatmentCategory> {
        match self {
            Treatment::Drug(t) => t.drugs.iter().map(|d| d.category).collect(),
            Treatment::Radiotherapy(_) => BTreeSet::from([TreatmentCategory::Radiotherapy]),
            Treatment::Other(t) => t.categories.clone(),
        }
    }

    /// Declared types. Empty means the type is unknown.
    pub fn types(&self) -> BTreeSet<TreatmentType> {
        match self {
            Treatment::Drug(t) => t
                .drugs
                .iter()
                .flat_map(|d| d.drug_types.iter().copied().map(TreatmentType::Drug))
                .collect(),
            Treatment::Radiotherapy(t) => t
                .radiotherapy_type
                .map(TreatmentType::Radiotherapy)
                .into_iter()
                .collect(),
            Treatment::Other(t) => t.types.iter().copied().map(TreatmentType::Other).collect(),
        }
    }

    pub fn has_category(&self, category: TreatmentCategory) -> bool {
        self.categories().contains(&category)
    }

    pub fn has_declared_type(&self) -> bool {
        !self.types().is_empty()
    }

    pub fn is_of_type(&self, treatment_type: &TreatmentType) -> bool {
        self.types().contains(treatment_type)
    }

    /// Drugs of a drug treatment; empty for every other variant.
    pub fn drugs(&self) -> impl Iterator<Item = &Drug> {
        let drugs = match self {
            Treatment::Drug(t) => Some(t.drugs.iter()),
            Treatment::Radiotherapy(_) | Treatment::Other(_) => None,
        };
        drugs.into_iter().flatten()
    }

    /// Display form of the name, e.g. `CARBOPLATIN+PACLITAXEL` becomes `Carboplatin+Paclitaxel`.
    pub fn display(&self) -> String {
        self.name()
            .replace('_', " ")
            .split('+')
            .filter(|part| !part.is_empty())
            .map(capitalise)
            .collect::<Vec<_>>()
            .join("+")
    }
}

fn capitalise(part: &str) -> String {
    if part.chars().count() < 2 {
        return part.to_owned();
    }
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
