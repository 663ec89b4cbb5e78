//! Treatment matcher.
//!
//! A [`TreatmentMatcher`] is the validated predicate rules hand to the stage decomposer and the
//! since-date checks. It is either a list of specific treatments, or a category narrowed by
//! optional types. A matcher naming neither is rejected at construction.

use std::collections::BTreeSet;
use std::fmt;

use crate::treatment::{Treatment, TreatmentCategory, TreatmentType};
use crate::{EngineError, EngineResult};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreatmentMatcher {
    /// Specific treatments, matched by name ignoring case.
    Treatments(BTreeSet<String>),
    /// A category, optionally narrowed to treatments with at least one of `types`.
    Category {
        category: TreatmentCategory,
        types: Option<BTreeSet<TreatmentType>>,
    },
}

impl TreatmentMatcher {
    /// Creates a new `TreatmentMatcher`.
    ///
    /// Target treatments take precedence over the category.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::AmbiguousCriterion` when neither target treatments nor a category
    /// are given, when the target treatment list is empty, or when a category comes with an
    /// empty type set.
    pub fn new(
        target_treatments: Option<Vec<String>>,
        category: Option<TreatmentCategory>,
        types: Option<BTreeSet<TreatmentType>>,
    ) -> EngineResult<Self> {
        match (target_treatments, category) {
            (Some(names), _) => {
                let names: BTreeSet<String> = names
                    .iter()
                    .map(|name| name.trim().to_lowercase())
                    .filter(|name| !name.is_empty())
                    .collect();
                if names.is_empty() {
                    return Err(EngineError::AmbiguousCriterion);
                }
                Ok(TreatmentMatcher::Treatments(names))
            }
            (None, Some(_)) if types.as_ref().is_some_and(BTreeSet::is_empty) => {
                Err(EngineError::AmbiguousCriterion)
            }
            (None, Some(category)) => Ok(TreatmentMatcher::Category { category, types }),
            (None, None) => Err(EngineError::AmbiguousCriterion),
        }
    }

    pub fn matches(&self, treatment: &Treatment) -> bool {
        match self {
            TreatmentMatcher::Treatments(names) => {
                names.contains(&treatment.name().to_lowercase())
            }
            TreatmentMatcher::Category { category, types } => {
                treatment.has_category(*category)
                    && types
                        .as_ref()
                        .map_or(true, |types| !treatment.types().is_disjoint(types))
            }
        }
    }
}

impl fmt::Display for TreatmentMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreatmentMatcher::Treatments(names) => {
                write!(f, "{}", names.iter().cloned().collect::<Vec<_>>().join(" or "))
            }
            TreatmentMatcher::Category { category, types } => match types {
                Some(types) if !types.is_empty() => {
                    let types: Vec<String> = types.iter().map(ToString::to_string).collect();
                    write!(f, "{} of type {}", category.display(), types.join(" or "))
                }
                _ => write!(f, "{}", category.display()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::drug_treatment;
    use crate::treatment::DrugType;

    #[test]
    fn rejects_criterion_without_treatments_or_category() {
        let err = TreatmentMatcher::new(None, None, None).expect_err("should reject");
        assert!(matches!(err, EngineError::AmbiguousCriterion));

        let err = TreatmentMatcher::new(Some(vec![" ".into()]), None, None)
            .expect_err("should reject empty names");
        assert!(matches!(err, EngineError::AmbiguousCriterion));
    }

    #[test]
    fn rejects_category_with_empty_type_set() {
        let err = TreatmentMatcher::new(
            None,
            Some(TreatmentCategory::Chemotherapy),
            Some(BTreeSet::new()),
        )
        .expect_err("should reject empty types");
        assert!(matches!(err, EngineError::AmbiguousCriterion));
    }

    #[test]
    fn target_treatments_take_precedence_and_ignore_case() {
        let matcher = TreatmentMatcher::new(
            Some(vec!["Pembrolizumab".into()]),
            Some(TreatmentCategory::Chemotherapy),
            None,
        )
        .expect("matcher");

        assert!(matcher.matches(&drug_treatment(
            "PEMBROLIZUMAB",
            TreatmentCategory::Immunotherapy,
            []
        )));
        assert!(!matcher.matches(&drug_treatment("CISPLATIN", TreatmentCategory::Chemotherapy, [])));
    }

    #[test]
    fn category_with_types_needs_an_intersecting_type() {
        let matcher = TreatmentMatcher::new(
            None,
            Some(TreatmentCategory::Chemotherapy),
            Some(BTreeSet::from([TreatmentType::Drug(DrugType::Taxane)])),
        )
        .expect("matcher");

        assert!(matcher.matches(&drug_treatment(
            "PACLITAXEL",
            TreatmentCategory::Chemotherapy,
            [DrugType::Taxane]
        )));
        assert!(!matcher.matches(&drug_treatment(
            "CISPLATIN",
            TreatmentCategory::Chemotherapy,
            [DrugType::PlatinumCompound]
        )));
        assert!(!matcher.matches(&drug_treatment(
            "DOCETAXEL",
            TreatmentCategory::TargetedTherapy,
            [DrugType::Taxane]
        )));
    }

    #[test]
    fn displays_matcher() {
        let matcher =
            TreatmentMatcher::new(None, Some(TreatmentCategory::Immunotherapy), None).expect("ok");
        assert_eq!(matcher.to_string(), "Immunotherapy");

        let typed = TreatmentMatcher::new(
            None,
            Some(TreatmentCategory::Immunotherapy),
            Some(BTreeSet::from([TreatmentType::Drug(DrugType::AntiPd1)])),
        )
        .expect("ok");
        assert_eq!(typed.to_string(), "Immunotherapy of type drug:anti_pd1");
    }
}
