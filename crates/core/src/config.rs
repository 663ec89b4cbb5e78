//! Engine configuration.
//!
//! Configuration is resolved once at process startup and then passed into the engine. The core
//! never reads environment variables itself; callers hand in the raw value (see
//! [`likely_trial_categories_from_env_value`]) so that evaluation stays deterministic across
//! threads and test harnesses.

use std::collections::BTreeSet;

use crate::constants::DEFAULT_UNLIKELY_TRIAL_CATEGORIES;
use crate::treatment::TreatmentCategory;
use crate::{EngineError, EngineResult};

/// Engine configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    likely_trial_categories: BTreeSet<TreatmentCategory>,
}

impl EngineConfig {
    /// Create a new `EngineConfig`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidConfig` if the allow-list is empty, since that would silently
    /// disable every possible-trial match.
    pub fn new(
        likely_trial_categories: impl IntoIterator<Item = TreatmentCategory>,
    ) -> EngineResult<Self> {
        let likely_trial_categories: BTreeSet<_> = likely_trial_categories.into_iter().collect();
        if likely_trial_categories.is_empty() {
            return Err(EngineError::InvalidConfig(
                "likely trial categories cannot be empty".into(),
            ));
        }
        Ok(Self {
            likely_trial_categories,
        })
    }

    pub fn likely_trial_categories(&self) -> &BTreeSet<TreatmentCategory> {
        &self.likely_trial_categories
    }

    /// Whether an under-specified trial entry may count towards `category`.
    pub fn category_allows_trial_matches(&self, category: TreatmentCategory) -> bool {
        self.likely_trial_categories.contains(&category)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            likely_trial_categories: TreatmentCategory::ALL
                .into_iter()
                .filter(|c| !DEFAULT_UNLIKELY_TRIAL_CATEGORIES.contains(c))
                .collect(),
        }
    }
}

/// Build an `EngineConfig` from an optional comma-separated list of category names.
///
/// If `value` is `None` or empty/whitespace, returns the default configuration.
///
/// # Errors
///
/// Returns `EngineError::UnknownName` for an unrecognised category name.
pub fn likely_trial_categories_from_env_value(value: Option<String>) -> EngineResult<EngineConfig> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(value) = value else {
        return Ok(EngineConfig::default());
    };

    let categories = value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::parse::<TreatmentCategory>)
        .collect::<EngineResult<Vec<_>>>()?;

    EngineConfig::new(categories)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_excludes_unlikely_trial_categories() {
        let config = EngineConfig::default();
        assert!(config.category_allows_trial_matches(TreatmentCategory::Chemotherapy));
        assert!(config.category_allows_trial_matches(TreatmentCategory::Immunotherapy));
        assert!(config.category_allows_trial_matches(TreatmentCategory::TargetedTherapy));
        for category in DEFAULT_UNLIKELY_TRIAL_CATEGORIES {
            assert!(!config.category_allows_trial_matches(category));
        }
    }

    #[test]
    fn rejects_empty_allow_list() {
        let err = EngineConfig::new([]).expect_err("should reject empty list");
        assert!(matches!(err, EngineError::InvalidConfig(msg) if msg.contains("cannot be empty")));
    }

    #[test]
    fn blank_env_value_falls_back_to_default() {
        assert_eq!(
            likely_trial_categories_from_env_value(None).expect("default"),
            EngineConfig::default()
        );
        assert_eq!(
            likely_trial_categories_from_env_value(Some("   ".into())).expect("default"),
            EngineConfig::default()
        );
    }

    #[test]
    fn parses_comma_separated_env_value() {
        let config = likely_trial_categories_from_env_value(Some(
            "chemotherapy, transplantation".into(),
        ))
        .expect("parse");
        assert!(config.category_allows_trial_matches(TreatmentCategory::Transplantation));
        assert!(!config.category_allows_trial_matches(TreatmentCategory::Immunotherapy));
    }

    #[test]
    fn rejects_unknown_category_in_env_value() {
        let err = likely_trial_categories_from_env_value(Some("chemotherapy,teleportation".into()))
            .expect_err("should reject unknown name");
        assert!(matches!(err, EngineError::UnknownName(name) if name == "teleportation"));
    }
}
