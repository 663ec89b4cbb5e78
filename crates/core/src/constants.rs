//! Constants used throughout the treatline core crate.

use crate::treatment::TreatmentCategory;

/// Categories for which an under-specified trial entry is not considered a plausible match.
///
/// Trials rarely deliver these, so reporting "possibly matched by a trial" for them would flood
/// unrelated criteria with undetermined results.
pub const DEFAULT_UNLIKELY_TRIAL_CATEGORIES: [TreatmentCategory; 4] = [
    TreatmentCategory::Transplantation,
    TreatmentCategory::Radiotherapy,
    TreatmentCategory::SupportiveTreatment,
    TreatmentCategory::Surgery,
];

/// A treatment with unknown stop reason that lasted longer than this is assumed to have
/// stopped because of progression (half a year).
pub const MIN_WEEKS_TO_ASSUME_STOP_DUE_TO_PROGRESSION: i64 = 26;

/// Separator used when joining treatment names of an entry.
pub const TREATMENT_NAME_DELIMITER: &str = ";";

/// Environment variable holding a comma-separated list of likely trial categories.
pub const LIKELY_TRIAL_CATEGORIES_ENV: &str = "TREATLINE_LIKELY_TRIAL_CATEGORIES";
