use serde::{Deserialize, Serialize};

/// Three-valued outcome of checking a treatment against a criterion.
///
/// `Ambiguous` means the record lacks the detail needed to decide, e.g. a drug without a declared
/// type when the criterion asks for a specific type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Match,
    NoMatch,
    Ambiguous,
}

impl Classification {
    pub fn is_match(self) -> bool {
        self == Classification::Match
    }

    pub fn is_ambiguous(self) -> bool {
        self == Classification::Ambiguous
    }
}

impl From<bool> for Classification {
    fn from(value: bool) -> Self {
        if value {
            Classification::Match
        } else {
            Classification::NoMatch
        }
    }
}

impl From<Option<bool>> for Classification {
    fn from(value: Option<bool>) -> Self {
        value.map_or(Classification::Ambiguous, Classification::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_from_tri_state_bool() {
        assert_eq!(Classification::from(true), Classification::Match);
        assert_eq!(Classification::from(false), Classification::NoMatch);
        assert_eq!(Classification::from(Some(true)), Classification::Match);
        assert_eq!(Classification::from(None), Classification::Ambiguous);
    }
}
