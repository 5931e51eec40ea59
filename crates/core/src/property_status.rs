//! Property lifecycle statuses and the legal transition graph.
//!
//! The graph is fixed and tenant-independent. It is the first gate of every
//! status change; tenant business rules are only consulted once a transition
//! is structurally valid.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of a listed property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    Draft,
    Active,
    UnderOffer,
    Sold,
    Withdrawn,
}

impl PropertyStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [PropertyStatus; 5] = [
        Self::Draft,
        Self::Active,
        Self::UnderOffer,
        Self::Sold,
        Self::Withdrawn,
    ];

    /// Return the wire-format string for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::UnderOffer => "under_offer",
            Self::Sold => "sold",
            Self::Withdrawn => "withdrawn",
        }
    }

    /// Parse from a wire-format string.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "under_offer" => Ok(Self::UnderOffer),
            "sold" => Ok(Self::Sold),
            "withdrawn" => Ok(Self::Withdrawn),
            _ => Err(CoreError::Validation(format!(
                "Invalid property status: '{s}'. Must be one of: draft, active, \
                 under_offer, sold, withdrawn"
            ))),
        }
    }

    /// Statuses reachable from `self` in a single transition.
    pub fn allowed_transitions(&self) -> &'static [PropertyStatus] {
        match self {
            Self::Draft => &[Self::Active, Self::Withdrawn],
            Self::Active => &[Self::UnderOffer, Self::Withdrawn],
            Self::UnderOffer => &[Self::Sold, Self::Active, Self::Withdrawn],
            Self::Sold => &[],
            Self::Withdrawn => &[Self::Draft],
        }
    }

    /// A terminal status has no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }
}

impl std::fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `from -> to` is an edge of the status graph.
///
/// Self-loops are never valid.
pub fn is_valid_transition(from: PropertyStatus, to: PropertyStatus) -> bool {
    from.allowed_transitions().contains(&to)
}

/// Possible next statuses from `from`, in graph order.
pub fn possible_transitions(from: PropertyStatus) -> Vec<PropertyStatus> {
    from.allowed_transitions().to_vec()
}

/// Check a transition and produce a message naming both statuses on failure.
pub fn validate_transition(from: PropertyStatus, to: PropertyStatus) -> Result<(), String> {
    if is_valid_transition(from, to) {
        Ok(())
    } else {
        let allowed: Vec<&str> = from.allowed_transitions().iter().map(|s| s.as_str()).collect();
        let allowed = if allowed.is_empty() {
            "none".to_string()
        } else {
            allowed.join(", ")
        };
        Err(format!(
            "Invalid status transition from '{from}' to '{to}'. Allowed from '{from}': {allowed}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PropertyStatus::*;

    #[test]
    fn test_status_strings_round_trip() {
        for status in PropertyStatus::ALL {
            assert_eq!(PropertyStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = PropertyStatus::from_str("archived").unwrap_err();
        assert!(err.to_string().contains("Invalid property status"));
    }

    #[test]
    fn test_structural_closure_over_all_pairs() {
        let valid = [
            (Draft, Active),
            (Draft, Withdrawn),
            (Active, UnderOffer),
            (Active, Withdrawn),
            (UnderOffer, Sold),
            (UnderOffer, Active),
            (UnderOffer, Withdrawn),
            (Withdrawn, Draft),
        ];

        let mut checked = 0;
        for from in PropertyStatus::ALL {
            for to in PropertyStatus::ALL {
                checked += 1;
                assert_eq!(
                    is_valid_transition(from, to),
                    valid.contains(&(from, to)),
                    "unexpected result for {from} -> {to}"
                );
            }
        }
        assert_eq!(checked, 25);
    }

    #[test]
    fn test_sold_is_terminal() {
        assert!(Sold.is_terminal());
        assert!(possible_transitions(Sold).is_empty());
        for to in PropertyStatus::ALL {
            assert!(!is_valid_transition(Sold, to));
        }
    }

    #[test]
    fn test_only_sold_is_terminal() {
        let terminal: Vec<_> = PropertyStatus::ALL
            .into_iter()
            .filter(|s| s.is_terminal())
            .collect();
        assert_eq!(terminal, vec![Sold]);
    }

    #[test]
    fn test_reactivation_loop_is_valid() {
        let path = [Withdrawn, Draft, Active, Withdrawn, Draft];
        for pair in path.windows(2) {
            assert!(is_valid_transition(pair[0], pair[1]));
        }
    }

    #[test]
    fn test_validate_transition_names_both_statuses() {
        let msg = validate_transition(Draft, Sold).unwrap_err();
        assert!(msg.contains("'draft'"));
        assert!(msg.contains("'sold'"));
    }

    #[test]
    fn test_validate_transition_from_terminal_lists_none() {
        let msg = validate_transition(Sold, Active).unwrap_err();
        assert!(msg.ends_with("none"));
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&UnderOffer).unwrap();
        assert_eq!(json, "\"under_offer\"");
    }
}
