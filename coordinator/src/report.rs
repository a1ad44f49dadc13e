//! Per-target failure reporting
//!
//! A batch only records failures: a target that does not appear in the
//! report succeeded. [`merge_outcomes`] folds repeated target names into one
//! entry so every report holds at most one entry per target.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetOutcome {
    pub target: String,
    pub status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl TargetOutcome {
    pub fn failure(target: impl Into<String>, details: impl ToString) -> Self {
        Self {
            target: target.into(),
            status: false,
            details: Some(details.to_string()),
        }
    }
}

/// Ordered failures of one batch, at most one entry per target name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchReport {
    outcomes: Vec<TargetOutcome>,
}

impl BatchReport {
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn outcomes(&self) -> &[TargetOutcome] {
        &self.outcomes
    }

    pub fn get(&self, target: &str) -> Option<&TargetOutcome> {
        self.outcomes.iter().find(|o| o.target == target)
    }

    pub fn into_outcomes(self) -> Vec<TargetOutcome> {
        self.outcomes
    }
}

/// Merge outcomes sharing a target name into one entry.
///
/// The first occurrence keeps its position; later details are appended as
/// `"<existing>, <incoming>"` in encounter order.
pub fn merge_outcomes(outcomes: impl IntoIterator<Item = TargetOutcome>) -> BatchReport {
    let mut merged: Vec<TargetOutcome> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for outcome in outcomes {
        match positions.get(&outcome.target) {
            Some(&index) => {
                let existing = &mut merged[index];
                existing.status = false;
                existing.details = match (existing.details.take(), outcome.details) {
                    (Some(current), Some(incoming)) => Some(format!("{}, {}", current, incoming)),
                    (current, incoming) => current.or(incoming),
                };
            }
            None => {
                positions.insert(outcome.target.clone(), merged.len());
                merged.push(outcome);
            }
        }
    }

    BatchReport { outcomes: merged }
}
