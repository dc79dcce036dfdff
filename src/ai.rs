//! Behavior counters consulted by AI controllers
//!
//! Target selection and movement decisions live outside this crate; the
//! controller keeps named counters and asks whether one has reached a multiple
//! of some period.

use serde::{Deserialize, Serialize};

/// A named counter advanced by an AI controller
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AiBehavior {
    pub label: String,
    pub value: i64,
}

impl AiBehavior {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: 0,
        }
    }

    /// True when `value` is a multiple of `period`. A zero period never matches.
    pub fn is_mod_of(&self, period: i64) -> bool {
        if period == 0 {
            return false;
        }
        self.value % period == 0
    }

    pub fn advance(&mut self) {
        self.value = self.value.wrapping_add(1);
    }
}

/// First behavior carrying `label`
pub fn find_behavior<'a>(behaviors: &'a [AiBehavior], label: &str) -> Option<&'a AiBehavior> {
    behaviors.iter().find(|b| b.label == label)
}

/// Mutable variant of [`find_behavior`]
pub fn find_behavior_mut<'a>(
    behaviors: &'a mut [AiBehavior],
    label: &str,
) -> Option<&'a mut AiBehavior> {
    behaviors.iter_mut().find(|b| b.label == label)
}
