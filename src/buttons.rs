//! Held-button tracking.
//!
//! Each profile owns one [`ButtonStateTracker`]. Membership answers the
//! "is a modifier held" question for dial/wheel handlers; a control in the set
//! was pressed and has not been released since.

use std::collections::BTreeSet;

use crate::error::DispatchError;

/// What to do when a press arrives for a control that is already held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PressPolicy {
    /// Repeat presses are absorbed (set insert).
    #[default]
    Permissive,
    /// Repeat presses fail with [`DispatchError::AlreadyHeld`].
    Strict,
}

/// Set of currently held controls.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ButtonStateTracker {
    held: BTreeSet<String>,
    policy: PressPolicy,
}

impl ButtonStateTracker {
    pub fn new(policy: PressPolicy) -> Self {
        Self {
            held: BTreeSet::new(),
            policy,
        }
    }

    /// Mark `control` as held.
    pub fn press(&mut self, control: &str) -> Result<(), DispatchError> {
        let inserted = self.held.insert(control.to_string());
        if !inserted && self.policy == PressPolicy::Strict {
            return Err(DispatchError::AlreadyHeld {
                control: control.to_string(),
            });
        }
        Ok(())
    }

    /// Clear `control`. Releasing a control that is not held is an error.
    pub fn release(&mut self, control: &str) -> Result<(), DispatchError> {
        if self.held.remove(control) {
            Ok(())
        } else {
            Err(DispatchError::InvalidState {
                control: control.to_string(),
            })
        }
    }

    #[inline]
    pub fn state(&self, control: &str) -> bool {
        self.held.contains(control)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    /// Iterate held controls in name order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.held.iter().map(String::as_str)
    }
}
