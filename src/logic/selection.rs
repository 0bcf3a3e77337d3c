use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether the router is approved to move the selected token. Shared with
/// approval callbacks so a confirmation flips it immediately.
#[derive(Debug, Clone, Default)]
pub struct AllowanceFlag(Arc<AtomicBool>);

impl AllowanceFlag {
    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, allowed: bool) {
        self.0.store(allowed, Ordering::Release);
    }
}

/// The user's pick out of a fetched resource, the amount typed for it, and
/// its allowance. The amount is cleared whenever the selection becomes empty.
/// The allowance belongs to the picked value: a different pick starts
/// unapproved, on a new flag that earlier approval callbacks cannot reach.
#[derive(Debug, Clone)]
pub struct SelectionState<T> {
    selected: Option<T>,
    amount: String,
    allowed: AllowanceFlag,
}

impl<T: PartialEq> SelectionState<T> {
    pub fn select(&mut self, selected: Option<T>) {
        if selected.is_none() {
            self.amount.clear();
        }
        if selected != self.selected {
            self.allowed = AllowanceFlag::default();
        }
        self.selected = selected;
    }
}

impl<T> SelectionState<T> {
    pub fn new() -> Self {
        Self { selected: None, amount: String::new(), allowed: AllowanceFlag::default() }
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.as_ref()
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        self.amount = amount.into();
    }

    pub fn clear_amount(&mut self) {
        self.amount.clear();
    }

    pub fn allowed(&self) -> bool {
        self.allowed.get()
    }

    pub fn set_allowed(&self, allowed: bool) {
        self.allowed.set(allowed);
    }

    /// Handle for an approval success callback.
    pub fn allowance_flag(&self) -> AllowanceFlag {
        self.allowed.clone()
    }
}

impl<T> Default for SelectionState<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clearing_selection_clears_amount() {
        for amount in ["", "0", "1.5", "999999999"] {
            let mut selection = SelectionState::new();
            selection.select(Some("SLP"));
            selection.set_amount(amount);

            selection.select(None);
            assert_eq!(selection.amount(), "");
            assert!(selection.selected().is_none());
        }
    }

    #[test]
    fn test_changing_selection_keeps_amount() {
        let mut selection = SelectionState::new();
        selection.select(Some(1));
        selection.set_amount("2");
        selection.select(Some(2));
        assert_eq!(selection.amount(), "2");
    }

    #[test]
    fn test_allowance_only_set_explicitly() {
        let mut selection = SelectionState::new();
        assert!(!selection.allowed());

        selection.select(Some("SLP"));
        assert!(!selection.allowed());

        let flag = selection.allowance_flag();
        flag.set(true);
        assert!(selection.allowed());
    }

    #[test]
    fn test_new_selection_starts_unapproved() {
        let mut selection = SelectionState::new();
        selection.select(Some("SUSHI"));
        let sushi_flag = selection.allowance_flag();
        sushi_flag.set(true);

        // Re-picking the same value keeps its approval
        selection.select(Some("SUSHI"));
        assert!(selection.allowed());

        selection.select(Some("UNI"));
        assert!(!selection.allowed());

        // A late confirmation for the previous pick does not leak over
        sushi_flag.set(true);
        assert!(!selection.allowed());

        selection.select(None);
        assert!(!selection.allowed());
    }
}
