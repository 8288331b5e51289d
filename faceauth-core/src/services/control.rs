//! Action controls (buttons) and their loading state

use std::cell::Cell;

use crate::domain::result::{Error, Result};

pub const LOADING_LABEL: &str = "Loading...";

/// A button that triggers a backend action
///
/// While an action runs the control is disabled and shows
/// [`LOADING_LABEL`]; the [`LoadingGuard`] returned by [`Control::begin`]
/// puts it back when dropped, whichever way the action ends.
#[derive(Debug)]
pub struct Control {
    label: &'static str,
    enabled: Cell<bool>,
    loading: Cell<bool>,
    visible: Cell<bool>,
}

impl Control {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            enabled: Cell::new(true),
            loading: Cell::new(false),
            visible: Cell::new(true),
        }
    }

    /// A control that starts hidden
    pub fn hidden(label: &'static str) -> Self {
        let control = Self::new(label);
        control.visible.set(false);
        control
    }

    pub fn label(&self) -> &'static str {
        if self.loading.get() {
            LOADING_LABEL
        } else {
            self.label
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get() && !self.loading.get()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    /// Enter the loading state, or `Error::Busy` if an action is already running
    pub fn begin(&self) -> Result<LoadingGuard<'_>> {
        if self.loading.get() {
            return Err(Error::Busy);
        }
        let was_enabled = self.enabled.get();
        self.loading.set(true);
        self.enabled.set(false);
        Ok(LoadingGuard {
            control: self,
            was_enabled,
        })
    }
}

pub struct LoadingGuard<'a> {
    control: &'a Control,
    was_enabled: bool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.control.loading.set(false);
        self.control.enabled.set(self.was_enabled);
    }
}
