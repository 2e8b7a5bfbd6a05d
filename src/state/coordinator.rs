//! Cross-highlighting between preview blanks and form controls
//!
//! Blanks and controls are linked only by canonical key. Each pair moves
//! `Idle → Highlighted` on pointer enter and back on pointer leave; a click
//! expands the control's section if it is collapsed, then focuses it.

use thiserror::Error;

/// Position of a control inside the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlLocation {
    pub section: usize,
    pub index: usize,
}

/// A rendered blank names a key that no form control answers to
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no form control for canonical key {key}")]
pub struct LinkResolutionError {
    pub key: String,
}

/// What the coordinator needs from the form
#[cfg_attr(test, mockall::automock)]
pub trait ControlSurface {
    /// Find the control for a canonical key
    fn locate(&self, key: &str) -> Option<ControlLocation>;

    fn is_section_expanded(&self, section: usize) -> bool;

    /// Expand a section; `false` when it has no trigger to expand it with
    fn expand_section(&mut self, section: usize) -> bool;

    fn focus_control(&mut self, location: ControlLocation);

    fn set_highlight(&mut self, location: ControlLocation, on: bool);
}

/// Link state of one blank/control pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Idle,
    Highlighted,
}

/// Result of clicking a blank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickOutcome {
    pub location: ControlLocation,
    /// The section had to be expanded first
    pub expanded: bool,
}

/// Tracks which pair is highlighted and routes pointer events to the form
///
/// A pointer is over at most one blank, so at most one pair is highlighted.
#[derive(Debug, Clone, Default)]
pub struct HighlightCoordinator {
    highlighted: Option<(String, ControlLocation)>,
}

impl HighlightCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_of(&self, key: &str) -> LinkState {
        match &self.highlighted {
            Some((current, _)) if current == key => LinkState::Highlighted,
            _ => LinkState::Idle,
        }
    }

    #[cfg(test)]
    pub fn highlighted_key(&self) -> Option<&str> {
        self.highlighted.as_ref().map(|(key, _)| key.as_str())
    }

    fn resolve(surface: &impl ControlSurface, key: &str) -> Result<ControlLocation, LinkResolutionError> {
        surface.locate(key).ok_or_else(|| LinkResolutionError {
            key: key.to_string(),
        })
    }

    /// Pointer entered the blank for `key`
    pub fn pointer_enter(
        &mut self,
        key: &str,
        surface: &mut impl ControlSurface,
    ) -> Result<(), LinkResolutionError> {
        if key.is_empty() || self.state_of(key) == LinkState::Highlighted {
            return Ok(());
        }
        let location = Self::resolve(surface, key)?;
        self.clear(surface);
        surface.set_highlight(location, true);
        self.highlighted = Some((key.to_string(), location));
        Ok(())
    }

    /// Pointer left the blank for `key`
    pub fn pointer_leave(&mut self, key: &str, surface: &mut impl ControlSurface) {
        if self.state_of(key) == LinkState::Highlighted {
            self.clear(surface);
        }
    }

    /// Drop any highlight, e.g. when the pointer leaves the preview
    pub fn clear(&mut self, surface: &mut impl ControlSurface) {
        if let Some((_, location)) = self.highlighted.take() {
            surface.set_highlight(location, false);
        }
    }

    /// Blank for `key` was clicked; `None` for inert blanks
    pub fn click(
        &mut self,
        key: &str,
        surface: &mut impl ControlSurface,
    ) -> Result<Option<ClickOutcome>, LinkResolutionError> {
        if key.is_empty() {
            return Ok(None);
        }
        let location = Self::resolve(surface, key)?;

        let mut expanded = false;
        if !surface.is_section_expanded(location.section) {
            expanded = surface.expand_section(location.section);
            if !expanded {
                tracing::warn!(
                    "No trigger to expand section {} for {key}; focusing anyway",
                    location.section
                );
            }
        }

        surface.focus_control(location);
        Ok(Some(ClickOutcome { location, expanded }))
    }
}
