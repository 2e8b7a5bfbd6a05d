//! Document form: collapsible sections of controls

use super::field::FormControl;
use crate::state::{ControlLocation, ControlSurface};
use crate::template::catalog::DocumentSchema;

/// Height of a control box in rows (borders included)
pub const CONTROL_HEIGHT: u16 = 3;
/// Height of a section header in rows
pub const HEADER_HEIGHT: u16 = 1;

/// A collapsible group of controls
#[derive(Debug, Clone)]
pub struct FormSection {
    pub title: &'static str,
    pub expanded: bool,
    pub controls: Vec<FormControl>,
}

/// One vertical slot of the form panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormRow {
    Header(usize),
    Control(ControlLocation),
}

impl FormRow {
    pub fn height(self) -> u16 {
        match self {
            FormRow::Header(_) => HEADER_HEIGHT,
            FormRow::Control(_) => CONTROL_HEIGHT,
        }
    }
}

/// The form for one document session
///
/// Sections behave as an accordion: expanding one collapses the rest.
#[derive(Debug, Clone)]
pub struct DocumentForm {
    pub sections: Vec<FormSection>,
    pub focus: Option<ControlLocation>,
    /// First visible row of the form panel
    pub scroll: u16,
}

impl DocumentForm {
    pub fn from_schema(schema: &'static DocumentSchema) -> Self {
        let sections = schema
            .sections
            .iter()
            .map(|section| FormSection {
                title: section.title,
                expanded: section.expanded,
                controls: section.fields.iter().map(FormControl::new).collect(),
            })
            .collect();
        Self {
            sections,
            focus: None,
            scroll: 0,
        }
    }

    pub fn control(&self, location: ControlLocation) -> Option<&FormControl> {
        self.sections
            .get(location.section)
            .and_then(|section| section.controls.get(location.index))
    }

    pub fn control_mut(&mut self, location: ControlLocation) -> Option<&mut FormControl> {
        self.sections
            .get_mut(location.section)
            .and_then(|section| section.controls.get_mut(location.index))
    }

    pub fn control_by_key_mut(&mut self, key: &str) -> Option<&mut FormControl> {
        let location = self.locate(key)?;
        self.control_mut(location)
    }

    pub fn focused_control(&self) -> Option<&FormControl> {
        self.focus.and_then(|location| self.control(location))
    }

    pub fn focused_control_mut(&mut self) -> Option<&mut FormControl> {
        self.focus.and_then(|location| self.control_mut(location))
    }

    pub fn focused_key(&self) -> Option<&'static str> {
        self.focused_control().map(FormControl::key)
    }

    /// Open or close a section from its header
    pub fn toggle_section(&mut self, section: usize) {
        let Some(target) = self.sections.get(section) else {
            return;
        };
        if target.expanded {
            self.sections[section].expanded = false;
            if self.focus.is_some_and(|f| f.section == section) {
                self.focus = None;
            }
        } else {
            self.open_section(section);
        }
    }

    fn open_section(&mut self, section: usize) {
        for (i, s) in self.sections.iter_mut().enumerate() {
            s.expanded = i == section;
        }
        if self.focus.is_some_and(|f| f.section != section) {
            self.focus = None;
        }
    }

    /// All controls in form order
    fn locations(&self) -> Vec<ControlLocation> {
        self.sections
            .iter()
            .enumerate()
            .flat_map(|(section, s)| {
                (0..s.controls.len()).map(move |index| ControlLocation { section, index })
            })
            .collect()
    }

    /// Move focus to the next control, opening its section
    pub fn next_control(&mut self) {
        self.step_focus(true);
    }

    pub fn prev_control(&mut self) {
        self.step_focus(false);
    }

    fn step_focus(&mut self, forward: bool) {
        let locations = self.locations();
        if locations.is_empty() {
            return;
        }
        let current = self
            .focus
            .and_then(|focus| locations.iter().position(|l| *l == focus));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => locations.len() - 1,
            (Some(i), true) => (i + 1) % locations.len(),
            (Some(0), false) => locations.len() - 1,
            (Some(i), false) => i - 1,
        };
        let location = locations[next];
        if !self.is_section_expanded(location.section) {
            self.open_section(location.section);
        }
        self.focus = Some(location);
    }

    /// Visible rows, top to bottom
    pub fn rows(&self) -> Vec<FormRow> {
        let mut rows = Vec::new();
        for (section, s) in self.sections.iter().enumerate() {
            rows.push(FormRow::Header(section));
            if s.expanded {
                rows.extend(
                    (0..s.controls.len())
                        .map(|index| FormRow::Control(ControlLocation { section, index })),
                );
            }
        }
        rows
    }

    /// Row hit by a click `offset` rows below the top of the panel content
    pub fn row_at(&self, offset: u16) -> Option<FormRow> {
        let mut y = 0u16;
        let target = offset.saturating_add(self.scroll);
        for row in self.rows() {
            let height = row.height();
            if target >= y && target < y + height {
                return Some(row);
            }
            y += height;
        }
        None
    }

    /// Top offset of a row within the unscrolled form
    fn row_offset(&self, wanted: FormRow) -> Option<u16> {
        let mut y = 0u16;
        for row in self.rows() {
            if row == wanted {
                return Some(y);
            }
            y += row.height();
        }
        None
    }

    /// Adjust scroll so the focused control fits in `height` rows
    pub fn scroll_to_focus(&mut self, height: u16) {
        let Some(focus) = self.focus else {
            return;
        };
        let Some(top) = self.row_offset(FormRow::Control(focus)) else {
            return;
        };
        let bottom = top + CONTROL_HEIGHT;
        if top < self.scroll {
            // Keep the section header in view too
            self.scroll = top.saturating_sub(HEADER_HEIGHT);
        } else if bottom > self.scroll + height {
            self.scroll = bottom.saturating_sub(height);
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        let total: u16 = self.rows().iter().map(|r| r.height()).sum();
        if self.scroll + 1 < total {
            self.scroll += 1;
        }
    }

    /// Key of the highlighted control, if any
    #[cfg(test)]
    pub fn highlighted_key(&self) -> Option<&'static str> {
        self.sections
            .iter()
            .flat_map(|s| s.controls.iter())
            .find(|c| c.highlighted)
            .map(FormControl::key)
    }
}

impl ControlSurface for DocumentForm {
    fn locate(&self, key: &str) -> Option<ControlLocation> {
        self.sections.iter().enumerate().find_map(|(section, s)| {
            s.controls
                .iter()
                .position(|c| c.key() == key)
                .map(|index| ControlLocation { section, index })
        })
    }

    fn is_section_expanded(&self, section: usize) -> bool {
        self.sections.get(section).is_some_and(|s| s.expanded)
    }

    fn expand_section(&mut self, section: usize) -> bool {
        if section >= self.sections.len() {
            return false;
        }
        self.open_section(section);
        true
    }

    fn focus_control(&mut self, location: ControlLocation) {
        if self.control(location).is_some() {
            self.focus = Some(location);
        }
    }

    fn set_highlight(&mut self, location: ControlLocation, on: bool) {
        if let Some(control) = self.control_mut(location) {
            control.highlighted = on;
        }
    }
}
