//! Form rendering module
//!
//! - `field_renderer`: control and section header rendering
//! - `document_form`: the editor's form panel

mod document_form;
mod field_renderer;

pub use document_form::draw_form_panel;
