//! Form domain layer
//!
//! Controls know how to edit a value; the values themselves live in the
//! session's field store.

mod field;
mod form_state;

pub use field::FormControl;
pub use form_state::{DocumentForm, FormRow};
