//! Application state module

mod app_state;
mod coordinator;
mod derive;
mod forms;
mod session;
mod store;
mod ui_area;

pub use app_state::*;
pub use coordinator::*;
pub use derive::*;
pub use forms::*;
pub use session::*;
pub use store::*;
pub use ui_area::*;
